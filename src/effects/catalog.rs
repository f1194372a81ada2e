// SPDX-License-Identifier: GPL-3.0-only

//! Built-in effect catalog
//!
//! Registered once at session start. Declarative entries carry the style
//! token the presentation layer applies to the preview element; kernel
//! entries carry the pixel function run by the engine.

use super::{Effect, EffectKind, EffectRegistry, KernelFn, color, distort, overlay};

/// Declarative effects: (id, display name, style token)
const STYLE_EFFECTS: &[(&str, &str, &str)] = &[
    ("soft-focus", "Soft Focus", "style-soft-focus"),
    ("bright-pop", "Bright Pop", "style-bright-pop"),
    ("dusk", "Dusk", "style-dusk"),
    ("silver", "Silver", "style-silver"),
    ("high-key", "High Key", "style-high-key"),
];

/// Kernel effects: (id, display name, kernel)
const KERNEL_EFFECTS: &[(&str, &str, KernelFn)] = &[
    ("mono", "Mono", color::mono),
    ("sepia", "Sepia", color::sepia),
    ("noir", "Noir", color::noir),
    ("vivid", "Vivid", color::vivid),
    ("cool", "Cool", color::cool),
    ("warm", "Warm", color::warm),
    ("fade", "Fade", color::fade),
    ("duotone", "Duotone", color::duotone),
    ("negative", "Negative", color::negative),
    ("posterize", "Posterize", color::posterize),
    ("solarize", "Solarize", color::solarize),
    ("vignette", "Vignette", color::vignette),
    ("wave", "Wave", distort::wave),
    ("ripple", "Ripple", distort::ripple),
    ("spiral", "Spiral", distort::spiral),
    ("pinch", "Pinch", distort::pinch),
    ("squeeze", "Squeeze", distort::squeeze),
    ("kaleido", "Kaleidoscope", distort::kaleido),
    ("glitch", "Glitch", distort::glitch),
    ("chroma", "Chroma Split", distort::chroma),
    ("scanlines", "Scanlines", overlay::scanlines),
    ("snow", "Snow", overlay::snow),
    ("pencil", "Pencil", overlay::pencil),
];

/// Build a registry with the full built-in catalog
pub fn builtin_registry() -> EffectRegistry {
    let mut registry = EffectRegistry::new();

    for (id, display_name, style_token) in STYLE_EFFECTS {
        registry.register(Effect {
            id: (*id).to_string(),
            display_name: (*display_name).to_string(),
            kind: EffectKind::Declarative {
                style_token: (*style_token).to_string(),
            },
        });
    }

    for (id, display_name, kernel) in KERNEL_EFFECTS {
        registry.register(Effect {
            id: (*id).to_string(),
            display_name: (*display_name).to_string(),
            kind: EffectKind::PixelKernel { kernel: *kernel },
        });
    }

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{DEFAULT_EFFECT_ID, KernelContext};
    use std::collections::HashSet;

    #[test]
    fn test_catalog_ids_are_unique() {
        let registry = builtin_registry();
        let ids: HashSet<&str> = registry.list().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids.len(), registry.list().len());
    }

    #[test]
    fn test_catalog_starts_with_pass_through() {
        let registry = builtin_registry();
        assert_eq!(registry.list()[0].id, DEFAULT_EFFECT_ID);
        assert_eq!(registry.active().id, DEFAULT_EFFECT_ID);
    }

    #[test]
    fn test_every_id_activates() {
        let mut registry = builtin_registry();
        let ids: Vec<String> = registry.list().iter().map(|e| e.id.clone()).collect();
        for id in ids {
            assert!(registry.set_active(&id), "could not activate {}", id);
            assert_eq!(registry.active().id, id);
        }
    }

    /// Every kernel must handle extreme inputs: uniform black and uniform
    /// white buffers, with arbitrary frame indices, without panicking or
    /// changing the buffer's shape. Channel clamping makes out-of-range
    /// values impossible by construction; this exercises the paths that
    /// would otherwise overflow.
    #[test]
    fn test_kernels_tolerate_extreme_inputs() {
        const W: u32 = 24;
        const H: u32 = 40;
        let black: Vec<u8> = (0..W * H)
            .flat_map(|_| [0u8, 0, 0, 255])
            .collect();
        let white: Vec<u8> = (0..W * H)
            .flat_map(|_| [255u8, 255, 255, 255])
            .collect();

        for (id, _, kernel) in KERNEL_EFFECTS {
            for input in [&black, &white] {
                for frame in [0u64, 1, 37, 10_000] {
                    let mut buf = input.clone();
                    kernel(&mut buf, W, H, frame, &KernelContext { source: None });
                    assert_eq!(buf.len(), input.len(), "kernel {} resized buffer", id);
                }
            }
        }
    }

    /// Kernels must be pure functions of (buffer, frame index)
    #[test]
    fn test_kernels_are_deterministic() {
        const W: u32 = 16;
        const H: u32 = 16;
        let input: Vec<u8> = (0..W * H * 4).map(|i| (i % 251) as u8).collect();

        for (id, _, kernel) in KERNEL_EFFECTS {
            let mut a = input.clone();
            let mut b = input.clone();
            kernel(&mut a, W, H, 7, &KernelContext { source: None });
            kernel(&mut b, W, H, 7, &KernelContext { source: None });
            assert_eq!(a, b, "kernel {} is not deterministic", id);
        }
    }
}
