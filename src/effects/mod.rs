// SPDX-License-Identifier: GPL-3.0-only

//! Effect engine
//!
//! A registry of named visual effects and the per-frame `apply` entry point.
//! Effects come in two kinds: declarative effects carry an opaque style
//! token consumed by the presentation layer (no pixel work happens here),
//! and pixel-kernel effects carry a function that rewrites the surface's
//! RGBA buffer in place.
//!
//! The registry is a plain value owned by the capture session — there is no
//! process-wide effect state, so sessions stay testable in isolation.

pub mod catalog;
pub mod color;
pub mod distort;
pub mod overlay;

use crate::backends::device::types::{Facing, SourceFrame};
use crate::constants::KERNEL_FALLBACK;
use crate::render::compositor;
use crate::render::surface::RenderSurface;
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::{debug, error, warn};

/// Id of the pass-through effect every registry starts with
pub const DEFAULT_EFFECT_ID: &str = "none";

/// Extra inputs available to a kernel beyond the pixel buffer
pub struct KernelContext<'a> {
    /// The source frame composited this tick, when one was available
    pub source: Option<&'a SourceFrame>,
}

/// A pixel kernel: mutates the RGBA buffer in place.
///
/// Arguments are the buffer, its width and height, the render loop's frame
/// index (kernels animate from it, never from wall-clock time, so output is
/// reproducible for a fixed frame sequence), and the kernel context.
pub type KernelFn = fn(&mut [u8], u32, u32, u64, &KernelContext);

/// What an effect is made of
#[derive(Debug, Clone)]
pub enum EffectKind {
    /// A style token applied by the presentation layer to the destination
    /// element; the engine performs no pixel work for these
    Declarative {
        style_token: String,
    },
    /// A function run over the surface's pixel buffer every frame
    PixelKernel {
        kernel: KernelFn,
    },
}

impl EffectKind {
    /// Human-readable kind name for listings
    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::Declarative { .. } => "style",
            EffectKind::PixelKernel { .. } => "kernel",
        }
    }
}

/// A registered visual effect
#[derive(Debug, Clone)]
pub struct Effect {
    /// Unique id, stable across runs; persisted with captured media
    pub id: String,
    /// Name shown in pickers and listings
    pub display_name: String,
    pub kind: EffectKind,
}

impl Effect {
    pub fn is_kernel(&self) -> bool {
        matches!(self.kind, EffectKind::PixelKernel { .. })
    }
}

/// Snapshot of the active effect reported to the presentation layer
///
/// `style_token` is `Some` for declarative effects (empty token means
/// "clear any applied style") and `None` for kernel effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectDescriptor {
    pub id: String,
    pub display_name: String,
    pub style_token: Option<String>,
}

/// Insertion-ordered effect registry with one active effect
///
/// Ids are unique; re-registering an id overwrites the existing entry in
/// place (with a warning). The active id always resolves: it starts at
/// [`DEFAULT_EFFECT_ID`] and `set_active` refuses unknown ids.
#[derive(Debug, Clone)]
pub struct EffectRegistry {
    effects: Vec<Effect>,
    active: usize,
}

impl EffectRegistry {
    /// Registry containing only the pass-through effect
    pub fn new() -> Self {
        Self {
            effects: vec![Effect {
                id: DEFAULT_EFFECT_ID.to_string(),
                display_name: "Original".to_string(),
                kind: EffectKind::Declarative {
                    style_token: String::new(),
                },
            }],
            active: 0,
        }
    }

    /// Register an effect, overwriting (in place) any effect with the same id
    pub fn register(&mut self, effect: Effect) {
        if let Some(pos) = self.effects.iter().position(|e| e.id == effect.id) {
            warn!(id = %effect.id, "Effect id already registered, overwriting");
            self.effects[pos] = effect;
        } else {
            self.effects.push(effect);
        }
    }

    /// Make `id` the active effect; unknown ids are ignored with a warning
    pub fn set_active(&mut self, id: &str) -> bool {
        match self.effects.iter().position(|e| e.id == id) {
            Some(pos) => {
                self.active = pos;
                debug!(id, "Active effect changed");
                true
            }
            None => {
                warn!(id, "Unknown effect id, keeping current effect");
                false
            }
        }
    }

    /// The currently active effect
    pub fn active(&self) -> &Effect {
        &self.effects[self.active]
    }

    /// Look up an effect by id
    pub fn get(&self, id: &str) -> Option<&Effect> {
        self.effects.iter().find(|e| e.id == id)
    }

    /// All registered effects in registration order
    pub fn list(&self) -> &[Effect] {
        &self.effects
    }

    /// Descriptor of the active effect for the presentation layer
    pub fn active_descriptor(&self) -> EffectDescriptor {
        let effect = self.active();
        EffectDescriptor {
            id: effect.id.clone(),
            display_name: effect.display_name.clone(),
            style_token: match &effect.kind {
                EffectKind::Declarative { style_token } => Some(style_token.clone()),
                EffectKind::PixelKernel { .. } => None,
            },
        }
    }

    /// Per-frame entry point: composite the source frame, then run the
    /// active kernel over the surface's pixels.
    ///
    /// The surface is cleared and the compositor invoked every tick. Only
    /// kernel effects read the pixel buffer back, run the kernel, and write
    /// the result; declarative effects skip pixel access entirely (the
    /// presentation layer owns their style token).
    ///
    /// The kernel runs on a copy of the buffer and is shielded: if it
    /// panics, the partial output is discarded, the fault is logged, and
    /// the surface keeps the clean composite for this tick.
    pub fn apply(
        &self,
        surface: &mut RenderSurface,
        source: Option<&SourceFrame>,
        frame_index: u64,
        facing: Facing,
    ) {
        surface.clear();
        if let Some(frame) = source {
            compositor::draw(frame, surface, facing);
        }

        let effect = self.active();
        if let EffectKind::PixelKernel { kernel } = &effect.kind {
            let kernel = *kernel;
            let width = surface.width();
            let height = surface.height();
            let mut buffer = surface.read_back();
            let ctx = KernelContext { source };

            let outcome = catch_unwind(AssertUnwindSafe(|| {
                kernel(&mut buffer, width, height, frame_index, &ctx);
            }));
            match outcome {
                Ok(()) => {
                    surface.write_back(&buffer);
                }
                Err(_) => {
                    error!(id = %effect.id, frame_index, "Effect kernel panicked, frame kept clean");
                }
            }
        }
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Shared kernel helpers
// ---------------------------------------------------------------------------

/// Run `f` over every pixel as normalized RGB; results are clamped to
/// [0, 255] on store. Alpha is preserved.
pub(crate) fn for_each_rgb(
    buf: &mut [u8],
    width: u32,
    height: u32,
    mut f: impl FnMut(u32, u32, &mut f32, &mut f32, &mut f32),
) {
    let width = width as usize;
    for (i, px) in buf.chunks_exact_mut(4).enumerate() {
        let x = (i % width) as u32;
        let y = (i / width) as u32;
        if y >= height {
            break;
        }
        let mut r = px[0] as f32 / 255.0;
        let mut g = px[1] as f32 / 255.0;
        let mut b = px[2] as f32 / 255.0;
        f(x, y, &mut r, &mut g, &mut b);
        px[0] = (r.clamp(0.0, 1.0) * 255.0) as u8;
        px[1] = (g.clamp(0.0, 1.0) * 255.0) as u8;
        px[2] = (b.clamp(0.0, 1.0) * 255.0) as u8;
    }
}

/// Immutable snapshot of a pixel buffer taken at kernel entry.
///
/// Displacing kernels read exclusively from the snapshot and write into the
/// live buffer, so already-written output is never re-read (no feedback
/// smearing). Samples outside the buffer return the fallback color.
pub(crate) struct Snapshot {
    data: Vec<u8>,
    width: i64,
    height: i64,
}

impl Snapshot {
    pub(crate) fn of(buf: &[u8], width: u32, height: u32) -> Self {
        Self {
            data: buf.to_vec(),
            width: width as i64,
            height: height as i64,
        }
    }

    /// Sample a pixel; out-of-range coordinates yield opaque black
    pub(crate) fn sample(&self, x: i64, y: i64) -> [u8; 4] {
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return KERNEL_FALLBACK;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// Sample with coordinates clamped into range (edge extension)
    pub(crate) fn sample_clamped(&self, x: i64, y: i64) -> [u8; 4] {
        self.sample(x.clamp(0, self.width - 1), y.clamp(0, self.height - 1))
    }

    /// Luminance of a clamped sample, normalized to [0, 1]
    pub(crate) fn luma(&self, x: i64, y: i64) -> f32 {
        let [r, g, b, _] = self.sample_clamped(x, y);
        (0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32) / 255.0
    }
}

/// Write one RGBA pixel into the live buffer
pub(crate) fn put_px(buf: &mut [u8], width: u32, x: u32, y: u32, rgba: [u8; 4]) {
    let idx = ((y as usize * width as usize) + x as usize) * 4;
    buf[idx..idx + 4].copy_from_slice(&rgba);
}

/// Deterministic pseudo-random noise in [0, 1) from integer coordinates
pub(crate) fn hash01(x: u64, y: u64) -> f32 {
    let p = (x as f32 * 127.1 + y as f32 * 311.7) * 0.01;
    (p.sin() * 43758.5453).fract().abs()
}

/// Smoothstep interpolation between two edges
pub(crate) fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kernel_effect(id: &str) -> Effect {
        Effect {
            id: id.to_string(),
            display_name: id.to_string(),
            kind: EffectKind::PixelKernel { kernel: color::negative },
        }
    }

    #[test]
    fn test_registry_starts_with_pass_through() {
        let registry = EffectRegistry::new();
        assert_eq!(registry.active().id, DEFAULT_EFFECT_ID);
        assert_eq!(registry.list().len(), 1);
    }

    #[test]
    fn test_set_active_roundtrip() {
        let mut registry = EffectRegistry::new();
        registry.register(kernel_effect("flip"));
        assert!(registry.set_active("flip"));
        assert_eq!(registry.active().id, "flip");
    }

    #[test]
    fn test_unknown_id_keeps_active() {
        let mut registry = EffectRegistry::new();
        registry.register(kernel_effect("flip"));
        registry.set_active("flip");
        assert!(!registry.set_active("does-not-exist"));
        assert_eq!(registry.active().id, "flip");
    }

    #[test]
    fn test_register_overwrites_in_place() {
        let mut registry = EffectRegistry::new();
        registry.register(kernel_effect("a"));
        registry.register(kernel_effect("b"));
        let mut replacement = kernel_effect("a");
        replacement.display_name = "A2".to_string();
        registry.register(replacement);
        assert_eq!(registry.list().len(), 3);
        assert_eq!(registry.list()[1].display_name, "A2");
        // Order preserved
        assert_eq!(registry.list()[2].id, "b");
    }

    #[test]
    fn test_declarative_apply_skips_pixel_access() {
        let registry = EffectRegistry::new();
        let mut surface = RenderSurface::with_size(8, 8);
        registry.apply(&mut surface, None, 1, Facing::Back);
        assert_eq!(surface.readback_count(), 0);
        assert_eq!(surface.writeback_count(), 0);
    }

    #[test]
    fn test_kernel_apply_reads_and_writes_back_once() {
        let mut registry = EffectRegistry::new();
        registry.register(kernel_effect("neg"));
        registry.set_active("neg");
        let mut surface = RenderSurface::with_size(8, 8);
        registry.apply(&mut surface, None, 1, Facing::Back);
        assert_eq!(surface.readback_count(), 1);
        assert_eq!(surface.writeback_count(), 1);
        // Cleared black composite inverted to white
        assert_eq!(surface.pixel(0, 0), [255, 255, 255, 255]);
    }

    fn panicking_kernel(_: &mut [u8], _: u32, _: u32, _: u64, _: &KernelContext) {
        panic!("boom");
    }

    #[test]
    fn test_panicking_kernel_keeps_clean_frame() {
        let mut registry = EffectRegistry::new();
        registry.register(Effect {
            id: "bad".to_string(),
            display_name: "Bad".to_string(),
            kind: EffectKind::PixelKernel { kernel: panicking_kernel },
        });
        registry.set_active("bad");
        let mut surface = RenderSurface::with_size(4, 4);
        registry.apply(&mut surface, None, 1, Facing::Back);
        // Clean composite survives, no write-back happened
        assert_eq!(surface.pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(surface.writeback_count(), 0);
    }

    #[test]
    fn test_snapshot_out_of_range_is_black() {
        let snapshot = Snapshot::of(&[10, 20, 30, 255], 1, 1);
        assert_eq!(snapshot.sample(0, 0), [10, 20, 30, 255]);
        assert_eq!(snapshot.sample(-1, 0), KERNEL_FALLBACK);
        assert_eq!(snapshot.sample(0, 5), KERNEL_FALLBACK);
    }
}
