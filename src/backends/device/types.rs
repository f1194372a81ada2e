// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for device backends

use crate::constants::BYTES_PER_PIXEL;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which way the capture device faces
///
/// Front-facing streams are mirrored by the compositor so the preview
/// matches what a user expects from a selfie camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Facing {
    /// Selfie camera; composited mirrored
    #[default]
    Front,
    /// Rear camera; composited unmirrored
    Back,
}

impl Facing {
    /// Toggle between front and back
    pub fn toggled(self) -> Self {
        match self {
            Facing::Front => Facing::Back,
            Facing::Back => Facing::Front,
        }
    }
}

impl std::fmt::Display for Facing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Facing::Front => write!(f, "front"),
            Facing::Back => write!(f, "back"),
        }
    }
}

/// Constraints passed to device acquisition
///
/// Resolution and aspect are hints; a provider that cannot satisfy them
/// reports `ConstraintsUnsatisfiable`, and acquisition retries once with the
/// hints cleared before failing.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConstraints {
    /// Requested device facing
    pub facing: Facing,
    /// Ideal capture resolution (width, height)
    pub ideal_resolution: Option<(u32, u32)>,
    /// Ideal aspect ratio (width / height)
    pub ideal_aspect: Option<f32>,
}

impl StreamConstraints {
    /// Constraints for the given facing with no format hints
    pub fn for_facing(facing: Facing) -> Self {
        Self {
            facing,
            ideal_resolution: None,
            ideal_aspect: None,
        }
    }

    /// A relaxed copy with all format hints cleared
    pub fn relaxed(&self) -> Self {
        Self {
            facing: self.facing,
            ideal_resolution: None,
            ideal_aspect: None,
        }
    }

    /// Whether any format hint is set
    pub fn has_hints(&self) -> bool {
        self.ideal_resolution.is_some() || self.ideal_aspect.is_some()
    }
}

/// A single RGBA frame delivered by a device stream
///
/// Pixel data is reference counted so frames can be retained across ticks
/// (e.g. for the final photo bake) without copying.
#[derive(Debug, Clone)]
pub struct SourceFrame {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGBA bytes, row-major, no stride padding
    pub data: Arc<[u8]>,
}

impl SourceFrame {
    /// Create a frame from raw RGBA bytes
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            data: Arc::from(data),
        }
    }

    /// Expected byte length for the frame's dimensions
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }

    /// A frame is drawable when it has a non-zero area and carries at least
    /// enough bytes for its claimed dimensions. The compositor skips frames
    /// that fail this check.
    pub fn is_drawable(&self) -> bool {
        self.width > 0 && self.height > 0 && self.data.len() >= self.expected_len()
    }

    /// Aspect ratio (width / height); zero-height frames report 0
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            0.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_toggle_roundtrip() {
        assert_eq!(Facing::Front.toggled(), Facing::Back);
        assert_eq!(Facing::Front.toggled().toggled(), Facing::Front);
    }

    #[test]
    fn test_relaxed_clears_hints() {
        let constraints = StreamConstraints {
            facing: Facing::Back,
            ideal_resolution: Some((1280, 720)),
            ideal_aspect: Some(16.0 / 9.0),
        };
        let relaxed = constraints.relaxed();
        assert_eq!(relaxed.facing, Facing::Back);
        assert!(!relaxed.has_hints());
    }

    #[test]
    fn test_zero_area_frame_not_drawable() {
        let frame = SourceFrame::new(0, 0, Vec::new());
        assert!(!frame.is_drawable());
    }

    #[test]
    fn test_short_buffer_not_drawable() {
        let frame = SourceFrame::new(4, 4, vec![0u8; 10]);
        assert!(!frame.is_drawable());
    }
}
