// SPDX-License-Identifier: GPL-3.0-only

//! Synthetic device backend
//!
//! Produces deterministic frames without any camera hardware: an animated
//! test pattern (distinct per facing) or a static frame decoded from an
//! image file. Used by the headless CLI and throughout the test suite.

use super::types::{Facing, SourceFrame, StreamConstraints};
use super::{DeviceProvider, DeviceStream};
use crate::constants::DEFAULT_WARMUP_FRAMES;
use crate::errors::AcquireError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Default synthetic capture resolution (landscape, forcing the compositor
/// to crop for the portrait surface)
const PATTERN_WIDTH: u32 = 640;
const PATTERN_HEIGHT: u32 = 480;

/// Synthetic device provider
///
/// Hands out [`SyntheticStream`]s. With `source_image` set, streams repeat
/// the decoded image every tick; otherwise they generate a moving test
/// pattern seeded by the facing.
pub struct SyntheticProvider {
    /// Optional image file streamed instead of the generated pattern
    source_image: Option<PathBuf>,
    /// Ticks each new stream spends warming up before frames flow
    warmup_frames: u32,
}

impl SyntheticProvider {
    /// Provider generating animated test-pattern frames
    pub fn new() -> Self {
        Self {
            source_image: None,
            warmup_frames: DEFAULT_WARMUP_FRAMES,
        }
    }

    /// Provider streaming a static image file
    pub fn from_image(path: PathBuf) -> Self {
        Self {
            source_image: Some(path),
            warmup_frames: DEFAULT_WARMUP_FRAMES,
        }
    }

    /// Override the warm-up length (0 disables warm-up)
    pub fn with_warmup(mut self, warmup_frames: u32) -> Self {
        self.warmup_frames = warmup_frames;
        self
    }
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceProvider for SyntheticProvider {
    fn acquire(
        &mut self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn DeviceStream>, AcquireError> {
        let (width, height) = constraints
            .ideal_resolution
            .unwrap_or((PATTERN_WIDTH, PATTERN_HEIGHT));
        if width == 0 || height == 0 {
            return Err(AcquireError::ConstraintsUnsatisfiable);
        }

        let stream = match &self.source_image {
            Some(path) => {
                let frame = load_image_as_frame(path)
                    .map_err(|e| AcquireError::Unknown(format!("image source: {}", e)))?;
                info!(
                    path = %path.display(),
                    width = frame.width,
                    height = frame.height,
                    "Acquired synthetic stream from image file"
                );
                SyntheticStream::from_frame(frame, self.warmup_frames)
            }
            None => {
                info!(facing = %constraints.facing, width, height, "Acquired synthetic stream");
                SyntheticStream::test_pattern(constraints.facing, width, height, self.warmup_frames)
            }
        };
        Ok(Box::new(stream))
    }
}

/// Frame generator behind a [`SyntheticStream`]
enum FrameSource {
    /// Animated gradient + moving bar, seeded by facing
    Pattern { facing: Facing, width: u32, height: u32 },
    /// A fixed frame repeated every tick
    Fixed(SourceFrame),
}

/// A synthetic device stream
///
/// Deterministic: the nth polled frame is identical across runs, so tests
/// and repeated captures are reproducible.
pub struct SyntheticStream {
    source: FrameSource,
    /// Remaining warm-up polls before frames are produced
    warmup_remaining: u32,
    /// Frames produced so far (drives pattern animation)
    produced: u64,
    stopped: bool,
}

impl SyntheticStream {
    /// Stream generating an animated test pattern
    pub fn test_pattern(facing: Facing, width: u32, height: u32, warmup_frames: u32) -> Self {
        Self {
            source: FrameSource::Pattern { facing, width, height },
            warmup_remaining: warmup_frames,
            produced: 0,
            stopped: false,
        }
    }

    /// Stream repeating a fixed frame
    pub fn from_frame(frame: SourceFrame, warmup_frames: u32) -> Self {
        Self {
            source: FrameSource::Fixed(frame),
            warmup_remaining: warmup_frames,
            produced: 0,
            stopped: false,
        }
    }
}

impl DeviceStream for SyntheticStream {
    fn poll_frame(&mut self) -> Option<SourceFrame> {
        if self.stopped {
            return None;
        }
        if self.warmup_remaining > 0 {
            self.warmup_remaining -= 1;
            debug!(remaining = self.warmup_remaining, "Synthetic stream warming up");
            return None;
        }

        let frame = match &self.source {
            FrameSource::Fixed(frame) => frame.clone(),
            FrameSource::Pattern { facing, width, height } => {
                generate_pattern(*facing, *width, *height, self.produced)
            }
        };
        self.produced += 1;
        Some(frame)
    }

    fn is_ended(&self) -> bool {
        self.stopped
    }

    fn stop(&mut self) {
        debug!(produced = self.produced, "Stopping synthetic stream");
        self.stopped = true;
    }
}

/// Generate one test-pattern frame.
///
/// Vertical gradient with a bright bar sweeping horizontally one pixel per
/// frame. Front and back facing use different base hues so captures from
/// the two "cameras" are visually distinct.
fn generate_pattern(facing: Facing, width: u32, height: u32, frame_index: u64) -> SourceFrame {
    let (base_r, base_b) = match facing {
        Facing::Front => (90u32, 40u32),
        Facing::Back => (40u32, 90u32),
    };
    let bar_x = (frame_index % width as u64) as u32;

    let mut data = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        let shade = (y * 160) / height.max(1);
        for x in 0..width {
            let on_bar = x.abs_diff(bar_x) < 6;
            if on_bar {
                data.extend_from_slice(&[235, 235, 235, 255]);
            } else {
                let r = (base_r + shade).min(255) as u8;
                let g = (30 + shade / 2).min(255) as u8;
                let b = (base_b + shade).min(255) as u8;
                data.extend_from_slice(&[r, g, b, 255]);
            }
        }
    }
    SourceFrame::new(width, height, data)
}

/// Decode an image file into a source frame (RGBA)
fn load_image_as_frame(path: &Path) -> Result<SourceFrame, String> {
    let img = image::open(path).map_err(|e| e.to_string())?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(SourceFrame {
        width,
        height,
        data: Arc::from(rgba.into_raw()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warmup_then_frames() {
        let mut stream = SyntheticStream::test_pattern(Facing::Front, 32, 32, 2);
        assert!(stream.poll_frame().is_none());
        assert!(stream.poll_frame().is_none());
        let frame = stream.poll_frame().expect("frame after warmup");
        assert!(frame.is_drawable());
        assert_eq!(frame.width, 32);
    }

    #[test]
    fn test_pattern_is_deterministic() {
        let mut a = SyntheticStream::test_pattern(Facing::Back, 16, 16, 0);
        let mut b = SyntheticStream::test_pattern(Facing::Back, 16, 16, 0);
        let fa = a.poll_frame().unwrap();
        let fb = b.poll_frame().unwrap();
        assert_eq!(&fa.data[..], &fb.data[..]);
    }

    #[test]
    fn test_facings_produce_distinct_frames() {
        let mut front = SyntheticStream::test_pattern(Facing::Front, 16, 16, 0);
        let mut back = SyntheticStream::test_pattern(Facing::Back, 16, 16, 0);
        let ff = front.poll_frame().unwrap();
        let bf = back.poll_frame().unwrap();
        assert_ne!(&ff.data[..], &bf.data[..]);
    }

    #[test]
    fn test_stopped_stream_produces_nothing() {
        let mut stream = SyntheticStream::test_pattern(Facing::Front, 16, 16, 0);
        stream.stop();
        assert!(stream.is_ended());
        assert!(stream.poll_frame().is_none());
    }
}
