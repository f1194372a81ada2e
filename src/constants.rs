// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Render surface width in pixels (portrait 9:16 target)
pub const SURFACE_WIDTH: u32 = 450;

/// Render surface height in pixels
pub const SURFACE_HEIGHT: u32 = 800;

/// Bytes per RGBA pixel
pub const BYTES_PER_PIXEL: usize = 4;

/// Aspect ratio of the render surface (width / height)
pub fn surface_aspect() -> f32 {
    SURFACE_WIDTH as f32 / SURFACE_HEIGHT as f32
}

/// How long the capture control must be held before a press is treated as
/// "record video" instead of "take photo"
pub const HOLD_THRESHOLD: Duration = Duration::from_millis(200);

/// Hard cap on a single recording. Recording is force-stopped when the cap
/// elapses even if the control is still held.
pub const MAX_RECORDING: Duration = Duration::from_secs(30);

/// Render loop tick rate in frames per second
pub const TICK_RATE_FPS: u32 = 30;

/// Interval between render loop ticks
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000 / TICK_RATE_FPS as u64);

/// Number of ticks a freshly acquired synthetic stream reports "not ready"
/// before frames start flowing (models device warm-up)
pub const DEFAULT_WARMUP_FRAMES: u32 = 3;

/// JPEG quality for recorded video chunks
pub const VIDEO_CHUNK_QUALITY: u8 = 85;

/// Fallback color written when a displacing kernel samples outside the
/// surface: opaque black
pub const KERNEL_FALLBACK: [u8; 4] = [0, 0, 0, 255];

/// File extension for assembled video artifacts (concatenated JPEG chunks)
pub const VIDEO_EXTENSION: &str = "mjpeg";

/// File extension for exported stills
pub const PHOTO_EXTENSION: &str = "png";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_is_portrait() {
        assert!(SURFACE_WIDTH < SURFACE_HEIGHT);
        let aspect = surface_aspect();
        assert!((aspect - 9.0 / 16.0).abs() < 0.01);
    }

    #[test]
    fn test_hold_threshold_below_recording_cap() {
        assert!(HOLD_THRESHOLD < MAX_RECORDING);
    }
}
