// SPDX-License-Identifier: GPL-3.0-only

//! Displacement pixel kernels
//!
//! Every kernel here maps destination pixels to source coordinates. They
//! all read from an immutable snapshot taken at entry and write only into
//! the live buffer, so already-written output is never re-read. Samples
//! that land outside the surface come back as opaque black.

use super::{KernelContext, Snapshot, hash01, put_px};

/// Horizontal sine-wave displacement rolling over time
pub fn wave(buf: &mut [u8], width: u32, height: u32, frame: u64, _ctx: &KernelContext) {
    let snapshot = Snapshot::of(buf, width, height);
    let t = frame as f32;
    for y in 0..height {
        let shift = (14.0 * (y as f32 * 0.105 + t * 0.2).sin()) as i64;
        for x in 0..width {
            let sample = snapshot.sample(x as i64 + shift, y as i64);
            put_px(buf, width, x, y, sample);
        }
    }
}

/// Radial ripple spreading from the center
pub fn ripple(buf: &mut [u8], width: u32, height: u32, frame: u64, _ctx: &KernelContext) {
    let snapshot = Snapshot::of(buf, width, height);
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let t = frame as f32;
    for y in 0..height {
        for x in 0..width {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist < 1.0 {
                continue;
            }
            let offset = 6.0 * (dist / 14.0 - t * 0.35).sin();
            let scale = (dist - offset) / dist;
            let sx = (cx + dx * scale) as i64;
            let sy = (cy + dy * scale) as i64;
            put_px(buf, width, x, y, snapshot.sample(sx, sy));
        }
    }
}

/// Swirl: rotation that decays with distance from the center
pub fn spiral(buf: &mut [u8], width: u32, height: u32, frame: u64, _ctx: &KernelContext) {
    let snapshot = Snapshot::of(buf, width, height);
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt();
    // Slow precession keeps the swirl alive without strobing
    let strength = 1.2 + 0.3 * (frame as f32 * 0.05).sin();
    for y in 0..height {
        for x in 0..width {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            let angle = dy.atan2(dx) + strength * (1.0 - dist / max_dist);
            let sx = (cx + dist * angle.cos()) as i64;
            let sy = (cy + dist * angle.sin()) as i64;
            put_px(buf, width, x, y, snapshot.sample(sx, sy));
        }
    }
}

/// Pinch toward the center (samples pushed outward near the middle)
pub fn pinch(buf: &mut [u8], width: u32, height: u32, _frame: u64, _ctx: &KernelContext) {
    let snapshot = Snapshot::of(buf, width, height);
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let max_dist = (cx * cx + cy * cy).sqrt();
    for y in 0..height {
        for x in 0..width {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let dist = (dx * dx + dy * dy).sqrt();
            if dist < 1.0 {
                continue;
            }
            let normalized = (dist / max_dist).powf(1.5);
            let scale = normalized * max_dist / dist;
            let sx = (cx + dx * scale) as i64;
            let sy = (cy + dy * scale) as i64;
            put_px(buf, width, x, y, snapshot.sample(sx, sy));
        }
    }
}

/// Horizontal squeeze breathing with the frame counter
pub fn squeeze(buf: &mut [u8], width: u32, height: u32, frame: u64, _ctx: &KernelContext) {
    let snapshot = Snapshot::of(buf, width, height);
    let cx = width as f32 / 2.0;
    let factor = 1.0 + 0.25 * (frame as f32 * 0.1).sin();
    for y in 0..height {
        for x in 0..width {
            let sx = (cx + (x as f32 - cx) * factor) as i64;
            put_px(buf, width, x, y, snapshot.sample(sx, y as i64));
        }
    }
}

/// Four-way mirror fold (top-left quadrant reflected everywhere)
pub fn kaleido(buf: &mut [u8], width: u32, height: u32, _frame: u64, _ctx: &KernelContext) {
    let snapshot = Snapshot::of(buf, width, height);
    for y in 0..height {
        for x in 0..width {
            let sx = if x < width / 2 { x } else { width - 1 - x };
            let sy = if y < height / 2 { y } else { height - 1 - y };
            put_px(buf, width, x, y, snapshot.sample(sx as i64, sy as i64));
        }
    }
}

/// Band-wise horizontal tearing, re-rolled every few frames
pub fn glitch(buf: &mut [u8], width: u32, height: u32, frame: u64, _ctx: &KernelContext) {
    const BAND_HEIGHT: u32 = 8;
    let snapshot = Snapshot::of(buf, width, height);
    let epoch = frame / 6;
    for y in 0..height {
        let band = (y / BAND_HEIGHT) as u64;
        let torn = hash01(band * 7 + 1, epoch) > 0.8;
        let shift = if torn {
            ((hash01(band, epoch) - 0.5) * 40.0) as i64
        } else {
            0
        };
        for x in 0..width {
            put_px(buf, width, x, y, snapshot.sample(x as i64 + shift, y as i64));
        }
    }
}

/// RGB channel split: red and blue sampled at opposite horizontal offsets
pub fn chroma(buf: &mut [u8], width: u32, height: u32, _frame: u64, _ctx: &KernelContext) {
    let snapshot = Snapshot::of(buf, width, height);
    let offset = ((width as f32 * 0.004).max(1.0)) as i64;
    for y in 0..height {
        for x in 0..width {
            let center = snapshot.sample_clamped(x as i64, y as i64);
            let right = snapshot.sample_clamped(x as i64 + offset, y as i64);
            let left = snapshot.sample_clamped(x as i64 - offset, y as i64);
            put_px(buf, width, x, y, [right[0], center[1], left[2], center[3]]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_buffer(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Vec::with_capacity((width * height * 4) as usize);
        for y in 0..height {
            for x in 0..width {
                buf.extend_from_slice(&[(x * 5) as u8, (y * 5) as u8, 100, 255]);
            }
        }
        buf
    }

    #[test]
    fn test_kaleido_mirrors_quadrants() {
        let mut buf = gradient_buffer(8, 8);
        kaleido(&mut buf, 8, 8, 0, &KernelContext { source: None });
        // (7, 0) mirrors (0, 0)
        let left = &buf[0..4];
        let right_idx = (7 * 4) as usize;
        assert_eq!(left, &buf[right_idx..right_idx + 4]);
    }

    #[test]
    fn test_wave_preserves_buffer_shape() {
        let mut buf = gradient_buffer(16, 16);
        let len = buf.len();
        wave(&mut buf, 16, 16, 3, &KernelContext { source: None });
        assert_eq!(buf.len(), len);
    }

    #[test]
    fn test_wave_out_of_range_falls_back_to_black() {
        // Bright uniform buffer: any black pixel after the wave came from
        // sampling outside the surface
        let mut buf = vec![255u8; 16 * 16 * 4];
        wave(&mut buf, 16, 16, 8, &KernelContext { source: None });
        let has_fallback = buf
            .chunks_exact(4)
            .any(|px| px == [0, 0, 0, 255]);
        assert!(has_fallback);
    }

    #[test]
    fn test_glitch_is_deterministic_per_frame() {
        let mut a = gradient_buffer(16, 32);
        let mut b = gradient_buffer(16, 32);
        glitch(&mut a, 16, 32, 42, &KernelContext { source: None });
        glitch(&mut b, 16, 32, 42, &KernelContext { source: None });
        assert_eq!(a, b);
    }
}
