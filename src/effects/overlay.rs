// SPDX-License-Identifier: GPL-3.0-only

//! Procedural overlay and sketch kernels
//!
//! Overlays draw on top of the composited frame after any color work.
//! Animation is driven by the frame index so a fixed frame sequence always
//! reproduces the same output.

use super::{KernelContext, Snapshot, for_each_rgb, hash01, put_px};

/// Darkened horizontal scanlines with a slow vertical roll
pub fn scanlines(buf: &mut [u8], width: u32, height: u32, frame: u64, _ctx: &KernelContext) {
    let roll = (frame / 2) % 4;
    for_each_rgb(buf, width, height, |_, y, r, g, b| {
        if (y as u64 + roll) % 4 == 0 {
            *r *= 0.55;
            *g *= 0.55;
            *b *= 0.55;
        }
    });
}

/// Falling snow particles
///
/// A fixed population of particles; each one's column and phase come from
/// its index, and its row advances with the frame counter, wrapping at the
/// bottom edge.
pub fn snow(buf: &mut [u8], width: u32, height: u32, frame: u64, _ctx: &KernelContext) {
    const PARTICLES: u64 = 90;
    if width == 0 || height == 0 {
        return;
    }
    for i in 0..PARTICLES {
        let column = (hash01(i, 13) * width as f32) as i64;
        let drift = ((frame as f32 * 0.15 + i as f32).sin() * 3.0) as i64;
        let speed = 1 + (i % 3) as u64;
        let row = ((hash01(i, 29) * height as f32) as u64 + frame * speed) % height as u64;
        let radius: i64 = if i % 4 == 0 { 2 } else { 1 };

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy > radius * radius {
                    continue;
                }
                let px = column + drift + dx;
                let py = row as i64 + dy;
                if px < 0 || py < 0 || px >= width as i64 || py >= height as i64 {
                    continue;
                }
                put_px(buf, width, px as u32, py as u32, [245, 245, 250, 255]);
            }
        }
    }
}

/// Pencil sketch: Sobel edges inverted onto paper-textured white
pub fn pencil(buf: &mut [u8], width: u32, height: u32, _frame: u64, _ctx: &KernelContext) {
    let snapshot = Snapshot::of(buf, width, height);
    for y in 0..height {
        for x in 0..width {
            let xi = x as i64;
            let yi = y as i64;

            let tl = snapshot.luma(xi - 1, yi - 1);
            let tm = snapshot.luma(xi, yi - 1);
            let tr = snapshot.luma(xi + 1, yi - 1);
            let ml = snapshot.luma(xi - 1, yi);
            let mr = snapshot.luma(xi + 1, yi);
            let bl = snapshot.luma(xi - 1, yi + 1);
            let bm = snapshot.luma(xi, yi + 1);
            let br = snapshot.luma(xi + 1, yi + 1);

            let gx = -tl - 2.0 * ml - bl + tr + 2.0 * mr + br;
            let gy = -tl - 2.0 * tm - tr + bl + 2.0 * bm + br;
            let edge = (gx * gx + gy * gy).sqrt();

            // Dark strokes on a lightly textured page
            let stroke = 1.0 - edge * 2.0;
            let paper = 0.95 + hash01(x as u64, y as u64) * 0.05;
            let value = ((stroke * paper).clamp(0.0, 1.0) * 255.0) as u8;
            put_px(buf, width, x, y, [value, value, value, 255]);
        }
    }
}
