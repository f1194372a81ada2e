// SPDX-License-Identifier: GPL-3.0-only

//! Color-grading pixel kernels
//!
//! Straightforward per-pixel transforms in normalized RGB. Positional
//! kernels (vignette) also use the pixel coordinates; none of these touch
//! neighbouring pixels.

use super::{KernelContext, for_each_rgb, smoothstep};

/// Black & white via BT.601 luminance
pub fn mono(buf: &mut [u8], width: u32, height: u32, _frame: u64, _ctx: &KernelContext) {
    for_each_rgb(buf, width, height, |_, _, r, g, b| {
        let gray = 0.299 * *r + 0.587 * *g + 0.114 * *b;
        *r = gray;
        *g = gray;
        *b = gray;
    });
}

/// Warm brownish tint over luminance
pub fn sepia(buf: &mut [u8], width: u32, height: u32, _frame: u64, _ctx: &KernelContext) {
    for_each_rgb(buf, width, height, |_, _, r, g, b| {
        let luminance = 0.299 * *r + 0.587 * *g + 0.114 * *b;
        *r = luminance * 1.2 + 0.1;
        *g = luminance * 0.9 + 0.05;
        *b = luminance * 0.7;
    });
}

/// High-contrast black & white
pub fn noir(buf: &mut [u8], width: u32, height: u32, _frame: u64, _ctx: &KernelContext) {
    for_each_rgb(buf, width, height, |_, _, r, g, b| {
        let luminance = 0.299 * *r + 0.587 * *g + 0.114 * *b;
        let adjusted = (luminance - 0.5) * 2.0 + 0.5;
        *r = adjusted;
        *g = adjusted;
        *b = adjusted;
    });
}

/// Boosted saturation and contrast
pub fn vivid(buf: &mut [u8], width: u32, height: u32, _frame: u64, _ctx: &KernelContext) {
    for_each_rgb(buf, width, height, |_, _, r, g, b| {
        let luminance = 0.299 * *r + 0.587 * *g + 0.114 * *b;
        *r = (luminance + (*r - luminance) * 1.4).clamp(0.0, 1.0);
        *g = (luminance + (*g - luminance) * 1.4).clamp(0.0, 1.0);
        *b = (luminance + (*b - luminance) * 1.4).clamp(0.0, 1.0);
        *r = (*r - 0.5) * 1.15 + 0.5;
        *g = (*g - 0.5) * 1.15 + 0.5;
        *b = (*b - 0.5) * 1.15 + 0.5;
    });
}

/// Blue color-temperature shift
pub fn cool(buf: &mut [u8], width: u32, height: u32, _frame: u64, _ctx: &KernelContext) {
    for_each_rgb(buf, width, height, |_, _, r, g, b| {
        *r *= 0.9;
        *g *= 0.95;
        *b *= 1.1;
    });
}

/// Orange/amber color temperature
pub fn warm(buf: &mut [u8], width: u32, height: u32, _frame: u64, _ctx: &KernelContext) {
    for_each_rgb(buf, width, height, |_, _, r, _g, b| {
        *r *= 1.1;
        *b *= 0.85;
    });
}

/// Lifted blacks with muted colors
pub fn fade(buf: &mut [u8], width: u32, height: u32, _frame: u64, _ctx: &KernelContext) {
    for_each_rgb(buf, width, height, |_, _, r, g, b| {
        *r = *r * 0.85 + 0.1;
        *g = *g * 0.85 + 0.1;
        *b = *b * 0.85 + 0.1;
        let luminance = 0.299 * *r + 0.587 * *g + 0.114 * *b;
        *r = luminance + (*r - luminance) * 0.7;
        *g = luminance + (*g - luminance) * 0.7;
        *b = luminance + (*b - luminance) * 0.7;
    });
}

/// Two-color gradient mapped over luminance (night blue to sand)
pub fn duotone(buf: &mut [u8], width: u32, height: u32, _frame: u64, _ctx: &KernelContext) {
    const DARK: (f32, f32, f32) = (0.1, 0.1, 0.4);
    const LIGHT: (f32, f32, f32) = (1.0, 0.9, 0.5);
    for_each_rgb(buf, width, height, |_, _, r, g, b| {
        let luminance = 0.299 * *r + 0.587 * *g + 0.114 * *b;
        *r = DARK.0 + luminance * (LIGHT.0 - DARK.0);
        *g = DARK.1 + luminance * (LIGHT.1 - DARK.1);
        *b = DARK.2 + luminance * (LIGHT.2 - DARK.2);
    });
}

/// Inverted colors
pub fn negative(buf: &mut [u8], width: u32, height: u32, _frame: u64, _ctx: &KernelContext) {
    for_each_rgb(buf, width, height, |_, _, r, g, b| {
        *r = 1.0 - *r;
        *g = 1.0 - *g;
        *b = 1.0 - *b;
    });
}

/// Reduced color levels (pop-art)
pub fn posterize(buf: &mut [u8], width: u32, height: u32, _frame: u64, _ctx: &KernelContext) {
    const LEVELS: f32 = 4.0;
    for_each_rgb(buf, width, height, |_, _, r, g, b| {
        *r = (*r * LEVELS).floor() / LEVELS;
        *g = (*g * LEVELS).floor() / LEVELS;
        *b = (*b * LEVELS).floor() / LEVELS;
    });
}

/// Partially inverted tones
pub fn solarize(buf: &mut [u8], width: u32, height: u32, _frame: u64, _ctx: &KernelContext) {
    const THRESHOLD: f32 = 0.5;
    for_each_rgb(buf, width, height, |_, _, r, g, b| {
        if *r > THRESHOLD {
            *r = 1.0 - *r;
        }
        if *g > THRESHOLD {
            *g = 1.0 - *g;
        }
        if *b > THRESHOLD {
            *b = 1.0 - *b;
        }
    });
}

/// Darkened edges falling off smoothly from the center
pub fn vignette(buf: &mut [u8], width: u32, height: u32, _frame: u64, _ctx: &KernelContext) {
    for_each_rgb(buf, width, height, |x, y, r, g, b| {
        let dx = x as f32 / width as f32 - 0.5;
        let dy = y as f32 / height as f32 - 0.5;
        let dist = (dx * dx + dy * dy).sqrt();
        let falloff = 1.0 - smoothstep(0.3, 0.9, dist);
        *r *= falloff;
        *g *= falloff;
        *b *= falloff;
    });
}
