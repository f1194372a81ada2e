// SPDX-License-Identifier: GPL-3.0-only

//! Frame compositor
//!
//! Transfers one source frame onto the render surface with aspect-fill
//! cropping and optional horizontal mirroring. Aspect-fill means the whole
//! target is always covered: the source is cropped, never letterboxed.

use crate::backends::device::types::{Facing, SourceFrame};
use crate::constants::BYTES_PER_PIXEL;
use crate::render::surface::RenderSurface;
use tracing::debug;

/// Source sub-rectangle in source pixel coordinates (x, y, w, h)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

/// Compute the source sub-rectangle that covers the full target.
///
/// If the source is wider (relative aspect) than the target, the width is
/// cropped symmetrically; otherwise the height is. The resulting rectangle
/// has the target's aspect ratio and is centered in the source.
pub fn aspect_fill_rect(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> SourceRect {
    let src_aspect = src_w as f32 / src_h as f32;
    let dst_aspect = dst_w as f32 / dst_h as f32;

    if src_aspect > dst_aspect {
        // Source is relatively wider: crop width
        let w = src_h as f32 * dst_aspect;
        SourceRect {
            x: (src_w as f32 - w) / 2.0,
            y: 0.0,
            w,
            h: src_h as f32,
        }
    } else {
        // Source is relatively taller: crop height
        let h = src_w as f32 / dst_aspect;
        SourceRect {
            x: 0.0,
            y: (src_h as f32 - h) / 2.0,
            w: src_w as f32,
            h,
        }
    }
}

/// Draw `frame` onto `surface` with aspect-fill cropping.
///
/// With `facing == Front` the source is sampled mirrored about the target's
/// vertical centerline, matching natural selfie orientation. The mirror is
/// applied only while sampling, so anything drawn onto the surface after
/// compositing (effect overlays, particles) is never mirrored.
///
/// Frames with zero area or an under-filled buffer are skipped without
/// error; the caller keeps scheduling future frames regardless.
pub fn draw(frame: &SourceFrame, surface: &mut RenderSurface, facing: Facing) {
    if !frame.is_drawable() {
        debug!(
            width = frame.width,
            height = frame.height,
            len = frame.data.len(),
            "Skipping undrawable source frame"
        );
        return;
    }

    let dst_w = surface.width();
    let dst_h = surface.height();
    let rect = aspect_fill_rect(frame.width, frame.height, dst_w, dst_h);
    let mirror = facing == Facing::Front;

    let src_w = frame.width as usize;
    let src = &frame.data;
    let dst = surface.pixels_mut();

    for dy in 0..dst_h {
        // Sample at pixel centers so cropping stays symmetric
        let v = (dy as f32 + 0.5) / dst_h as f32;
        let sy = (rect.y + v * rect.h) as usize;
        let sy = sy.min(frame.height as usize - 1);
        let dst_row = &mut dst[(dy as usize * dst_w as usize) * BYTES_PER_PIXEL
            ..((dy as usize + 1) * dst_w as usize) * BYTES_PER_PIXEL];

        for dx in 0..dst_w {
            let u = (dx as f32 + 0.5) / dst_w as f32;
            let u = if mirror { 1.0 - u } else { u };
            let sx = (rect.x + u * rect.w) as usize;
            let sx = sx.min(src_w - 1);

            let si = (sy * src_w + sx) * BYTES_PER_PIXEL;
            let di = dx as usize * BYTES_PER_PIXEL;
            dst_row[di..di + BYTES_PER_PIXEL].copy_from_slice(&src[si..si + BYTES_PER_PIXEL]);
        }
    }
}
