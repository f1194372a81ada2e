// SPDX-License-Identifier: GPL-3.0-only

//! Still export
//!
//! Encodes the render surface as a PNG. The surface already carries the
//! crop, mirror and effect from the final bake, so this is a pure encoding
//! step.

use crate::errors::ExportError;
use crate::media::{CapturedMedia, MediaKind};
use crate::render::surface::RenderSurface;
use chrono::Local;
use image::{DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use tracing::debug;

/// Encode the surface's pixels as PNG bytes
pub fn encode_surface_png(surface: &RenderSurface) -> Result<Vec<u8>, ExportError> {
    let img = RgbaImage::from_raw(surface.width(), surface.height(), surface.pixels().to_vec())
        .ok_or_else(|| ExportError::EncodingFailed("surface buffer size mismatch".to_string()))?;

    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| ExportError::EncodingFailed(e.to_string()))?;

    debug!(
        width = surface.width(),
        height = surface.height(),
        bytes = bytes.len(),
        "Surface exported as PNG"
    );
    Ok(bytes)
}

/// Export the surface as a reviewable photo artifact
pub fn export_photo(surface: &RenderSurface, effect_id: &str) -> Result<CapturedMedia, ExportError> {
    let payload = encode_surface_png(surface)?;
    Ok(CapturedMedia {
        kind: MediaKind::Photo,
        payload,
        effect_id: effect_id.to_string(),
        created_at: Local::now(),
        width: surface.width(),
        height: surface.height(),
        chunk_lens: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_roundtrips_through_png() {
        let mut surface = RenderSurface::with_size(8, 8);
        surface.put_pixel(2, 3, [10, 200, 30, 255]);
        let media = export_photo(&surface, "none").unwrap();
        assert_eq!(media.kind, MediaKind::Photo);

        let decoded = image::load_from_memory(&media.payload).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (8, 8));
        assert_eq!(decoded.get_pixel(2, 3).0, [10, 200, 30, 255]);
    }
}
