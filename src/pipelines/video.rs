// SPDX-License-Identifier: GPL-3.0-only

//! Video assembly and thumbnail derivation

use crate::media::{CapturedMedia, MediaKind};
use crate::session::recorder::EncodedVideo;
use chrono::Local;
use image::ImageFormat;
use std::io::Cursor;
use tracing::warn;

/// Wrap a finalized recorder output as a reviewable video artifact
pub fn assemble_video(encoded: EncodedVideo, effect_id: &str) -> CapturedMedia {
    CapturedMedia {
        kind: MediaKind::Video,
        payload: encoded.data,
        effect_id: effect_id.to_string(),
        created_at: Local::now(),
        width: encoded.width,
        height: encoded.height,
        chunk_lens: encoded.chunk_lens,
    }
}

/// Decode the first chunk of a video payload and re-encode it as a PNG
/// thumbnail.
pub fn derive_thumbnail(media: &CapturedMedia) -> Result<Vec<u8>, String> {
    let first_len = *media
        .chunk_lens
        .first()
        .ok_or_else(|| "video has no chunks".to_string())? as usize;
    let chunk = media
        .payload
        .get(..first_len)
        .ok_or_else(|| "payload shorter than first chunk".to_string())?;

    let frame = image::load_from_memory(chunk).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    frame
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| e.to_string())?;
    Ok(bytes)
}

/// Best-effort asynchronous thumbnail derivation.
///
/// Runs the decode off the callback thread. Any failure is logged and
/// reported as an absent thumbnail; it never blocks or fails the save.
pub async fn derive_thumbnail_async(media: &CapturedMedia) -> Option<Vec<u8>> {
    if media.kind != MediaKind::Video {
        return None;
    }
    let media = media.clone();
    let result = tokio::task::spawn_blocking(move || derive_thumbnail(&media)).await;
    match result {
        Ok(Ok(bytes)) => Some(bytes),
        Ok(Err(e)) => {
            warn!(error = %e, "Thumbnail derivation failed, saving without one");
            None
        }
        Err(e) => {
            warn!(error = %e, "Thumbnail task failed, saving without one");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::recorder::{MjpegRecorder, StreamRecorder};

    fn recorded_media() -> CapturedMedia {
        let mut recorder = MjpegRecorder::start();
        recorder
            .push_frame(&vec![120u8; 16 * 16 * 4], 16, 16)
            .unwrap();
        recorder
            .push_frame(&vec![30u8; 16 * 16 * 4], 16, 16)
            .unwrap();
        assemble_video(recorder.finalize().unwrap(), "wave")
    }

    #[test]
    fn test_assemble_keeps_chunk_index() {
        let media = recorded_media();
        assert_eq!(media.kind, MediaKind::Video);
        assert_eq!(media.chunk_lens.len(), 2);
        assert_eq!(media.effect_id, "wave");
    }

    #[test]
    fn test_thumbnail_from_first_chunk() {
        let media = recorded_media();
        let thumb = derive_thumbnail(&media).unwrap();
        let decoded = image::load_from_memory(&thumb).unwrap();
        assert_eq!(decoded.width(), 16);
    }

    #[test]
    fn test_thumbnail_failure_is_an_error_not_a_panic() {
        let mut media = recorded_media();
        // Corrupt the payload so the first chunk no longer decodes
        media.payload.truncate(4);
        assert!(derive_thumbnail(&media).is_err());
    }

    #[tokio::test]
    async fn test_async_thumbnail_absent_on_failure() {
        let mut media = recorded_media();
        media.payload.clear();
        media.chunk_lens.clear();
        assert!(derive_thumbnail_async(&media).await.is_none());
    }
}
