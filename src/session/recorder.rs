// SPDX-License-Identifier: GPL-3.0-only

//! Stream recorder interface and the built-in chunk recorder
//!
//! The recorder consumes the render surface's output, so every frame it
//! sees already has the crop, mirror and effect baked in. Chunks accumulate
//! incrementally; `finalize` assembles them into the complete encoded
//! artifact exactly once.

use crate::constants::VIDEO_CHUNK_QUALITY;
use crate::errors::RecorderError;
use image::ExtendedColorType;
use image::codecs::jpeg::JpegEncoder;
use std::io::Cursor;
use tracing::{debug, info};

/// Result of finalizing a recorder
#[derive(Debug, Clone)]
pub struct EncodedVideo {
    /// Concatenated chunk bytes
    pub data: Vec<u8>,
    /// Length of each chunk, in order
    pub chunk_lens: Vec<u32>,
    pub width: u32,
    pub height: u32,
}

impl EncodedVideo {
    /// Borrow the bytes of chunk `index`
    pub fn chunk(&self, index: usize) -> Option<&[u8]> {
        let mut offset = 0usize;
        for (i, len) in self.chunk_lens.iter().enumerate() {
            let len = *len as usize;
            if i == index {
                return self.data.get(offset..offset + len);
            }
            offset += len;
        }
        None
    }
}

/// An active stream recorder
pub trait StreamRecorder: Send {
    /// Encode one surface frame as the next chunk
    fn push_frame(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<(), RecorderError>;

    /// Assemble all chunks into the finished artifact.
    ///
    /// Must be called exactly once; later calls fail with
    /// [`RecorderError::AlreadyFinalized`].
    fn finalize(&mut self) -> Result<EncodedVideo, RecorderError>;

    /// Chunks recorded so far
    fn chunk_count(&self) -> usize;
}

/// Factory producing a recorder at `Recording` entry.
///
/// Failing here aborts the Recording transition; the session falls back to
/// `Live`.
pub type RecorderFactory = Box<dyn Fn() -> Result<Box<dyn StreamRecorder>, RecorderError> + Send>;

/// Built-in recorder: one JPEG chunk per frame, concatenated on finalize
/// into an MJPEG artifact.
pub struct MjpegRecorder {
    data: Vec<u8>,
    chunk_lens: Vec<u32>,
    width: u32,
    height: u32,
    finalized: bool,
}

impl MjpegRecorder {
    pub fn start() -> Self {
        info!("Recorder started");
        Self {
            data: Vec::new(),
            chunk_lens: Vec::new(),
            width: 0,
            height: 0,
            finalized: false,
        }
    }

    /// A factory producing fresh [`MjpegRecorder`]s
    pub fn factory() -> RecorderFactory {
        Box::new(|| Ok(Box::new(MjpegRecorder::start())))
    }
}

impl StreamRecorder for MjpegRecorder {
    fn push_frame(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<(), RecorderError> {
        if self.finalized {
            return Err(RecorderError::AlreadyFinalized);
        }
        if self.chunk_lens.is_empty() {
            self.width = width;
            self.height = height;
        }

        // JPEG has no alpha channel; drop it before encoding
        let rgb: Vec<u8> = pixels
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();

        let mut chunk = Vec::new();
        JpegEncoder::new_with_quality(Cursor::new(&mut chunk), VIDEO_CHUNK_QUALITY)
            .encode(&rgb, width, height, ExtendedColorType::Rgb8)
            .map_err(|e| RecorderError::EncodingFailed(e.to_string()))?;

        self.chunk_lens.push(chunk.len() as u32);
        self.data.extend_from_slice(&chunk);
        Ok(())
    }

    fn finalize(&mut self) -> Result<EncodedVideo, RecorderError> {
        if self.finalized {
            return Err(RecorderError::AlreadyFinalized);
        }
        self.finalized = true;
        debug!(
            chunks = self.chunk_lens.len(),
            bytes = self.data.len(),
            "Recorder finalized"
        );
        Ok(EncodedVideo {
            data: std::mem::take(&mut self.data),
            chunk_lens: std::mem::take(&mut self.chunk_lens),
            width: self.width,
            height: self.height,
        })
    }

    fn chunk_count(&self) -> usize {
        self.chunk_lens.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(width: u32, height: u32, value: u8) -> Vec<u8> {
        vec![value; (width * height * 4) as usize]
    }

    #[test]
    fn test_chunks_accumulate() {
        let mut recorder = MjpegRecorder::start();
        recorder.push_frame(&frame(16, 16, 100), 16, 16).unwrap();
        recorder.push_frame(&frame(16, 16, 200), 16, 16).unwrap();
        assert_eq!(recorder.chunk_count(), 2);
    }

    #[test]
    fn test_finalize_concatenates_chunks() {
        let mut recorder = MjpegRecorder::start();
        recorder.push_frame(&frame(16, 16, 100), 16, 16).unwrap();
        recorder.push_frame(&frame(16, 16, 200), 16, 16).unwrap();
        let video = recorder.finalize().unwrap();
        assert_eq!(video.chunk_lens.len(), 2);
        let total: usize = video.chunk_lens.iter().map(|l| *l as usize).sum();
        assert_eq!(video.data.len(), total);
        assert_eq!(video.width, 16);

        // Each chunk decodes as a standalone JPEG
        let first = video.chunk(0).unwrap();
        let decoded = image::load_from_memory(first).unwrap();
        assert_eq!(decoded.width(), 16);
    }

    #[test]
    fn test_finalize_twice_fails() {
        let mut recorder = MjpegRecorder::start();
        recorder.push_frame(&frame(8, 8, 1), 8, 8).unwrap();
        assert!(recorder.finalize().is_ok());
        assert!(matches!(
            recorder.finalize(),
            Err(RecorderError::AlreadyFinalized)
        ));
    }

    #[test]
    fn test_push_after_finalize_fails() {
        let mut recorder = MjpegRecorder::start();
        recorder.finalize().unwrap();
        assert!(matches!(
            recorder.push_frame(&frame(8, 8, 1), 8, 8),
            Err(RecorderError::AlreadyFinalized)
        ));
    }
}
