// SPDX-License-Identifier: GPL-3.0-only

//! Captured media types

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of captured artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Photo,
    Video,
}

impl MediaKind {
    /// File extension for the encoded payload
    pub fn extension(&self) -> &'static str {
        match self {
            MediaKind::Photo => crate::constants::PHOTO_EXTENSION,
            MediaKind::Video => crate::constants::VIDEO_EXTENSION,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Photo => write!(f, "photo"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// A finished capture, transient until handed to the persistence layer
///
/// The payload already has the crop, mirror and effect baked in because it
/// was produced from the render surface.
#[derive(Clone)]
pub struct CapturedMedia {
    pub kind: MediaKind,
    /// Encoded payload (PNG for photos, concatenated JPEG chunks for video)
    pub payload: Vec<u8>,
    /// Id of the effect active at capture time
    pub effect_id: String,
    pub created_at: DateTime<Local>,
    pub width: u32,
    pub height: u32,
    /// Chunk lengths for video payloads; photos carry a single implicit chunk
    pub chunk_lens: Vec<u32>,
}

impl std::fmt::Debug for CapturedMedia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapturedMedia")
            .field("kind", &self.kind)
            .field("payload_len", &self.payload.len())
            .field("effect_id", &self.effect_id)
            .field("created_at", &self.created_at)
            .field("chunks", &self.chunk_lens.len())
            .finish()
    }
}

/// The record handed to the persistence layer on save
#[derive(Debug, Clone)]
pub struct MediaRecord {
    pub id: Uuid,
    /// Id of the signed-in user owning the capture
    pub owner_id: String,
    pub kind: MediaKind,
    pub payload: Vec<u8>,
    pub caption: String,
    pub created_at: DateTime<Local>,
    pub effect_id: String,
    /// PNG thumbnail for videos, when derivation succeeded
    pub thumbnail: Option<Vec<u8>>,
}

impl MediaRecord {
    /// Assemble a record from a capture plus its owner, caption and
    /// (optional) thumbnail
    pub fn assemble(
        media: &CapturedMedia,
        owner_id: String,
        caption: String,
        thumbnail: Option<Vec<u8>>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            kind: media.kind,
            payload: media.payload.clone(),
            caption,
            created_at: media.created_at,
            effect_id: media.effect_id.clone(),
            thumbnail,
        }
    }
}
