// SPDX-License-Identifier: GPL-3.0-only

//! Persistence handoff
//!
//! The durable keyed store lives outside the capture core; this module
//! defines the handoff interface plus two implementations: a filesystem
//! store used by the CLI (payload file, JSON sidecar, optional thumbnail)
//! and an in-memory store for tests.

use crate::errors::PersistError;
use crate::media::{MediaKind, MediaRecord};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};
use uuid::Uuid;

/// Acknowledgement that a record was accepted by the store
#[derive(Debug, Clone)]
pub struct SaveReceipt {
    pub id: Uuid,
    /// Where the payload landed, for stores that write files
    pub payload_path: Option<PathBuf>,
}

/// Receiver of finished captures
///
/// Saving may fail; the session treats every failure as retryable and
/// keeps the artifact.
pub trait MediaStore: Send {
    fn save(&mut self, record: &MediaRecord) -> Result<SaveReceipt, PersistError>;
}

/// Sidecar metadata written next to each payload file
#[derive(Debug, Serialize, Deserialize)]
struct RecordSidecar {
    id: String,
    owner_id: String,
    kind: MediaKind,
    caption: String,
    created_at: String,
    effect_id: String,
    payload_file: String,
    thumbnail_file: Option<String>,
}

/// Filesystem-backed media store
///
/// Photos land under the pictures root, videos under the videos root, each
/// as `<kind>_<timestamp>_<short id>.<ext>` plus a `.json` sidecar.
pub struct FsMediaStore {
    photos_dir: PathBuf,
    videos_dir: PathBuf,
}

impl FsMediaStore {
    pub fn new(photos_dir: PathBuf, videos_dir: PathBuf) -> Self {
        Self {
            photos_dir,
            videos_dir,
        }
    }

    /// Store rooted at a single directory (CLI `--output`)
    pub fn rooted_at(dir: PathBuf) -> Self {
        Self::new(dir.clone(), dir)
    }

    /// Store at the user's default media locations
    pub fn default_locations() -> Self {
        let photos = dirs::picture_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("booth");
        let videos = dirs::video_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("booth");
        Self::new(photos, videos)
    }

    fn dir_for(&self, kind: MediaKind) -> &PathBuf {
        match kind {
            MediaKind::Photo => &self.photos_dir,
            MediaKind::Video => &self.videos_dir,
        }
    }
}

impl MediaStore for FsMediaStore {
    fn save(&mut self, record: &MediaRecord) -> Result<SaveReceipt, PersistError> {
        if record.owner_id.is_empty() {
            return Err(PersistError::Rejected("record has no owner".to_string()));
        }

        let dir = self.dir_for(record.kind);
        std::fs::create_dir_all(dir)?;

        let short_id = &record.id.to_string()[..8];
        let stem = format!(
            "{}_{}_{}",
            record.kind,
            record.created_at.format("%Y%m%d_%H%M%S"),
            short_id
        );
        let payload_path = dir.join(format!("{}.{}", stem, record.kind.extension()));
        std::fs::write(&payload_path, &record.payload)?;

        let thumbnail_file = match &record.thumbnail {
            Some(bytes) => {
                let thumb_path = dir.join(format!("{}_thumb.png", stem));
                std::fs::write(&thumb_path, bytes)?;
                thumb_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
            }
            None => None,
        };

        let sidecar = RecordSidecar {
            id: record.id.to_string(),
            owner_id: record.owner_id.clone(),
            kind: record.kind,
            caption: record.caption.clone(),
            created_at: record.created_at.to_rfc3339(),
            effect_id: record.effect_id.clone(),
            payload_file: payload_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            thumbnail_file,
        };
        let sidecar_path = dir.join(format!("{}.json", stem));
        let json = serde_json::to_vec_pretty(&sidecar)
            .map_err(|e| PersistError::Storage(e.to_string()))?;
        std::fs::write(&sidecar_path, json)?;

        info!(path = %payload_path.display(), kind = %record.kind, "Media saved");
        Ok(SaveReceipt {
            id: record.id,
            payload_path: Some(payload_path),
        })
    }
}

/// In-memory store for tests and ephemeral runs
#[derive(Default)]
pub struct MemoryStore {
    records: Vec<MediaRecord>,
    /// When set, the next save fails with a storage error
    fail_next: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next save attempt fail (for retry testing)
    pub fn fail_next_save(&mut self) {
        self.fail_next = true;
    }

    pub fn records(&self) -> &[MediaRecord] {
        &self.records
    }
}

impl MediaStore for MemoryStore {
    fn save(&mut self, record: &MediaRecord) -> Result<SaveReceipt, PersistError> {
        if self.fail_next {
            self.fail_next = false;
            warn!("Simulated storage failure");
            return Err(PersistError::Storage("simulated failure".to_string()));
        }
        self.records.push(record.clone());
        Ok(SaveReceipt {
            id: record.id,
            payload_path: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;

    fn record(kind: MediaKind, thumbnail: Option<Vec<u8>>) -> MediaRecord {
        MediaRecord {
            id: Uuid::new_v4(),
            owner_id: "user-1".to_string(),
            kind,
            payload: vec![1, 2, 3, 4],
            caption: "caption".to_string(),
            created_at: Local::now(),
            effect_id: "sepia".to_string(),
            thumbnail,
        }
    }

    #[test]
    fn test_fs_store_writes_payload_and_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FsMediaStore::rooted_at(dir.path().to_path_buf());
        let receipt = store.save(&record(MediaKind::Photo, None)).unwrap();

        let payload_path = receipt.payload_path.unwrap();
        assert!(payload_path.exists());
        let sidecar_path = payload_path.with_extension("json");
        assert!(sidecar_path.exists());

        let sidecar: RecordSidecar =
            serde_json::from_slice(&std::fs::read(sidecar_path).unwrap()).unwrap();
        assert_eq!(sidecar.owner_id, "user-1");
        assert_eq!(sidecar.effect_id, "sepia");
        assert!(sidecar.thumbnail_file.is_none());
    }

    #[test]
    fn test_fs_store_writes_thumbnail_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FsMediaStore::rooted_at(dir.path().to_path_buf());
        let receipt = store
            .save(&record(MediaKind::Video, Some(vec![9, 9])))
            .unwrap();
        let payload_path = receipt.payload_path.unwrap();
        let stem = payload_path.file_stem().unwrap().to_string_lossy();
        assert!(payload_path.with_file_name(format!("{}_thumb.png", stem)).exists());
    }

    #[test]
    fn test_fs_store_rejects_ownerless_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FsMediaStore::rooted_at(dir.path().to_path_buf());
        let mut r = record(MediaKind::Photo, None);
        r.owner_id.clear();
        assert!(matches!(store.save(&r), Err(PersistError::Rejected(_))));
    }

    #[test]
    fn test_memory_store_retry_after_failure() {
        let mut store = MemoryStore::new();
        store.fail_next_save();
        let r = record(MediaKind::Photo, None);
        assert!(store.save(&r).is_err());
        assert!(store.save(&r).is_ok());
        assert_eq!(store.records().len(), 1);
    }
}
