// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for headless capture
//!
//! This module provides command-line functionality for:
//! - Listing the effect catalog
//! - Taking a photo
//! - Recording a video
//!
//! Captures run against the synthetic device backend (or an image file via
//! `--source`), driving the same session machinery the interactive app
//! uses, and land in the filesystem media store.

use booth::backends::device::synthetic::SyntheticProvider;
use booth::config::Config;
use booth::constants::TICK_INTERVAL;
use booth::identity::{IdentityProvider, StaticIdentity};
use booth::session::{CaptureSession, SessionMode};
use booth::storage::FsMediaStore;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// How long to wait for the stream to warm up before giving up
const WARMUP_TIMEOUT: Duration = Duration::from_secs(5);
/// Frames to render before capturing, so the pattern has settled
const WARMUP_FRAMES: u64 = 5;

/// List the effect catalog
pub fn list_effects() -> Result<(), Box<dyn std::error::Error>> {
    let session = CaptureSession::builder().build();

    println!("Available effects:");
    println!();
    for effect in session.registry().list() {
        println!(
            "  {:<12} {:<16} [{}]",
            effect.id,
            effect.display_name,
            effect.kind.name()
        );
    }
    Ok(())
}

/// Take a photo and save it
pub fn take_photo(
    effect: Option<String>,
    output: Option<PathBuf>,
    source: Option<PathBuf>,
    caption: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = build_session(output, source)?;

    if let Some(effect) = &effect {
        apply_effect(&mut session, effect)?;
    }

    session.start()?;
    warm_up(&mut session)?;

    println!("Capturing...");
    session.press_started()?;
    session.press_released()?; // A quick tap takes the photo path

    if session.mode() != SessionMode::Reviewing {
        return Err("Capture did not produce a reviewable photo".into());
    }
    if let Some(caption) = caption {
        session.set_caption(caption);
    }

    let rt = tokio::runtime::Runtime::new()?;
    let receipt = rt.block_on(session.save())?;

    match receipt.payload_path {
        Some(path) => println!("Photo saved: {}", path.display()),
        None => println!("Photo saved: {}", receipt.id),
    }
    Ok(())
}

/// Record a video and save it
pub fn record_video(
    effect: Option<String>,
    duration: u64,
    output: Option<PathBuf>,
    source: Option<PathBuf>,
    caption: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = build_session(output, source)?;

    if let Some(effect) = &effect {
        apply_effect(&mut session, effect)?;
    }

    session.start()?;
    warm_up(&mut session)?;

    println!("Recording for up to {}s (hold)...", duration);
    session.press_started()?;
    let pressed_at = Instant::now();

    while pressed_at.elapsed() < Duration::from_secs(duration) {
        session.tick()?;
        if session.mode() == SessionMode::Reviewing {
            println!("Recording stopped at the duration cap");
            break;
        }
        std::thread::sleep(TICK_INTERVAL);
    }
    if session.mode() != SessionMode::Reviewing {
        session.press_released()?;
    }

    if session.mode() != SessionMode::Reviewing {
        return Err("Recording did not produce a reviewable video".into());
    }
    if let Some(caption) = caption {
        session.set_caption(caption);
    }

    let rt = tokio::runtime::Runtime::new()?;
    let receipt = rt.block_on(session.save())?;

    match receipt.payload_path {
        Some(path) => println!("Video saved: {}", path.display()),
        None => println!("Video saved: {}", receipt.id),
    }
    Ok(())
}

/// Assemble a session from config plus CLI overrides
fn build_session(
    output: Option<PathBuf>,
    source: Option<PathBuf>,
) -> Result<CaptureSession, Box<dyn std::error::Error>> {
    let config = Config::load();

    let provider = match source {
        Some(path) => SyntheticProvider::from_image(path),
        None => SyntheticProvider::new(),
    };

    let store = match output {
        Some(dir) => FsMediaStore::rooted_at(dir),
        None => match (&config.photos_dir, &config.videos_dir) {
            (Some(photos), Some(videos)) => FsMediaStore::new(photos.clone(), videos.clone()),
            _ => FsMediaStore::default_locations(),
        },
    };

    let identity = match StaticIdentity::from_os_user().current_user() {
        Some(_) => StaticIdentity::from_os_user(),
        None => StaticIdentity::signed_in("local", "local"),
    };

    let mut session = CaptureSession::builder()
        .apply_config(&config)
        .provider(provider)
        .store(store)
        .identity(identity)
        .build();

    if config.default_effect != booth::effects::DEFAULT_EFFECT_ID {
        session.set_effect(&config.default_effect);
    }
    Ok(session)
}

/// Activate an effect by id, or fail with the list of valid ids
fn apply_effect(
    session: &mut CaptureSession,
    effect: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if session.registry().get(effect).is_none() {
        let known: Vec<&str> = session
            .registry()
            .list()
            .iter()
            .map(|e| e.id.as_str())
            .collect();
        return Err(format!(
            "Unknown effect '{}'. Known effects: {}",
            effect,
            known.join(", ")
        )
        .into());
    }
    session.set_effect(effect);
    Ok(())
}

/// Tick until the stream has produced a few frames
fn warm_up(session: &mut CaptureSession) -> Result<(), Box<dyn std::error::Error>> {
    let start = Instant::now();
    while session.frame_index() < WARMUP_FRAMES {
        if start.elapsed() > WARMUP_TIMEOUT {
            return Err("Timed out waiting for frames from the device".into());
        }
        session.tick()?;
        std::thread::sleep(TICK_INTERVAL);
    }
    Ok(())
}
