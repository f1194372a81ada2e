// SPDX-License-Identifier: GPL-3.0-only

//! Capture session driver
//!
//! Owns every collaborator of a running session — effect registry, render
//! surface, frame loop, device stream, recorder, store, identity and
//! presentation sink — and advances the pure state machine by feeding it
//! events and executing the actions it returns.
//!
//! All entry points run on one cooperative thread of control: press and
//! release notifications, render ticks and timer firings are each a single
//! callback turn. Timers are deadlines polled at the start of every turn,
//! so a due hold/cap timer is processed before the event that follows it.

use crate::backends::device::types::{Facing, SourceFrame, StreamConstraints};
use crate::backends::device::{DeviceProvider, DeviceStream, acquire_with_fallback, synthetic::SyntheticProvider};
use crate::config::Config;
use crate::effects::{EffectRegistry, catalog};
use crate::errors::{AppError, AppResult, RecorderError, SessionError};
use crate::identity::{IdentityProvider, StaticIdentity, UserInfo};
use crate::media::{CapturedMedia, MediaRecord};
use crate::pipelines;
use crate::presentation::{LogPresentation, PresentationSink};
use crate::render::frame_loop::{FrameLoop, TickOutcome};
use crate::render::surface::RenderSurface;
use crate::session::clock::{Clock, SystemClock};
use crate::session::recorder::{MjpegRecorder, RecorderFactory, StreamRecorder};
use crate::session::state::{SessionAction, SessionEvent, SessionMode, SessionState, transition};
use crate::storage::{MediaStore, MemoryStore, SaveReceipt};
use crate::constants::{HOLD_THRESHOLD, MAX_RECORDING};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Artifact and caption staged while `Reviewing`
///
/// Held as one value whose lifetime is the Reviewing stage: every exit
/// transition drops or consumes it, so nothing captured can leak into the
/// next cycle.
#[derive(Debug)]
pub struct ReviewStage {
    pub media: CapturedMedia,
    pub caption: String,
}

/// Builder for a capture session
///
/// Defaults are headless-friendly: synthetic device, in-memory store, a
/// signed-in local user, and the built-in effect catalog.
pub struct SessionBuilder {
    registry: EffectRegistry,
    provider: Box<dyn DeviceProvider>,
    store: Box<dyn MediaStore>,
    identity: Box<dyn IdentityProvider>,
    presentation: Box<dyn PresentationSink>,
    clock: Box<dyn Clock>,
    recorder_factory: RecorderFactory,
    hold_threshold: Duration,
    record_cap: Duration,
    surface: RenderSurface,
    mirror_preview: bool,
    facing: Facing,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self {
            registry: catalog::builtin_registry(),
            provider: Box::new(SyntheticProvider::new()),
            store: Box::new(MemoryStore::new()),
            identity: Box::new(StaticIdentity::signed_in("local", "local")),
            presentation: Box::new(LogPresentation),
            clock: Box::new(SystemClock),
            recorder_factory: MjpegRecorder::factory(),
            hold_threshold: HOLD_THRESHOLD,
            record_cap: MAX_RECORDING,
            surface: RenderSurface::new(),
            mirror_preview: true,
            facing: Facing::Front,
        }
    }

    pub fn registry(mut self, registry: EffectRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn provider(mut self, provider: impl DeviceProvider + 'static) -> Self {
        self.provider = Box::new(provider);
        self
    }

    pub fn store(mut self, store: impl MediaStore + 'static) -> Self {
        self.store = Box::new(store);
        self
    }

    pub fn identity(mut self, identity: impl IdentityProvider + 'static) -> Self {
        self.identity = Box::new(identity);
        self
    }

    pub fn presentation(mut self, sink: impl PresentationSink + 'static) -> Self {
        self.presentation = Box::new(sink);
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn recorder_factory(mut self, factory: RecorderFactory) -> Self {
        self.recorder_factory = factory;
        self
    }

    pub fn hold_threshold(mut self, threshold: Duration) -> Self {
        self.hold_threshold = threshold;
        self
    }

    pub fn record_cap(mut self, cap: Duration) -> Self {
        self.record_cap = cap;
        self
    }

    /// Non-canonical surface size (tests use small targets)
    pub fn surface_size(mut self, width: u32, height: u32) -> Self {
        self.surface = RenderSurface::with_size(width, height);
        self
    }

    pub fn facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    pub fn mirror_preview(mut self, mirror: bool) -> Self {
        self.mirror_preview = mirror;
        self
    }

    /// Apply user configuration (thresholds, mirroring, default facing)
    pub fn apply_config(mut self, config: &Config) -> Self {
        self.hold_threshold = Duration::from_millis(config.hold_threshold_ms);
        self.record_cap = Duration::from_secs(config.max_recording_secs);
        self.mirror_preview = config.mirror_preview;
        self.facing = config.default_facing;
        self
    }

    pub fn build(self) -> CaptureSession {
        CaptureSession {
            registry: self.registry,
            surface: self.surface,
            frame_loop: FrameLoop::new(),
            loop_generation: 0,
            state: SessionState::new(self.facing),
            clock: self.clock,
            provider: self.provider,
            stream: None,
            recorder_factory: self.recorder_factory,
            recorder: None,
            store: self.store,
            identity: self.identity,
            presentation: self.presentation,
            hold_threshold: self.hold_threshold,
            record_cap: self.record_cap,
            hold_deadline: None,
            cap_deadline: None,
            recording_started_at: None,
            last_frame: None,
            review: None,
            user: None,
            mirror_preview: self.mirror_preview,
        }
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A capture session: from stream acquisition to a saveable artifact
pub struct CaptureSession {
    registry: EffectRegistry,
    surface: RenderSurface,
    frame_loop: FrameLoop,
    /// Generation token of the loop instance this session scheduled
    loop_generation: u64,
    state: SessionState,
    clock: Box<dyn Clock>,
    provider: Box<dyn DeviceProvider>,
    stream: Option<Box<dyn DeviceStream>>,
    recorder_factory: RecorderFactory,
    recorder: Option<Box<dyn StreamRecorder>>,
    store: Box<dyn MediaStore>,
    identity: Box<dyn IdentityProvider>,
    presentation: Box<dyn PresentationSink>,
    hold_threshold: Duration,
    record_cap: Duration,
    hold_deadline: Option<(Instant, u64)>,
    cap_deadline: Option<(Instant, u64)>,
    recording_started_at: Option<Instant>,
    /// Most recent composited source frame, kept for the final photo bake
    last_frame: Option<SourceFrame>,
    review: Option<ReviewStage>,
    user: Option<UserInfo>,
    mirror_preview: bool,
}

impl CaptureSession {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    // ------------------------------------------------------------------
    // Lifecycle entry points (each is one callback turn)
    // ------------------------------------------------------------------

    /// Start the session: acquire a stream and go live.
    ///
    /// Refused without a signed-in user. Acquisition failures are
    /// categorized and leave the session in `Idle`.
    pub fn start(&mut self) -> AppResult<()> {
        if self.state.mode != SessionMode::Idle {
            return Err(SessionError::InvalidMode {
                operation: "start",
                mode: self.state.mode.name(),
            }
            .into());
        }
        let user = self
            .identity
            .current_user()
            .ok_or(SessionError::NoCurrentUser)?;
        info!(user = %user.username, facing = %self.state.facing, "Starting capture session");
        self.user = Some(user);
        self.dispatch(SessionEvent::Start)
    }

    /// Capture control pressed down
    pub fn press_started(&mut self) -> AppResult<()> {
        self.poll_timers()?;
        self.dispatch(SessionEvent::PressStarted)
    }

    /// Capture control released.
    ///
    /// Due timers are processed first: when the hold threshold already
    /// elapsed, recording has begun by the time the release is interpreted,
    /// so it finalizes the video; a quick tap takes the photo path.
    pub fn press_released(&mut self) -> AppResult<()> {
        self.poll_timers()?;
        self.dispatch(SessionEvent::PressReleased)
    }

    /// One render tick.
    ///
    /// Processes due timers, then — while streaming — polls the device for
    /// a frame, advances the frame counter and applies the active effect.
    /// A stream that is not ready yet simply leaves the surface untouched;
    /// the caller keeps scheduling ticks regardless.
    pub fn tick(&mut self) -> AppResult<()> {
        self.poll_timers()?;

        if !self.state.mode.is_streaming() || !self.frame_loop.is_running() {
            return Ok(());
        }
        let Some(stream) = self.stream.as_mut() else {
            return Ok(());
        };
        if stream.is_ended() {
            return Ok(());
        }
        let Some(frame) = stream.poll_frame() else {
            return Ok(());
        };

        match self.frame_loop.advance(self.loop_generation) {
            TickOutcome::Ran(frame_index) => {
                let facing = self.facing_for_draw();
                self.registry
                    .apply(&mut self.surface, Some(&frame), frame_index, facing);
                self.last_frame = Some(frame);

                if self.state.mode.is_recording()
                    && let Some(recorder) = self.recorder.as_mut()
                    && let Err(e) = recorder.push_frame(
                        self.surface.pixels(),
                        self.surface.width(),
                        self.surface.height(),
                    )
                {
                    // Absorbed: one lost chunk must not kill the loop
                    error!(error = %e, "Failed to record frame chunk");
                }
            }
            TickOutcome::Stale => {
                debug!("Dropping tick from superseded loop instance");
            }
        }
        Ok(())
    }

    /// Explicitly stop an active recording
    pub fn stop_recording(&mut self) -> AppResult<()> {
        self.poll_timers()?;
        self.dispatch(SessionEvent::StopRecording)
    }

    /// Discard the reviewed artifact and go live again
    pub fn retake(&mut self) -> AppResult<()> {
        self.dispatch(SessionEvent::Retake)
    }

    /// Toggle the device facing; honored only while `Live`
    pub fn switch_facing(&mut self) -> AppResult<()> {
        self.dispatch(SessionEvent::SwitchFacing)
    }

    /// Tear the session down from any mode
    pub fn end(&mut self) -> AppResult<()> {
        self.user = None;
        self.dispatch(SessionEvent::End)
    }

    /// Hand the reviewed artifact to the persistence layer.
    ///
    /// For videos a thumbnail is derived off-thread first; failures there
    /// are logged and the save proceeds without one. A store failure is
    /// retryable: the session stays in `Reviewing` and keeps the artifact.
    pub async fn save(&mut self) -> AppResult<SaveReceipt> {
        if self.state.mode != SessionMode::Reviewing {
            return Err(SessionError::InvalidMode {
                operation: "save",
                mode: self.state.mode.name(),
            }
            .into());
        }
        let Some(review) = self.review.as_ref() else {
            return Err(AppError::Other("no captured media to save".to_string()));
        };
        let user = self.user.clone().ok_or(SessionError::NoCurrentUser)?;

        let thumbnail = pipelines::video::derive_thumbnail_async(&review.media).await;
        let record =
            MediaRecord::assemble(&review.media, user.id, review.caption.clone(), thumbnail);

        match self.store.save(&record) {
            Ok(receipt) => {
                info!(id = %receipt.id, "Save handoff initiated");
                self.review = None;
                self.dispatch(SessionEvent::SaveInitiated)?;
                Ok(receipt)
            }
            Err(e) => {
                warn!(error = %e, "Save failed; artifact retained for retry");
                self.dispatch(SessionEvent::SaveFailed)?;
                Err(AppError::Persist(e))
            }
        }
    }

    // ------------------------------------------------------------------
    // Effects and review
    // ------------------------------------------------------------------

    /// Change the active effect and report it to the presentation layer.
    ///
    /// Unknown ids keep the current effect (the report still describes
    /// whatever is active).
    pub fn set_effect(&mut self, id: &str) -> bool {
        let changed = self.registry.set_active(id);
        let descriptor = self.registry.active_descriptor();
        self.presentation.effect_changed(&descriptor);
        changed
    }

    /// Caption the reviewed artifact; ignored outside `Reviewing`
    pub fn set_caption(&mut self, caption: impl Into<String>) {
        match self.review.as_mut() {
            Some(review) => review.caption = caption.into(),
            None => warn!("No reviewed artifact to caption"),
        }
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn mode(&self) -> SessionMode {
        self.state.mode
    }

    pub fn facing(&self) -> Facing {
        self.state.facing
    }

    pub fn registry(&self) -> &EffectRegistry {
        &self.registry
    }

    pub fn surface(&self) -> &RenderSurface {
        &self.surface
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_loop.frame_index()
    }

    pub fn loop_running(&self) -> bool {
        self.frame_loop.is_running()
    }

    pub fn stream_active(&self) -> bool {
        self.stream.is_some()
    }

    pub fn review(&self) -> Option<&ReviewStage> {
        self.review.as_ref()
    }

    /// Elapsed recording time, while recording
    pub fn elapsed_recording(&self) -> Option<Duration> {
        if self.state.mode.is_recording() {
            self.recording_started_at
                .map(|started| self.clock.now() - started)
        } else {
            None
        }
    }

    // ------------------------------------------------------------------
    // Event dispatch and action execution
    // ------------------------------------------------------------------

    fn dispatch(&mut self, event: SessionEvent) -> AppResult<()> {
        let (next, actions) = transition(self.state.clone(), event);
        debug!(
            from = self.state.mode.name(),
            to = next.mode.name(),
            ?event,
            "Session transition"
        );
        self.state = next;
        for action in actions {
            self.run_action(action)?;
        }
        Ok(())
    }

    /// Fire any due timers, oldest deadline first.
    ///
    /// Sequence numbers travel with the fired event; the state machine
    /// drops firings whose number no longer matches the mode that armed
    /// them, so a late timer can never replay a decided press.
    fn poll_timers(&mut self) -> AppResult<()> {
        let now = self.clock.now();
        if let Some((deadline, seq)) = self.hold_deadline
            && now >= deadline
        {
            self.hold_deadline = None;
            self.dispatch(SessionEvent::HoldElapsed { seq })?;
        }
        let now = self.clock.now();
        if let Some((deadline, seq)) = self.cap_deadline
            && now >= deadline
        {
            self.cap_deadline = None;
            self.dispatch(SessionEvent::CapElapsed { seq })?;
        }
        Ok(())
    }

    fn run_action(&mut self, action: SessionAction) -> AppResult<()> {
        match action {
            SessionAction::AcquireStream => self.acquire_stream(),
            SessionAction::StopStream => {
                if let Some(mut stream) = self.stream.take() {
                    stream.stop();
                }
                Ok(())
            }
            SessionAction::StartLoop => {
                self.surface.reset();
                self.last_frame = None;
                self.loop_generation = self.frame_loop.start();
                Ok(())
            }
            SessionAction::CancelLoop => {
                self.frame_loop.cancel();
                Ok(())
            }
            SessionAction::ArmHoldTimer { seq } => {
                self.hold_deadline = Some((self.clock.now() + self.hold_threshold, seq));
                Ok(())
            }
            SessionAction::CancelHoldTimer => {
                self.hold_deadline = None;
                Ok(())
            }
            SessionAction::ArmCapTimer { seq } => {
                let now = self.clock.now();
                self.cap_deadline = Some((now + self.record_cap, seq));
                self.recording_started_at = Some(now);
                Ok(())
            }
            SessionAction::CancelCapTimer => {
                self.cap_deadline = None;
                Ok(())
            }
            SessionAction::StartRecorder => self.start_recorder(),
            SessionAction::FinalizeRecorder => {
                self.finalize_recorder();
                Ok(())
            }
            SessionAction::AbortRecorder => {
                if self.recorder.take().is_some() {
                    info!("Recording aborted, artifact discarded");
                }
                Ok(())
            }
            SessionAction::BakePhoto => self.bake_photo(),
            SessionAction::DiscardReview => {
                if let Some(review) = self.review.take() {
                    info!(kind = %review.media.kind, "Discarding reviewed artifact");
                }
                Ok(())
            }
            SessionAction::ReportActiveEffect => {
                let descriptor = self.registry.active_descriptor();
                self.presentation.effect_changed(&descriptor);
                Ok(())
            }
        }
    }

    /// Stop any prior stream, then acquire one for the current facing.
    ///
    /// On failure the session falls back to `Idle` and the categorized
    /// error is escalated to whoever triggered the transition.
    fn acquire_stream(&mut self) -> AppResult<()> {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
        }
        let constraints = StreamConstraints {
            facing: self.state.facing,
            ideal_resolution: Some((self.surface.width(), self.surface.height())),
            ideal_aspect: Some(self.surface.aspect()),
        };
        match acquire_with_fallback(self.provider.as_mut(), &constraints) {
            Ok(stream) => {
                self.stream = Some(stream);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, facing = %self.state.facing, "Stream acquisition failed");
                self.state.mode = SessionMode::Idle;
                self.frame_loop.cancel();
                self.hold_deadline = None;
                self.cap_deadline = None;
                Err(AppError::Device(e))
            }
        }
    }

    /// Begin recording sourced from the render surface.
    ///
    /// A failure aborts the Recording transition: the session reverts to
    /// `Live` and the error is escalated.
    fn start_recorder(&mut self) -> AppResult<()> {
        if self.stream.is_none() {
            let err = RecorderError::NoActiveStream;
            error!(error = %err, "Cannot start recorder");
            self.dispatch(SessionEvent::RecorderStartFailed)?;
            return Err(err.into());
        }
        match (self.recorder_factory)() {
            Ok(recorder) => {
                info!("Recording started");
                self.recorder = Some(recorder);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Recorder failed to start");
                self.dispatch(SessionEvent::RecorderStartFailed)?;
                Err(e.into())
            }
        }
    }

    fn finalize_recorder(&mut self) {
        let Some(mut recorder) = self.recorder.take() else {
            warn!("No recorder to finalize");
            return;
        };
        match recorder.finalize() {
            Ok(encoded) => {
                let media = pipelines::video::assemble_video(encoded, &self.registry.active().id);
                info!(
                    chunks = media.chunk_lens.len(),
                    bytes = media.payload.len(),
                    "Video artifact assembled"
                );
                self.review = Some(ReviewStage {
                    media,
                    caption: String::new(),
                });
            }
            Err(e) => {
                error!(error = %e, "Recorder finalize failed; nothing to review");
            }
        }
    }

    /// One final effect application, then export the surface as a still
    fn bake_photo(&mut self) -> AppResult<()> {
        let frame_index = self.frame_loop.frame_index();
        let source = self.last_frame.clone();
        if source.is_none() {
            warn!("Baking photo without a source frame; surface exports as-is");
        }
        let facing = self.facing_for_draw();
        self.registry
            .apply(&mut self.surface, source.as_ref(), frame_index, facing);

        let media = pipelines::photo::export_photo(&self.surface, &self.registry.active().id)?;
        info!(bytes = media.payload.len(), "Photo artifact exported");
        self.review = Some(ReviewStage {
            media,
            caption: String::new(),
        });
        Ok(())
    }

    fn facing_for_draw(&self) -> Facing {
        if self.mirror_preview {
            self.state.facing
        } else {
            Facing::Back
        }
    }
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("mode", &self.state.mode.name())
            .field("facing", &self.state.facing)
            .field("effect", &self.registry.active().id)
            .field("frame_index", &self.frame_loop.frame_index())
            .field("stream", &self.stream.is_some())
            .field("recording", &self.recorder.is_some())
            .finish()
    }
}
