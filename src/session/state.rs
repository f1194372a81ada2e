// SPDX-License-Identifier: GPL-3.0-only

//! Capture session state machine
//!
//! Transitions are a pure function `(state, event) -> (state, actions)`.
//! The driver executes the returned actions against the real collaborators
//! (device stream, frame loop, recorder, store); nothing here touches the
//! outside world, so every transition is unit-testable without devices or
//! real timers.
//!
//! Ordering between independent event sources (press-release vs. timer
//! firings) is not guaranteed. Two mechanisms resolve it: every deferred
//! timer carries a monotonic sequence number that must match the one stored
//! in the mode that armed it, and every event is interpreted against the
//! authoritative current mode. A release that arrives after recording began
//! therefore always finalizes the recording; it can never retroactively
//! become a tap.

use crate::backends::device::types::Facing;
use tracing::debug;

/// Session mode
///
/// A device stream and a frame loop are active exactly in the streaming
/// modes (`Live`, `PendingPress`, `Recording`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// No session running
    Idle,
    /// Previewing; capture control not pressed
    Live,
    /// Capture control pressed, hold timer armed, outcome undecided
    PendingPress {
        /// Sequence number the armed hold timer must present
        hold_seq: u64,
    },
    /// Recording the surface; hard-stop timer armed
    Recording {
        /// Sequence number the armed cap timer must present
        cap_seq: u64,
    },
    /// A captured artifact awaits retake or save
    Reviewing,
}

impl SessionMode {
    pub fn name(&self) -> &'static str {
        match self {
            SessionMode::Idle => "idle",
            SessionMode::Live => "live",
            SessionMode::PendingPress { .. } => "pending-press",
            SessionMode::Recording { .. } => "recording",
            SessionMode::Reviewing => "reviewing",
        }
    }

    /// Whether a device stream and frame loop should be active
    pub fn is_streaming(&self) -> bool {
        matches!(
            self,
            SessionMode::Live | SessionMode::PendingPress { .. } | SessionMode::Recording { .. }
        )
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, SessionMode::Recording { .. })
    }
}

/// Pure session state
#[derive(Debug, Clone)]
pub struct SessionState {
    pub mode: SessionMode,
    pub facing: Facing,
    /// Monotonic counter for timer sequence numbers
    next_seq: u64,
}

impl SessionState {
    pub fn new(facing: Facing) -> Self {
        Self {
            mode: SessionMode::Idle,
            facing,
            next_seq: 0,
        }
    }

    fn take_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

/// Events consumed by the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Begin a session: Idle → Live
    Start,
    /// Capture control pressed down
    PressStarted,
    /// Capture control released
    PressReleased,
    /// The tap/hold threshold timer fired
    HoldElapsed { seq: u64 },
    /// The hard recording cap fired
    CapElapsed { seq: u64 },
    /// The recorder could not be started
    RecorderStartFailed,
    /// Explicit stop while recording
    StopRecording,
    /// Discard the reviewed artifact and go live again
    Retake,
    /// The persistence handoff was initiated successfully
    SaveInitiated,
    /// The persistence handoff failed (retryable; artifact retained)
    SaveFailed,
    /// Toggle the device facing (only honored while Live)
    SwitchFacing,
    /// Tear the session down from any mode
    End,
}

/// Side effects the driver must perform, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
    /// Stop any prior stream, then acquire one for the current facing
    AcquireStream,
    StopStream,
    /// Reset the surface and frame counter, then start a fresh loop instance
    StartLoop,
    CancelLoop,
    ArmHoldTimer { seq: u64 },
    CancelHoldTimer,
    ArmCapTimer { seq: u64 },
    CancelCapTimer,
    StartRecorder,
    /// Finalize the recorder and stage the video artifact for review
    FinalizeRecorder,
    /// Drop the recorder without producing an artifact
    AbortRecorder,
    /// Final effect application and still export from the surface
    BakePhoto,
    /// Drop the reviewed artifact and caption
    DiscardReview,
    /// Report the active effect to the presentation layer
    ReportActiveEffect,
}

/// Compute the successor state and the actions realizing the transition.
///
/// Events that do not apply in the current mode (stale timers, duplicate
/// releases, presses outside `Live`) leave the state unchanged and produce
/// no actions.
pub fn transition(
    mut state: SessionState,
    event: SessionEvent,
) -> (SessionState, Vec<SessionAction>) {
    use SessionAction as A;
    use SessionEvent as E;
    use SessionMode as M;

    let actions: Vec<SessionAction> = match (state.mode, event) {
        (M::Idle, E::Start) => {
            state.mode = M::Live;
            vec![A::AcquireStream, A::StartLoop, A::ReportActiveEffect]
        }

        (M::Live, E::PressStarted) => {
            let seq = state.take_seq();
            state.mode = M::PendingPress { hold_seq: seq };
            vec![A::ArmHoldTimer { seq }]
        }

        // Tap: released before the threshold fired. Photo path.
        (M::PendingPress { .. }, E::PressReleased) => {
            state.mode = M::Reviewing;
            vec![
                A::CancelHoldTimer,
                A::CancelLoop,
                A::StopStream,
                A::BakePhoto,
            ]
        }

        // Hold: the threshold fired while still pressed. Recording starts.
        (M::PendingPress { hold_seq }, E::HoldElapsed { seq }) if seq == hold_seq => {
            let cap_seq = state.take_seq();
            state.mode = M::Recording { cap_seq };
            vec![A::StartRecorder, A::ArmCapTimer { seq: cap_seq }]
        }

        // Recording ends on release, on the cap firing, or on explicit stop.
        (M::Recording { .. }, E::PressReleased | E::StopRecording) => {
            state.mode = M::Reviewing;
            finish_recording_actions()
        }
        (M::Recording { cap_seq }, E::CapElapsed { seq }) if seq == cap_seq => {
            state.mode = M::Reviewing;
            finish_recording_actions()
        }

        // The Recording transition could not complete; fall back to Live.
        (M::Recording { .. }, E::RecorderStartFailed) => {
            state.mode = M::Live;
            vec![A::CancelCapTimer]
        }

        (M::Reviewing, E::Retake) => {
            state.mode = M::Live;
            vec![
                A::DiscardReview,
                A::AcquireStream,
                A::StartLoop,
                A::ReportActiveEffect,
            ]
        }

        (M::Reviewing, E::SaveInitiated) => {
            state.mode = M::Idle;
            Vec::new()
        }
        (M::Reviewing, E::SaveFailed) => Vec::new(),

        (M::Live, E::SwitchFacing) => {
            state.facing = state.facing.toggled();
            vec![A::AcquireStream, A::StartLoop, A::ReportActiveEffect]
        }

        (M::Live, E::End) => {
            state.mode = M::Idle;
            vec![A::CancelLoop, A::StopStream]
        }
        (M::PendingPress { .. }, E::End) => {
            state.mode = M::Idle;
            vec![A::CancelHoldTimer, A::CancelLoop, A::StopStream]
        }
        (M::Recording { .. }, E::End) => {
            state.mode = M::Idle;
            vec![
                A::CancelCapTimer,
                A::AbortRecorder,
                A::CancelLoop,
                A::StopStream,
            ]
        }
        (M::Reviewing, E::End) => {
            state.mode = M::Idle;
            vec![A::DiscardReview]
        }

        // Everything else is a stale or out-of-mode event.
        (mode, event) => {
            debug!(mode = mode.name(), ?event, "Ignoring event in current mode");
            Vec::new()
        }
    };

    (state, actions)
}

fn finish_recording_actions() -> Vec<SessionAction> {
    vec![
        SessionAction::CancelCapTimer,
        SessionAction::FinalizeRecorder,
        SessionAction::CancelLoop,
        SessionAction::StopStream,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_state() -> SessionState {
        let (state, _) = transition(SessionState::new(Facing::Front), SessionEvent::Start);
        state
    }

    fn pressed_state() -> (SessionState, u64) {
        let (state, actions) = transition(live_state(), SessionEvent::PressStarted);
        let seq = match actions[0] {
            SessionAction::ArmHoldTimer { seq } => seq,
            _ => panic!("expected hold timer"),
        };
        (state, seq)
    }

    #[test]
    fn test_start_goes_live_and_acquires() {
        let (state, actions) = transition(SessionState::new(Facing::Front), SessionEvent::Start);
        assert_eq!(state.mode, SessionMode::Live);
        assert_eq!(actions[0], SessionAction::AcquireStream);
        assert!(actions.contains(&SessionAction::ReportActiveEffect));
    }

    #[test]
    fn test_tap_takes_photo_path() {
        let (state, _) = pressed_state();
        let (state, actions) = transition(state, SessionEvent::PressReleased);
        assert_eq!(state.mode, SessionMode::Reviewing);
        assert!(actions.contains(&SessionAction::BakePhoto));
        assert!(!actions.contains(&SessionAction::StartRecorder));
    }

    #[test]
    fn test_hold_starts_recording() {
        let (state, seq) = pressed_state();
        let (state, actions) = transition(state, SessionEvent::HoldElapsed { seq });
        assert!(state.mode.is_recording());
        assert_eq!(actions[0], SessionAction::StartRecorder);
    }

    #[test]
    fn test_stale_hold_timer_is_ignored() {
        // Release first (photo path), then the old timer fires late
        let (state, seq) = pressed_state();
        let (state, _) = transition(state, SessionEvent::PressReleased);
        let (state, actions) = transition(state, SessionEvent::HoldElapsed { seq });
        assert_eq!(state.mode, SessionMode::Reviewing);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_release_during_recording_finalizes_video() {
        let (state, seq) = pressed_state();
        let (state, _) = transition(state, SessionEvent::HoldElapsed { seq });
        let (state, actions) = transition(state, SessionEvent::PressReleased);
        assert_eq!(state.mode, SessionMode::Reviewing);
        assert!(actions.contains(&SessionAction::FinalizeRecorder));
        assert!(!actions.contains(&SessionAction::BakePhoto));
    }

    #[test]
    fn test_cap_timer_finalizes_once() {
        let (state, seq) = pressed_state();
        let (state, _) = transition(state, SessionEvent::HoldElapsed { seq });
        let cap_seq = match state.mode {
            SessionMode::Recording { cap_seq } => cap_seq,
            _ => panic!("expected recording"),
        };
        let (state, actions) = transition(state, SessionEvent::CapElapsed { seq: cap_seq });
        assert_eq!(state.mode, SessionMode::Reviewing);
        assert!(actions.contains(&SessionAction::FinalizeRecorder));

        // A late release after the cap fired must not finalize again
        let (state, actions) = transition(state, SessionEvent::PressReleased);
        assert_eq!(state.mode, SessionMode::Reviewing);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_stale_cap_timer_is_ignored() {
        let (state, seq) = pressed_state();
        let (state, _) = transition(state, SessionEvent::HoldElapsed { seq });
        let cap_seq = match state.mode {
            SessionMode::Recording { cap_seq } => cap_seq,
            _ => panic!("expected recording"),
        };
        // Released first; the cap deadline then fires against Reviewing
        let (state, _) = transition(state, SessionEvent::PressReleased);
        let (state, actions) = transition(state, SessionEvent::CapElapsed { seq: cap_seq });
        assert_eq!(state.mode, SessionMode::Reviewing);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_recorder_failure_returns_to_live() {
        let (state, seq) = pressed_state();
        let (state, _) = transition(state, SessionEvent::HoldElapsed { seq });
        let (state, actions) = transition(state, SessionEvent::RecorderStartFailed);
        assert_eq!(state.mode, SessionMode::Live);
        assert!(actions.contains(&SessionAction::CancelCapTimer));
    }

    #[test]
    fn test_retake_reacquires_stream() {
        let (state, _) = pressed_state();
        let (state, _) = transition(state, SessionEvent::PressReleased);
        let (state, actions) = transition(state, SessionEvent::Retake);
        assert_eq!(state.mode, SessionMode::Live);
        assert_eq!(actions[0], SessionAction::DiscardReview);
        assert!(actions.contains(&SessionAction::AcquireStream));
    }

    #[test]
    fn test_save_flow() {
        let (state, _) = pressed_state();
        let (state, _) = transition(state, SessionEvent::PressReleased);
        let (state, actions) = transition(state.clone(), SessionEvent::SaveFailed);
        assert_eq!(state.mode, SessionMode::Reviewing);
        assert!(actions.is_empty());
        let (state, _) = transition(state, SessionEvent::SaveInitiated);
        assert_eq!(state.mode, SessionMode::Idle);
    }

    #[test]
    fn test_switch_facing_only_from_live() {
        let (state, actions) = transition(live_state(), SessionEvent::SwitchFacing);
        assert_eq!(state.facing, Facing::Back);
        assert!(actions.contains(&SessionAction::AcquireStream));

        let (state, _) = pressed_state();
        let facing = state.facing;
        let (state, actions) = transition(state, SessionEvent::SwitchFacing);
        assert_eq!(state.facing, facing);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_press_outside_live_is_ignored() {
        let (state, actions) =
            transition(SessionState::new(Facing::Front), SessionEvent::PressStarted);
        assert_eq!(state.mode, SessionMode::Idle);
        assert!(actions.is_empty());
    }

    #[test]
    fn test_end_during_recording_aborts_recorder() {
        let (state, seq) = pressed_state();
        let (state, _) = transition(state, SessionEvent::HoldElapsed { seq });
        let (state, actions) = transition(state, SessionEvent::End);
        assert_eq!(state.mode, SessionMode::Idle);
        assert!(actions.contains(&SessionAction::AbortRecorder));
        assert!(!actions.contains(&SessionAction::FinalizeRecorder));
    }

    #[test]
    fn test_sequence_numbers_are_unique() {
        let (state, seq1) = pressed_state();
        let (state, _) = transition(state, SessionEvent::HoldElapsed { seq: seq1 });
        let seq2 = match state.mode {
            SessionMode::Recording { cap_seq } => cap_seq,
            _ => panic!(),
        };
        assert_ne!(seq1, seq2);
    }
}
