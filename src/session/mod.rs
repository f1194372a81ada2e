// SPDX-License-Identifier: GPL-3.0-only

//! Capture session: state machine, timers, recorder and driver
//!
//! The state machine itself is pure (`state`); the driver (`driver`) owns
//! the collaborators and executes transitions. Time comes from an injected
//! clock (`clock`) and recording goes through the recorder interface
//! (`recorder`), so the whole session runs deterministically under tests.

pub mod clock;
pub mod driver;
pub mod recorder;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use driver::{CaptureSession, ReviewStage, SessionBuilder};
pub use recorder::{EncodedVideo, MjpegRecorder, RecorderFactory, StreamRecorder};
pub use state::{SessionAction, SessionEvent, SessionMode, SessionState, transition};
