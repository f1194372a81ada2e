// SPDX-License-Identifier: GPL-3.0-only

//! Error types for the booth application

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone)]
pub enum AppError {
    /// Device stream acquisition errors
    Device(AcquireError),
    /// Stream recorder errors
    Recorder(RecorderError),
    /// Still export / encoding errors
    Export(ExportError),
    /// Persistence handoff errors (retryable)
    Persist(PersistError),
    /// Capture session lifecycle errors
    Session(SessionError),
    /// Configuration errors
    Config(String),
    /// Generic error with message
    Other(String),
}

/// Categorized device-stream acquisition failures
///
/// These are surfaced to the user as human-readable conditions; the state
/// machine stays in `Idle` when acquisition fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireError {
    /// The user or platform denied access to the capture device
    PermissionDenied,
    /// No capture device is present for the requested facing
    NoDevice,
    /// The device exists but is held by another consumer
    DeviceBusy,
    /// The device cannot satisfy the requested constraints
    ConstraintsUnsatisfiable,
    /// Acquisition was aborted before completing
    Aborted,
    /// Anything else
    Unknown(String),
}

/// Stream recorder errors
#[derive(Debug, Clone)]
pub enum RecorderError {
    /// Recorder was started without an active device stream
    NoActiveStream,
    /// Recorder failed to start
    StartFailed(String),
    /// Finalize was called more than once
    AlreadyFinalized,
    /// A frame chunk failed to encode
    EncodingFailed(String),
}

/// Still export errors
#[derive(Debug, Clone)]
pub enum ExportError {
    /// Image encoding failed
    EncodingFailed(String),
    /// Writing the encoded image failed
    Io(String),
}

/// Persistence handoff errors
///
/// Always retryable: the captured artifact is retained when a save fails.
#[derive(Debug, Clone)]
pub enum PersistError {
    /// The backing store failed (I/O, quota, ...)
    Storage(String),
    /// The store rejected the record as malformed
    Rejected(String),
}

/// Capture session lifecycle errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No signed-in user; capture sessions cannot start
    NoCurrentUser,
    /// The requested operation is not valid in the current mode
    InvalidMode {
        operation: &'static str,
        mode: &'static str,
    },
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Device(e) => write!(f, "Device error: {}", e),
            AppError::Recorder(e) => write!(f, "Recorder error: {}", e),
            AppError::Export(e) => write!(f, "Export error: {}", e),
            AppError::Persist(e) => write!(f, "Save error: {}", e),
            AppError::Session(e) => write!(f, "Session error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for AcquireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AcquireError::PermissionDenied => write!(f, "Camera access was denied"),
            AcquireError::NoDevice => write!(f, "No capture device found"),
            AcquireError::DeviceBusy => write!(f, "Capture device is busy"),
            AcquireError::ConstraintsUnsatisfiable => {
                write!(f, "Capture device cannot satisfy the requested format")
            }
            AcquireError::Aborted => write!(f, "Device acquisition was aborted"),
            AcquireError::Unknown(msg) => write!(f, "Device failure: {}", msg),
        }
    }
}

impl fmt::Display for RecorderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecorderError::NoActiveStream => write!(f, "No active stream to record"),
            RecorderError::StartFailed(msg) => write!(f, "Failed to start recorder: {}", msg),
            RecorderError::AlreadyFinalized => write!(f, "Recorder already finalized"),
            RecorderError::EncodingFailed(msg) => write!(f, "Chunk encoding failed: {}", msg),
        }
    }
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::EncodingFailed(msg) => write!(f, "Encoding failed: {}", msg),
            ExportError::Io(msg) => write!(f, "Write failed: {}", msg),
        }
    }
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistError::Storage(msg) => write!(f, "Storage failure: {}", msg),
            PersistError::Rejected(msg) => write!(f, "Record rejected: {}", msg),
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NoCurrentUser => write!(f, "No signed-in user"),
            SessionError::InvalidMode { operation, mode } => {
                write!(f, "Cannot {} while {}", operation, mode)
            }
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for AcquireError {}
impl std::error::Error for RecorderError {}
impl std::error::Error for ExportError {}
impl std::error::Error for PersistError {}
impl std::error::Error for SessionError {}

// Conversions from sub-errors to AppError
impl From<AcquireError> for AppError {
    fn from(err: AcquireError) -> Self {
        AppError::Device(err)
    }
}

impl From<RecorderError> for AppError {
    fn from(err: RecorderError) -> Self {
        AppError::Recorder(err)
    }
}

impl From<ExportError> for AppError {
    fn from(err: ExportError) -> Self {
        AppError::Export(err)
    }
}

impl From<PersistError> for AppError {
    fn from(err: PersistError) -> Self {
        AppError::Persist(err)
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        AppError::Session(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Other(err.to_string())
    }
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::Io(err.to_string())
    }
}

impl From<std::io::Error> for PersistError {
    fn from(err: std::io::Error) -> Self {
        PersistError::Storage(err.to_string())
    }
}
