// SPDX-License-Identifier: GPL-3.0-only

//! Device stream acquisition
//!
//! A `DeviceProvider` hands out `DeviceStream`s for a set of constraints.
//! Streams are polled once per render tick; a stream that is still warming
//! up (or momentarily has no buffered data) returns `None` from
//! [`DeviceStream::poll_frame`] and the caller simply polls again next tick.

pub mod synthetic;
pub mod types;

use crate::errors::AcquireError;
use tracing::{info, warn};
use types::{SourceFrame, StreamConstraints};

/// An acquired device stream
///
/// Exactly one stream is owned by a capture session at a time; the session
/// always stops the previous stream before acquiring a new one.
pub trait DeviceStream: Send {
    /// Poll the stream for the most recent frame.
    ///
    /// Returns `None` while the stream is warming up or has no buffered
    /// data. Callers must keep polling every tick regardless.
    fn poll_frame(&mut self) -> Option<SourceFrame>;

    /// Whether the stream has ended and will never produce frames again
    fn is_ended(&self) -> bool;

    /// Stop the stream and release the underlying device
    fn stop(&mut self);
}

/// A source of device streams
pub trait DeviceProvider: Send {
    /// Acquire a stream satisfying `constraints`.
    ///
    /// Providers report categorized failures; they do not retry internally.
    fn acquire(
        &mut self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn DeviceStream>, AcquireError>;
}

/// Acquire a stream, retrying once with relaxed constraints.
///
/// When the ideal resolution/aspect hints cannot be satisfied, a second
/// attempt is made with the hints cleared before the failure is surfaced.
/// All other failure categories are returned as-is.
pub fn acquire_with_fallback(
    provider: &mut dyn DeviceProvider,
    constraints: &StreamConstraints,
) -> Result<Box<dyn DeviceStream>, AcquireError> {
    match provider.acquire(constraints) {
        Ok(stream) => Ok(stream),
        Err(AcquireError::ConstraintsUnsatisfiable) if constraints.has_hints() => {
            warn!(
                facing = %constraints.facing,
                "Constraints unsatisfiable, retrying with relaxed constraints"
            );
            let stream = provider.acquire(&constraints.relaxed())?;
            info!(facing = %constraints.facing, "Acquired stream with relaxed constraints");
            Ok(stream)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::types::Facing;
    use super::*;

    /// Provider that rejects hinted constraints and accepts relaxed ones
    struct PickyProvider {
        attempts: u32,
    }

    impl DeviceProvider for PickyProvider {
        fn acquire(
            &mut self,
            constraints: &StreamConstraints,
        ) -> Result<Box<dyn DeviceStream>, AcquireError> {
            self.attempts += 1;
            if constraints.has_hints() {
                Err(AcquireError::ConstraintsUnsatisfiable)
            } else {
                Ok(Box::new(
                    synthetic::SyntheticStream::test_pattern(constraints.facing, 64, 64, 0),
                ))
            }
        }
    }

    /// Provider that always fails with the given category
    struct FailingProvider {
        error: AcquireError,
    }

    impl DeviceProvider for FailingProvider {
        fn acquire(
            &mut self,
            _constraints: &StreamConstraints,
        ) -> Result<Box<dyn DeviceStream>, AcquireError> {
            Err(self.error.clone())
        }
    }

    #[test]
    fn test_fallback_retries_relaxed_once() {
        let mut provider = PickyProvider { attempts: 0 };
        let constraints = StreamConstraints {
            facing: Facing::Front,
            ideal_resolution: Some((9999, 9999)),
            ideal_aspect: None,
        };
        let stream = acquire_with_fallback(&mut provider, &constraints);
        assert!(stream.is_ok());
        assert_eq!(provider.attempts, 2);
    }

    #[test]
    fn test_fallback_does_not_mask_other_failures() {
        let mut provider = FailingProvider {
            error: AcquireError::PermissionDenied,
        };
        let constraints = StreamConstraints {
            facing: Facing::Front,
            ideal_resolution: Some((640, 480)),
            ideal_aspect: None,
        };
        let err = acquire_with_fallback(&mut provider, &constraints).err();
        assert_eq!(err, Some(AcquireError::PermissionDenied));
    }

    #[test]
    fn test_no_retry_without_hints() {
        let mut provider = FailingProvider {
            error: AcquireError::ConstraintsUnsatisfiable,
        };
        let constraints = StreamConstraints::for_facing(Facing::Back);
        let err = acquire_with_fallback(&mut provider, &constraints).err();
        assert_eq!(err, Some(AcquireError::ConstraintsUnsatisfiable));
    }
}
