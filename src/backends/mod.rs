// SPDX-License-Identifier: GPL-3.0-only

//! Capture device backends
//!
//! The device backend abstraction is intentionally small: a provider that
//! acquires streams for a given set of constraints, and a stream that is
//! polled for frames once per render tick. The built-in synthetic backend
//! produces deterministic frames for headless runs and tests.

pub mod device;

pub use device::types::{Facing, SourceFrame, StreamConstraints};
pub use device::{DeviceProvider, DeviceStream, acquire_with_fallback};
