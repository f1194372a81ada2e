// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for application constants

use booth::constants::*;

#[test]
fn test_surface_matches_portrait_canonical_size() {
    assert_eq!(SURFACE_WIDTH, 450);
    assert_eq!(SURFACE_HEIGHT, 800);
}

#[test]
fn test_capture_timing_constants() {
    assert_eq!(HOLD_THRESHOLD.as_millis(), 200);
    assert_eq!(MAX_RECORDING.as_secs(), 30);
    assert!(TICK_INTERVAL.as_millis() > 0);
}

#[test]
fn test_kernel_fallback_is_opaque_black() {
    assert_eq!(KERNEL_FALLBACK, [0, 0, 0, 255]);
}
