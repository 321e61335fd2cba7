//! # Tests for Config Constants
//!
//! Unit tests verifying the correctness of configuration constants
//! and helper functions.

use crate::constants::*;

// =============================================================================
// PRECISION TESTS
// =============================================================================

#[test]
fn test_epsilon_is_positive() {
    assert!(EPSILON > 0.0, "EPSILON must be positive");
}

#[test]
fn test_vertex_merge_epsilon_larger_than_epsilon() {
    assert!(
        VERTEX_MERGE_EPSILON >= EPSILON,
        "VERTEX_MERGE_EPSILON should be >= EPSILON"
    );
}

#[test]
fn test_plane_tolerance_covers_single_precision_rounding() {
    // stored coordinates are f32
    assert!(PLANE_EPSILON > f64::from(f32::EPSILON));
    assert!(HULL_EPSILON < PLANE_EPSILON);
}

// =============================================================================
// TESSELLATION TESTS
// =============================================================================

#[test]
fn test_clamp_segments_default() {
    assert_eq!(clamp_segments(None), 32);
}

#[test]
fn test_clamp_segments_coerces_small_values() {
    assert_eq!(clamp_segments(Some(0)), MIN_SEGMENTS);
    assert_eq!(clamp_segments(Some(2)), MIN_SEGMENTS);
    assert_eq!(clamp_segments(Some(3)), 3);
}

#[test]
fn test_torus_minor_default_is_usable() {
    assert!(DEFAULT_TORUS_MINOR_SEGMENTS >= MIN_SEGMENTS);
    assert_eq!(FULL_TURN_DEGREES, 360.0);
}

#[test]
fn test_clamp_segments_caps_large_values() {
    assert_eq!(clamp_segments(Some(i64::MAX)), MAX_SEGMENTS);
    assert_eq!(clamp_segments(Some(1_000_000_000_000)), MAX_SEGMENTS);
    assert_eq!(clamp_segments(Some(i64::from(MAX_SEGMENTS))), MAX_SEGMENTS);
    assert!(MAX_SEGMENTS <= 10_000);
}

#[test]
fn test_config_rejects_default_above_max_segments() {
    let err = BridgeConfig::new(MAX_SEGMENTS + 1, 16, 1024, 1024).unwrap_err();
    assert_eq!(err, ConfigError::InvalidSegments(MAX_SEGMENTS + 1));
    let cfg = BridgeConfig::default();
    assert_eq!(cfg.segments(Some(i64::MAX)), MAX_SEGMENTS);
}

// =============================================================================
// LIMIT TESTS
// =============================================================================

#[test]
fn test_mesh_limits_fit_u32_indices() {
    assert!(MAX_VERTICES <= u32::MAX as usize);
    assert!(MAX_TRIANGLES * 3 <= u32::MAX as usize);
}
