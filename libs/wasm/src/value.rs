//! # Value Types
//!
//! Host-side numeric shapes and their checked conversion to kernel values.
//!
//! Points are accepted either as arrays (`[x, y, z]`) or as objects
//! (`{x, y, z}`). Numeric arguments arrive as host numbers (`f64`) and are
//! validated here so the dispatcher fails before allocating anything.

use config::constants::{BridgeConfig, MAX_SEGMENTS, MIN_POLYGON_POINTS};
use csg_kernel::CrossSection;
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::{CsgError, CsgResult};

/// A 3D point as the host spells it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostPoint3 {
    /// `[x, y, z]`
    Array([f64; 3]),
    /// `{x, y, z}`
    Object {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
        /// Z coordinate.
        z: f64,
    },
}

impl HostPoint3 {
    /// Coordinates in x, y, z order.
    pub fn coords(&self) -> [f64; 3] {
        match *self {
            HostPoint3::Array(c) => c,
            HostPoint3::Object { x, y, z } => [x, y, z],
        }
    }
}

/// A 2D point as the host spells it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostPoint2 {
    /// `[x, y]`
    Array([f64; 2]),
    /// `{x, y}`
    Object {
        /// X coordinate.
        x: f64,
        /// Y coordinate.
        y: f64,
    },
}

impl HostPoint2 {
    fn to_dvec2(self) -> DVec2 {
        match self {
            HostPoint2::Array([x, y]) => DVec2::new(x, y),
            HostPoint2::Object { x, y } => DVec2::new(x, y),
        }
    }
}

/// Validated outline of at least three finite points.
///
/// Self-intersection is not checked.
#[derive(Debug, Clone, PartialEq)]
pub struct PointPolygon(Vec<DVec2>);

impl PointPolygon {
    /// Check a host point list.
    pub fn from_host(points: &[HostPoint2]) -> CsgResult<Self> {
        if points.len() < MIN_POLYGON_POINTS {
            return Err(CsgError::argument(format!(
                "polygon needs at least {MIN_POLYGON_POINTS} points, got {}",
                points.len()
            )));
        }
        let points: Vec<DVec2> = points.iter().map(|p| p.to_dvec2()).collect();
        if let Some(i) = points.iter().position(|p| !p.is_finite()) {
            return Err(CsgError::argument(format!(
                "polygon point {} is not finite",
                i + 1
            )));
        }
        Ok(Self(points))
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false for a validated polygon.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build the kernel's cross-section from this outline.
    pub fn to_cross_section(&self) -> CsgResult<CrossSection> {
        Ok(CrossSection::new(self.0.clone())?)
    }
}

/// Require a finite number.
pub fn finite(name: &str, value: f64) -> CsgResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CsgError::argument(format!("{name} must be a finite number, got {value}")))
    }
}

/// Optional finite number with a fallback.
pub fn finite_or(name: &str, value: Option<f64>, default: f64) -> CsgResult<f64> {
    value.map_or(Ok(default), |v| finite(name, v))
}

/// Three finite numbers as a vector.
pub fn vector3(name: &str, x: f64, y: f64, z: f64) -> CsgResult<DVec3> {
    let v = DVec3::new(x, y, z);
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CsgError::argument(format!("{name} components must be finite numbers")))
    }
}

/// Segment count: omitted means the configured default and fractions are
/// truncated. The result is clamped to `MIN_SEGMENTS..=MAX_SEGMENTS`.
pub fn segments(config: &BridgeConfig, value: Option<f64>) -> CsgResult<u32> {
    match value {
        None => Ok(config.default_segments),
        Some(v) => Ok(config.segments(Some(truncate("segments", v)?))),
    }
}

/// Optional non-negative count where zero keeps its meaning ("automatic").
/// Counts above [`MAX_SEGMENTS`] are lowered to it.
pub fn count_or_zero(name: &str, value: Option<f64>) -> CsgResult<u32> {
    match value {
        None => Ok(0),
        Some(v) => {
            let n = truncate(name, v)?.clamp(0, i64::from(MAX_SEGMENTS));
            Ok(u32::try_from(n).unwrap_or(MAX_SEGMENTS))
        }
    }
}

fn truncate(name: &str, value: f64) -> CsgResult<i64> {
    // float-to-int casts saturate
    Ok(finite(name, value)?.trunc() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_accept_both_spellings() {
        let points: Vec<HostPoint3> =
            serde_json::from_str(r#"[[1, 2, 3], {"x": 4, "y": 5, "z": 6}]"#).unwrap();
        assert_eq!(points[0].coords(), [1.0, 2.0, 3.0]);
        assert_eq!(points[1].coords(), [4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_polygon_needs_three_points() {
        let two: Vec<HostPoint2> = serde_json::from_str("[[0, 0], [1, 0]]").unwrap();
        let err = PointPolygon::from_host(&two).unwrap_err();
        assert_eq!(err.kind(), "ArgumentError");

        let three: Vec<HostPoint2> =
            serde_json::from_str(r#"[[0, 0], {"x": 1, "y": 0}, [0, 1]]"#).unwrap();
        let polygon = PointPolygon::from_host(&three).unwrap();
        assert_eq!(polygon.len(), 3);
        assert!((polygon.to_cross_section().unwrap().area() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_polygon_rejects_non_finite() {
        let points = [
            HostPoint2::Array([0.0, 0.0]),
            HostPoint2::Array([f64::INFINITY, 0.0]),
            HostPoint2::Array([0.0, 1.0]),
        ];
        let err = PointPolygon::from_host(&points).unwrap_err();
        assert!(err.to_string().contains("point 2"));
    }

    #[test]
    fn test_segments() {
        let config = BridgeConfig::default();
        assert_eq!(segments(&config, None).unwrap(), 32);
        assert_eq!(segments(&config, Some(1.0)).unwrap(), 3);
        assert_eq!(segments(&config, Some(12.9)).unwrap(), 12);
        assert_eq!(segments(&config, Some(-40.0)).unwrap(), 3);
        assert!(segments(&config, Some(f64::NAN)).is_err());
        assert_eq!(segments(&config, Some(1e12)).unwrap(), MAX_SEGMENTS);
    }

    #[test]
    fn test_count_or_zero() {
        assert_eq!(count_or_zero("slices", None).unwrap(), 0);
        assert_eq!(count_or_zero("slices", Some(-3.0)).unwrap(), 0);
        assert_eq!(count_or_zero("slices", Some(4.5)).unwrap(), 4);
        assert_eq!(count_or_zero("slices", Some(1e12)).unwrap(), MAX_SEGMENTS);
    }

    #[test]
    fn test_vector3_rejects_nan() {
        assert!(vector3("offset", 1.0, f64::NAN, 0.0).is_err());
        assert_eq!(vector3("offset", 1.0, 2.0, 3.0).unwrap(), DVec3::new(1.0, 2.0, 3.0));
    }
}
