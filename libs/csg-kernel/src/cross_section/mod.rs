//! # CrossSection Module
//!
//! Single-outline 2D polygons and the sweeps that turn them into solids.
//!
//! ## Structure
//!
//! - `triangulate`: ear clipping for simple outlines
//! - `extrude`: linear extrusion (twist, top scale) and revolution about Z
//!
//! Outlines are assumed simple (no self-intersection); this is not checked.
//! Either orientation is accepted and normalized to counter-clockwise before
//! sweeping.

pub mod extrude;
pub mod triangulate;

use std::f64::consts::TAU;

use config::constants::{MAX_SEGMENTS, MIN_POLYGON_POINTS, MIN_SEGMENTS};
use glam::DVec2;

use crate::error::{KernelError, KernelResult};

// =============================================================================
// CROSSSECTION STRUCT
// =============================================================================

/// Closed 2D outline.
///
/// ## Example
///
/// ```rust
/// use csg_kernel::CrossSection;
/// use glam::DVec2;
///
/// let square = CrossSection::square(DVec2::new(2.0, 2.0), true);
/// assert_eq!(square.len(), 4);
/// assert!((square.area() - 4.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CrossSection {
    contour: Vec<DVec2>,
}

impl CrossSection {
    /// Outline through `points`, in order.
    pub fn new(points: Vec<DVec2>) -> KernelResult<Self> {
        if points.len() < MIN_POLYGON_POINTS {
            return Err(KernelError::invalid_parameter(
                "cross_section",
                format!("need at least {MIN_POLYGON_POINTS} points, got {}", points.len()),
            ));
        }
        if let Some(i) = points.iter().position(|p| !p.is_finite()) {
            return Err(KernelError::invalid_parameter(
                "cross_section",
                format!("point {i} is not finite"),
            ));
        }
        Ok(Self { contour: points })
    }

    /// Regular polygon inscribed in a circle, starting on +X.
    #[must_use]
    pub fn circle(radius: f64, segments: u32) -> Self {
        let n = segments.clamp(MIN_SEGMENTS, MAX_SEGMENTS);
        let contour = (0..n)
            .map(|i| {
                let theta = TAU * f64::from(i) / f64::from(n);
                DVec2::new(radius * theta.cos(), radius * theta.sin())
            })
            .collect();
        Self { contour }
    }

    /// Axis-aligned rectangle.
    #[must_use]
    pub fn square(size: DVec2, center: bool) -> Self {
        let min = if center { -size * 0.5 } else { DVec2::ZERO };
        let max = min + size;
        Self {
            contour: vec![
                min,
                DVec2::new(max.x, min.y),
                max,
                DVec2::new(min.x, max.y),
            ],
        }
    }

    /// Moved copy.
    #[must_use]
    pub fn translate(&self, offset: DVec2) -> Self {
        Self {
            contour: self.contour.iter().map(|&p| p + offset).collect(),
        }
    }

    /// Outline points as given.
    #[must_use]
    pub fn points(&self) -> &[DVec2] {
        &self.contour
    }

    /// Number of outline points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.contour.len()
    }

    /// True when the outline has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contour.is_empty()
    }

    /// Signed area, positive for counter-clockwise outlines.
    #[must_use]
    pub fn area(&self) -> f64 {
        signed_area(&self.contour)
    }

    /// Outline points in counter-clockwise order.
    pub(crate) fn ccw_points(&self) -> Vec<DVec2> {
        let mut points = self.contour.clone();
        if signed_area(&points) < 0.0 {
            points.reverse();
        }
        points
    }
}

/// Shoelace area of a closed outline.
pub(crate) fn signed_area(points: &[DVec2]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| points[i].perp_dot(points[(i + 1) % n]))
        .sum::<f64>()
        * 0.5
}
