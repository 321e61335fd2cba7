//! Centralized configuration values shared by the kernel and the bridge.
//!
//! Each public item in this module documents its purpose and provides a minimal
//! usage example so that downstream crates can remain declarative and avoid
//! scattering literals.

use std::fmt;

// =============================================================================
// PRECISION
// =============================================================================

/// General floating-point tolerance for plane classification and
/// degenerate-triangle rejection.
///
/// # Examples
/// ```
/// use config::constants::EPSILON;
/// assert!(EPSILON < 1.0e-6);
/// ```
pub const EPSILON: f64 = 1.0e-9;

/// Distance below which two vertices are treated as the same point when
/// welding meshes after a boolean operation.
///
/// # Examples
/// ```
/// use config::constants::{EPSILON, VERTEX_MERGE_EPSILON};
/// assert!(VERTEX_MERGE_EPSILON >= EPSILON);
/// ```
pub const VERTEX_MERGE_EPSILON: f64 = 1.0e-6;

/// Plane-side tolerance for mesh booleans. Coordinates are stored in single
/// precision, so this is much coarser than [`EPSILON`].
///
/// # Examples
/// ```
/// use config::constants::{PLANE_EPSILON, VERTEX_MERGE_EPSILON};
/// assert!(PLANE_EPSILON > VERTEX_MERGE_EPSILON);
/// ```
pub const PLANE_EPSILON: f64 = 1.0e-5;

/// Tolerance used by the convex hull when deciding whether a point lies
/// above a face.
///
/// # Examples
/// ```
/// use config::constants::HULL_EPSILON;
/// assert!(HULL_EPSILON > 0.0);
/// ```
pub const HULL_EPSILON: f64 = 1.0e-7;

// =============================================================================
// TESSELLATION
// =============================================================================

/// Default segment count for circular primitives when the caller omits it.
///
/// # Examples
/// ```
/// use config::constants::DEFAULT_SEGMENTS;
/// assert_eq!(DEFAULT_SEGMENTS, 32);
/// ```
pub const DEFAULT_SEGMENTS: u32 = 32;

/// Default segment count around the tube of a torus.
///
/// # Examples
/// ```
/// use config::constants::DEFAULT_TORUS_MINOR_SEGMENTS;
/// assert_eq!(DEFAULT_TORUS_MINOR_SEGMENTS, 16);
/// ```
pub const DEFAULT_TORUS_MINOR_SEGMENTS: u32 = 16;

/// Smallest segment count that still encloses area.
///
/// # Examples
/// ```
/// use config::constants::MIN_SEGMENTS;
/// assert_eq!(MIN_SEGMENTS, 3);
/// ```
pub const MIN_SEGMENTS: u32 = 3;

/// Largest segment count honoured; larger requests are lowered to it.
///
/// A torus at this resolution in both directions still fits under
/// [`MAX_VERTICES`].
///
/// # Examples
/// ```
/// use config::constants::{MAX_SEGMENTS, MAX_VERTICES};
/// assert!(MAX_SEGMENTS <= 10_000);
/// assert!((MAX_SEGMENTS as usize).pow(2) <= MAX_VERTICES);
/// ```
pub const MAX_SEGMENTS: u32 = 1024;

/// Smallest number of points accepted for a polygon outline.
///
/// # Examples
/// ```
/// use config::constants::MIN_POLYGON_POINTS;
/// assert_eq!(MIN_POLYGON_POINTS, 3);
/// ```
pub const MIN_POLYGON_POINTS: usize = 3;

/// Degrees in a full revolution.
///
/// # Examples
/// ```
/// use config::constants::FULL_TURN_DEGREES;
/// assert_eq!(FULL_TURN_DEGREES, 360.0);
/// ```
pub const FULL_TURN_DEGREES: f64 = 360.0;

/// Resolves an optional, caller-supplied segment count.
///
/// `None` selects [`DEFAULT_SEGMENTS`]; anything below [`MIN_SEGMENTS`]
/// (including zero and negatives) is raised to the minimum and anything
/// above [`MAX_SEGMENTS`] is lowered to the maximum.
///
/// # Examples
/// ```
/// use config::constants::{clamp_segments, MAX_SEGMENTS};
/// assert_eq!(clamp_segments(Some(64)), 64);
/// assert_eq!(clamp_segments(Some(-5)), 3);
/// assert_eq!(clamp_segments(Some(1_000_000_000_000)), MAX_SEGMENTS);
/// ```
pub fn clamp_segments(requested: Option<i64>) -> u32 {
    match requested {
        None => DEFAULT_SEGMENTS,
        Some(n) => {
            let n = n.clamp(i64::from(MIN_SEGMENTS), i64::from(MAX_SEGMENTS));
            u32::try_from(n).unwrap_or(MAX_SEGMENTS)
        }
    }
}

// =============================================================================
// LIMITS
// =============================================================================

/// Upper bound on vertices accepted by mesh import.
///
/// # Examples
/// ```
/// use config::constants::MAX_VERTICES;
/// assert!(MAX_VERTICES <= u32::MAX as usize);
/// ```
pub const MAX_VERTICES: usize = 16 * 1024 * 1024;

/// Upper bound on triangles accepted by mesh import.
///
/// # Examples
/// ```
/// use config::constants::MAX_TRIANGLES;
/// assert!(MAX_TRIANGLES >= 1024);
/// ```
pub const MAX_TRIANGLES: usize = 32 * 1024 * 1024;

// =============================================================================
// BRIDGE CONFIG
// =============================================================================

/// Immutable snapshot of the defaults and limits a bridge session applies to
/// host calls.
///
/// # Examples
/// ```
/// use config::constants::BridgeConfig;
/// let config = BridgeConfig::default();
/// assert_eq!(config.default_segments, 32);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Segment count used when a caller omits one.
    pub default_segments: u32,
    /// Segment count around the tube of a torus when omitted.
    pub torus_minor_segments: u32,
    /// Largest vertex count accepted by mesh import.
    pub max_vertices: usize,
    /// Largest triangle count accepted by mesh import.
    pub max_triangles: usize,
}

impl BridgeConfig {
    /// Builds a configuration enforcing strict validation of every field.
    ///
    /// # Examples
    /// ```
    /// use config::constants::BridgeConfig;
    /// let cfg = BridgeConfig::new(24, 12, 1024, 2048).expect("valid config");
    /// assert_eq!(cfg.default_segments, 24);
    /// ```
    pub fn new(
        default_segments: u32,
        torus_minor_segments: u32,
        max_vertices: usize,
        max_triangles: usize,
    ) -> Result<Self, ConfigError> {
        for segments in [default_segments, torus_minor_segments] {
            if !(MIN_SEGMENTS..=MAX_SEGMENTS).contains(&segments) {
                return Err(ConfigError::InvalidSegments(segments));
            }
        }
        if max_vertices == 0 || max_vertices > MAX_VERTICES {
            return Err(ConfigError::InvalidLimit("max_vertices"));
        }
        if max_triangles == 0 || max_triangles > MAX_TRIANGLES {
            return Err(ConfigError::InvalidLimit("max_triangles"));
        }
        Ok(Self {
            default_segments,
            torus_minor_segments,
            max_vertices,
            max_triangles,
        })
    }

    /// Resolves an optional segment count against this configuration's
    /// default.
    ///
    /// # Examples
    /// ```
    /// use config::constants::BridgeConfig;
    /// let cfg = BridgeConfig::new(48, 16, 1024, 1024).expect("valid config");
    /// assert_eq!(cfg.segments(None), 48);
    /// assert_eq!(cfg.segments(Some(0)), 3);
    /// ```
    pub fn segments(&self, requested: Option<i64>) -> u32 {
        match requested {
            None => self.default_segments,
            some => clamp_segments(some),
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            default_segments: DEFAULT_SEGMENTS,
            torus_minor_segments: DEFAULT_TORUS_MINOR_SEGMENTS,
            max_vertices: MAX_VERTICES,
            max_triangles: MAX_TRIANGLES,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// Raised when a default segment count is below [`MIN_SEGMENTS`] or
    /// above [`MAX_SEGMENTS`].
    InvalidSegments(u32),
    /// Raised when a mesh limit is zero or above the hard maximum.
    InvalidLimit(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSegments(value) => {
                write!(
                    f,
                    "segment counts must be within {MIN_SEGMENTS}..={MAX_SEGMENTS}: {value}"
                )
            }
            ConfigError::InvalidLimit(name) => {
                write!(f, "{name} must be between 1 and its hard maximum")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
