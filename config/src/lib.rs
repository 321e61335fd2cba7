//! # Config Crate
//!
//! Centralized configuration constants for the CSG kernel and its host bridge.
//! Tessellation defaults, geometric tolerances and mesh import limits
//! live here so the kernel and the bridge agree on them.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{clamp_segments, DEFAULT_SEGMENTS, EPSILON};
//!
//! let value: f64 = 1e-11;
//! assert!(value.abs() < EPSILON);
//!
//! // Omitted segment counts fall back to the default, tiny ones are raised.
//! assert_eq!(clamp_segments(None), DEFAULT_SEGMENTS);
//! assert_eq!(clamp_segments(Some(1)), 3);
//! ```

pub mod constants;

#[cfg(test)]
mod tests;
