//! # Error Types
//!
//! Error types for kernel operations. Every failure is explicit; no operation
//! substitutes a fallback result for one it could not compute.

use thiserror::Error;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur during kernel operations.
///
/// ## Example
///
/// ```rust
/// use csg_kernel::{KernelError, MeshBuffers};
///
/// let mesh = MeshBuffers::from_parts(vec![0.0, 0.0, 0.0], vec![0, 1, 2]);
/// assert!(matches!(mesh, Err(KernelError::InvalidMesh(_))));
/// ```
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    /// Mesh buffers failed structural validation.
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),

    /// An operation parameter is outside its domain.
    #[error("Invalid parameter for '{operation}': {message}")]
    InvalidParameter {
        /// Name of the operation that rejected the parameter.
        operation: String,
        /// Description of the rejected value.
        message: String,
    },

    /// A polygon outline could not be triangulated.
    #[error("Triangulation failed: {0}")]
    Triangulation(String),

    /// An operation produced a NaN or infinite coordinate.
    #[error("Operation '{operation}' produced a non-finite coordinate at vertex {vertex}")]
    NonFinite {
        /// Name of the operation.
        operation: String,
        /// Index of the offending vertex.
        vertex: usize,
    },
}

impl KernelError {
    /// Shorthand for [`KernelError::InvalidParameter`].
    pub fn invalid_parameter(operation: &str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            operation: operation.to_string(),
            message: message.into(),
        }
    }
}

// =============================================================================
// RESULT TYPE ALIAS
// =============================================================================

/// Result type alias for kernel operations.
pub type KernelResult<T> = Result<T, KernelError>;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Test error display messages.
    #[test]
    fn test_error_display() {
        let err = KernelError::invalid_parameter("trim_by_plane", "normal is zero");
        assert!(err.to_string().contains("trim_by_plane"));
        assert!(err.to_string().contains("normal is zero"));

        let err = KernelError::NonFinite {
            operation: "warp".to_string(),
            vertex: 7,
        };
        assert!(err.to_string().contains("vertex 7"));
    }

    /// Kernel errors cross thread boundaries inside rayon jobs.
    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<KernelError>();
    }
}
