//! Bridge error kinds.
//!
//! Every failure reaching the host carries one of these kinds. The display
//! text starts with the kind name so hosts that only see a message string can
//! still tell them apart.

use csg_kernel::KernelError;
use thiserror::Error;

/// Errors surfaced to the host.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CsgError {
    /// Wrong argument type, shape or count. Raised before any allocation.
    #[error("ArgumentError: {0}")]
    Argument(String),

    /// `from_mesh` input failed structural validation.
    #[error("InvalidMesh: {0}")]
    InvalidMesh(String),

    /// The kernel could not complete an operation.
    #[error("NativeOperationFailure: {0}")]
    NativeOperation(String),

    /// A host warp function raised, or returned something other than three
    /// finite numbers.
    #[error("CallbackFailure: {0}")]
    Callback(String),

    /// The handle was released, donated, or belongs to another session.
    #[error("ReleasedHandle: {0}")]
    ReleasedHandle(String),
}

impl CsgError {
    /// Kind name, as used for the host-side error name.
    pub fn kind(&self) -> &'static str {
        match self {
            CsgError::Argument(_) => "ArgumentError",
            CsgError::InvalidMesh(_) => "InvalidMesh",
            CsgError::NativeOperation(_) => "NativeOperationFailure",
            CsgError::Callback(_) => "CallbackFailure",
            CsgError::ReleasedHandle(_) => "ReleasedHandle",
        }
    }

    pub(crate) fn argument(message: impl Into<String>) -> Self {
        CsgError::Argument(message.into())
    }
}

impl From<KernelError> for CsgError {
    fn from(err: KernelError) -> Self {
        match err {
            KernelError::InvalidMesh(message) => CsgError::InvalidMesh(message),
            other => CsgError::NativeOperation(other.to_string()),
        }
    }
}

/// Result alias for bridge operations.
pub type CsgResult<T> = Result<T, CsgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_starts_with_kind() {
        let errors = [
            CsgError::argument("x"),
            CsgError::InvalidMesh("x".into()),
            CsgError::NativeOperation("x".into()),
            CsgError::Callback("x".into()),
            CsgError::ReleasedHandle("x".into()),
        ];
        for err in errors {
            assert!(err.to_string().starts_with(err.kind()), "{err}");
        }
    }

    #[test]
    fn test_kernel_errors_map_to_kinds() {
        let mesh: CsgError = KernelError::InvalidMesh("bad".into()).into();
        assert_eq!(mesh.kind(), "InvalidMesh");

        let param: CsgError = KernelError::invalid_parameter("extrude", "height").into();
        assert_eq!(param.kind(), "NativeOperationFailure");
        assert!(param.to_string().contains("extrude"));
    }
}
