//! JavaScript-facing bridge for the CSG kernel.
//!
//! This crate is compiled to a `cdylib` and consumed from JavaScript via
//! `wasm-bindgen`. The bridge itself is host-independent and native tests
//! drive it through [`CsgSession`] directly:
//!
//! - [`value`]: host point and polygon shapes, numeric argument checks
//! - [`handle`]: the handle manager, solid handles and batch collections
//! - [`codec`]: 1-based host mesh lists to kernel buffers and back
//! - [`dispatch`]: one method per host operation
//! - [`bridge`]: warp callbacks into the host
//!
//! ```
//! use csg_wasm::CsgSession;
//!
//! let session = CsgSession::default();
//! let a = session.cube(1.0, 1.0, 1.0, false).unwrap();
//! let b = session.translate(&a, 3.0, 0.0, 0.0).unwrap();
//! let both = session.union_many(&[&a, &b]).unwrap();
//! assert_eq!(session.decompose(&both).unwrap().len(), 2);
//! ```

pub mod bridge;
pub mod codec;
pub mod dispatch;
pub mod error;
pub mod handle;
pub mod value;

#[cfg(target_arch = "wasm32")]
mod wasm_api;

pub use bridge::{vertex_fn, CallbackBridge, CallbackToken, VertexFunction};
pub use codec::{decode_mesh, encode_mesh, Face, HostFace, HostMesh, Vertex};
pub use dispatch::{CsgSession, SessionStats};
pub use error::{CsgError, CsgResult};
pub use handle::{HandleManager, HandleStats, SolidCollection, SolidHandle, SolidKey};
pub use value::{HostPoint2, HostPoint3, PointPolygon};

#[cfg(target_arch = "wasm32")]
pub use wasm_api::Solid;

#[cfg(test)]
mod tests;
