//! # CSG Kernel
//!
//! Boolean solid modeling on closed triangle meshes.
//!
//! ## Structure
//!
//! - [`mesh`]: `MeshBuffers`, the packed vertex/index representation
//! - [`manifold`]: `Manifold` solids and every 3D operation
//! - [`cross_section`]: 2D outlines and the extrude/revolve sweeps
//! - [`export`]: binary STL encoding
//!
//! ## Ownership
//!
//! Every operation borrows its inputs and returns freshly allocated
//! results. Nothing returned by the kernel aliases an input, so callers are
//! free to keep, copy or drop inputs independently of the outputs.
//!
//! ## Example
//!
//! ```rust
//! use csg_kernel::Manifold;
//! use glam::DVec3;
//!
//! let a = Manifold::cube(DVec3::splat(2.0), true);
//! let b = Manifold::cube(DVec3::splat(2.0), true).translate(DVec3::new(1.0, 0.0, 0.0)).unwrap();
//! let union = a.union(&b).unwrap();
//! assert!(union.volume() >= a.volume());
//! ```

pub mod cross_section;
pub mod error;
pub mod export;
pub mod manifold;
pub mod mesh;

pub use cross_section::CrossSection;
pub use error::{KernelError, KernelResult};
pub use manifold::Manifold;
pub use mesh::{BoundingBox, MeshBuffers};
