//! # Manifold Module
//!
//! 3D solids and their operations.
//!
//! ## Structure
//!
//! - `constructors`: cube, cylinder, sphere, tetrahedron
//! - `boolean`: union, difference, intersection, n-ary union
//! - `hull`: convex hull of one or more solids
//! - `minkowski`: Minkowski sum
//! - `transform`: affine transforms and warp
//! - `plane`: trim and split by a half-space
//! - `decompose`: connected components

pub mod boolean;
pub mod constructors;
pub mod decompose;
pub mod hull;
pub mod minkowski;
pub mod plane;
pub mod transform;

use crate::error::KernelResult;
use crate::mesh::{BoundingBox, MeshBuffers};

// =============================================================================
// MANIFOLD STRUCT
// =============================================================================

/// Closed triangle-mesh solid.
///
/// `Clone` performs a deep copy; two `Manifold` values never share storage.
///
/// ## Example
///
/// ```rust
/// use csg_kernel::Manifold;
/// use glam::DVec3;
///
/// let cube = Manifold::cube(DVec3::new(2.0, 2.0, 2.0), true);
/// assert_eq!(cube.num_tri(), 12);
/// assert!((cube.volume() - 8.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifold {
    mesh: MeshBuffers,
}

impl Manifold {
    /// The empty solid.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a solid from validated mesh buffers.
    ///
    /// Winding and vertex order are kept as given.
    pub fn from_mesh(mesh: MeshBuffers) -> KernelResult<Self> {
        mesh.validate()?;
        Ok(Self { mesh })
    }

    /// Wrap buffers produced by kernel code, which are valid by construction.
    pub(crate) fn from_buffers(mesh: MeshBuffers) -> Self {
        Self { mesh }
    }

    /// Borrow the mesh.
    #[must_use]
    pub fn mesh(&self) -> &MeshBuffers {
        &self.mesh
    }

    /// Copy of the mesh, for extraction.
    #[must_use]
    pub fn to_mesh(&self) -> MeshBuffers {
        self.mesh.clone()
    }

    /// True when the solid has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mesh.is_empty()
    }

    /// Vertex count.
    #[must_use]
    pub fn num_vert(&self) -> usize {
        self.mesh.vertex_count()
    }

    /// Triangle count.
    #[must_use]
    pub fn num_tri(&self) -> usize {
        self.mesh.triangle_count()
    }

    /// Enclosed volume. Always non-negative; an inside-out mesh reports the
    /// magnitude of its signed volume.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.mesh.signed_volume().abs()
    }

    /// Total surface area.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.mesh.surface_area()
    }

    /// Axis-aligned bounds, `None` when empty.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.mesh.bounding_box()
    }
}
