//! # Mesh Module
//!
//! Packed triangle mesh storage shared by every solid.
//!
//! ## Memory Layout
//!
//! - `vertices`: `[x0, y0, z0, x1, y1, z1, ...]`, 3 single-precision floats per vertex
//! - `indices`: `[i0, i1, i2, ...]`, 3 zero-based vertex indices per triangle
//!
//! Triangles are wound counter-clockwise when viewed from outside the solid.
//! Positions are narrowed to `f32` on insertion; all measurements are
//! computed in `f64`.
//!
//! ## Example
//!
//! ```rust
//! use csg_kernel::MeshBuffers;
//! use glam::DVec3;
//!
//! let mut mesh = MeshBuffers::new();
//! let a = mesh.add_vertex(DVec3::ZERO);
//! let b = mesh.add_vertex(DVec3::X);
//! let c = mesh.add_vertex(DVec3::Y);
//! mesh.add_triangle(a, b, c);
//! assert_eq!(mesh.triangle_count(), 1);
//! ```

use glam::DVec3;
use rayon::prelude::*;

use crate::error::{KernelError, KernelResult};

// =============================================================================
// MESH BUFFERS
// =============================================================================

/// Flat vertex and index buffers describing a triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshBuffers {
    /// Vertex positions, stride 3.
    pub vertices: Vec<f32>,
    /// Triangle vertex indices, stride 3, zero-based.
    pub indices: Vec<u32>,
}

impl MeshBuffers {
    /// Create an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mesh with room for the given counts.
    #[must_use]
    pub fn with_capacity(vertex_capacity: usize, triangle_capacity: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_capacity * 3),
            indices: Vec::with_capacity(triangle_capacity * 3),
        }
    }

    /// Build a mesh from raw buffers, validating their structure.
    ///
    /// ## Errors
    ///
    /// [`KernelError::InvalidMesh`] if either buffer length is not a multiple
    /// of three, a coordinate is not finite, or an index is out of range.
    pub fn from_parts(vertices: Vec<f32>, indices: Vec<u32>) -> KernelResult<Self> {
        let mesh = Self { vertices, indices };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Check the structural invariants of the buffers.
    pub fn validate(&self) -> KernelResult<()> {
        if self.vertices.len() % 3 != 0 {
            return Err(KernelError::InvalidMesh(format!(
                "vertex buffer length {} is not a multiple of 3",
                self.vertices.len()
            )));
        }
        if self.indices.len() % 3 != 0 {
            return Err(KernelError::InvalidMesh(format!(
                "index buffer length {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        if let Some(pos) = self.vertices.iter().position(|c| !c.is_finite()) {
            return Err(KernelError::InvalidMesh(format!(
                "vertex {} has a non-finite coordinate",
                pos / 3
            )));
        }
        let count = self.vertex_count();
        if let Some(bad) = self.indices.iter().find(|&&i| i as usize >= count) {
            return Err(KernelError::InvalidMesh(format!(
                "index {bad} out of range for {count} vertices"
            )));
        }
        Ok(())
    }

    // =========================================================================
    // BUILDING
    // =========================================================================

    /// Append a vertex, returning its index.
    pub fn add_vertex(&mut self, p: DVec3) -> u32 {
        let index = self.vertex_count() as u32;
        self.vertices
            .extend_from_slice(&[p.x as f32, p.y as f32, p.z as f32]);
        index
    }

    /// Append a triangle by vertex indices.
    pub fn add_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Append another mesh, offsetting its indices.
    pub fn merge(&mut self, other: &MeshBuffers) {
        let offset = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + offset));
    }

    /// Reverse the winding of every triangle.
    pub fn flip_winding(&mut self) {
        for tri in self.indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
    }

    /// Replace every vertex position with `f(position)`.
    ///
    /// ## Errors
    ///
    /// [`KernelError::NonFinite`] naming `operation` if a new position is not
    /// finite once stored in single precision. The mesh is left partially
    /// updated and must be discarded.
    pub fn try_map_positions(
        &mut self,
        operation: &str,
        mut f: impl FnMut(DVec3) -> DVec3,
    ) -> KernelResult<()> {
        for (i, v) in self.vertices.chunks_exact_mut(3).enumerate() {
            let p = f(DVec3::new(f64::from(v[0]), f64::from(v[1]), f64::from(v[2])));
            let stored = narrow(p).ok_or_else(|| KernelError::NonFinite {
                operation: operation.to_string(),
                vertex: i,
            })?;
            v.copy_from_slice(&stored);
        }
        Ok(())
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True when the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Position of vertex `i` widened to `f64`.
    #[inline]
    #[must_use]
    pub fn position(&self, i: usize) -> DVec3 {
        let v = &self.vertices[i * 3..i * 3 + 3];
        DVec3::new(f64::from(v[0]), f64::from(v[1]), f64::from(v[2]))
    }

    /// Iterator over all vertex positions.
    pub fn positions(&self) -> impl Iterator<Item = DVec3> + '_ {
        (0..self.vertex_count()).map(|i| self.position(i))
    }

    /// Corner positions of triangle `t`.
    #[inline]
    #[must_use]
    pub fn triangle(&self, t: usize) -> [DVec3; 3] {
        let tri = &self.indices[t * 3..t * 3 + 3];
        [
            self.position(tri[0] as usize),
            self.position(tri[1] as usize),
            self.position(tri[2] as usize),
        ]
    }

    /// Signed enclosed volume (positive for outward winding).
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        (0..self.triangle_count())
            .into_par_iter()
            .map(|t| {
                let [a, b, c] = self.triangle(t);
                a.dot(b.cross(c))
            })
            .sum::<f64>()
            / 6.0
    }

    /// Total triangle area. Never negative zero.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        let doubled = (0..self.triangle_count())
            .into_par_iter()
            .map(|t| {
                let [a, b, c] = self.triangle(t);
                (b - a).cross(c - a).length()
            })
            .sum::<f64>();
        // an empty float sum is -0.0
        doubled * 0.5 + 0.0
    }

    /// Axis-aligned bounds of the vertices referenced by triangles, or
    /// `None` for an empty mesh.
    #[must_use]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut iter = self.indices.iter().map(|&i| self.position(i as usize));
        let first = iter.next()?;
        Some(iter.fold(BoundingBox::new(first, first), |bb, p| bb.including(p)))
    }
}

/// A position in storage precision, or `None` if any coordinate is NaN or
/// does not fit in an `f32`.
#[must_use]
pub fn narrow(p: DVec3) -> Option<[f32; 3]> {
    let stored = p.as_vec3();
    stored.is_finite().then(|| stored.to_array())
}

// =============================================================================
// BOUNDING BOX
// =============================================================================

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Minimum corner.
    pub min: DVec3,
    /// Maximum corner.
    pub max: DVec3,
}

impl BoundingBox {
    /// Box spanning `min` to `max`.
    #[must_use]
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Smallest box containing `self` and `p`.
    #[must_use]
    pub fn including(self, p: DVec3) -> Self {
        Self {
            min: self.min.min(p),
            max: self.max.max(p),
        }
    }

    /// True when the boxes intersect, with `tolerance` slack on every side.
    #[must_use]
    pub fn overlaps(&self, other: &BoundingBox, tolerance: f64) -> bool {
        self.min.cmple(other.max + tolerance).all() && other.min.cmple(self.max + tolerance).all()
    }

    /// Length of the box diagonal.
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        (self.max - self.min).length()
    }

    /// Largest absolute coordinate of either corner.
    #[must_use]
    pub fn max_abs_coordinate(&self) -> f64 {
        self.min.abs().max(self.max.abs()).max_element()
    }
}
