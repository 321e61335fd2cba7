//! # Operation Dispatcher
//!
//! The host-facing operations, independent of any particular host.
//!
//! Every entry point follows the same shape: validate and convert arguments,
//! borrow input solids from the [`HandleManager`], make one kernel call, and
//! wrap each result exactly once. Argument errors are raised before anything
//! is allocated. Results are only wrapped after the kernel call has
//! succeeded, so a failure never leaves a stray handle behind.

use config::constants::{BridgeConfig, FULL_TURN_DEGREES};
use csg_kernel::export::to_stl_binary;
use csg_kernel::{CrossSection, Manifold};
use glam::DVec2;
use serde::Serialize;
use tracing::{debug, trace};

use crate::bridge::{CallbackBridge, VertexFunction};
use crate::codec::{decode_mesh, encode_mesh, HostFace, HostMesh};
use crate::error::CsgResult;
use crate::handle::{HandleManager, HandleStats, SolidCollection, SolidHandle, SolidKey};
use crate::value::{
    count_or_zero, finite, finite_or, segments, vector3, HostPoint2, HostPoint3, PointPolygon,
};

/// Handle and callback counters for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    /// Handle manager counters.
    pub handles: HandleStats,
    /// Warp callbacks currently bound.
    pub bound_tokens: usize,
}

/// One host's view of the kernel: its handles, its callback bridge and its
/// configuration.
///
/// ## Example
///
/// ```rust
/// use csg_wasm::CsgSession;
///
/// let session = CsgSession::default();
/// let a = session.cube(2.0, 2.0, 2.0, true).unwrap();
/// let b = session.sphere(1.2, Some(16.0)).unwrap();
/// let cut = session.difference(&a, &b).unwrap();
/// assert!(session.volume(&cut).unwrap() < 8.0);
/// ```
#[derive(Debug, Default)]
pub struct CsgSession {
    config: BridgeConfig,
    handles: HandleManager,
    bridge: CallbackBridge,
}

impl CsgSession {
    /// Session with the given defaults and limits.
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            handles: HandleManager::new(),
            bridge: CallbackBridge::new(),
        }
    }

    /// Configuration in effect.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The handle manager.
    pub fn handles(&self) -> &HandleManager {
        &self.handles
    }

    /// Current counters.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            handles: self.handles.stats(),
            bound_tokens: self.bridge.bound_tokens(),
        }
    }

    fn wrap(&self, solid: Manifold) -> SolidHandle {
        self.handles.wrap(solid)
    }

    // =========================================================================
    // PRIMITIVES
    // =========================================================================

    /// Box with extents `x`, `y`, `z`.
    pub fn cube(&self, x: f64, y: f64, z: f64, centered: bool) -> CsgResult<SolidHandle> {
        trace!(x, y, z, centered, "cube");
        let size = vector3("box size", x, y, z)?;
        Ok(self.wrap(Manifold::cube(size, centered)))
    }

    /// Cylinder or cone along +Z.
    pub fn cylinder(
        &self,
        height: f64,
        r_bottom: f64,
        r_top: f64,
        segment_count: Option<f64>,
        centered: bool,
    ) -> CsgResult<SolidHandle> {
        trace!(height, r_bottom, r_top, centered, "cylinder");
        let height = finite("height", height)?;
        let r_bottom = finite("bottom radius", r_bottom)?;
        let r_top = finite("top radius", r_top)?;
        let n = segments(&self.config, segment_count)?;
        Ok(self.wrap(Manifold::cylinder(height, r_bottom, r_top, n, centered)))
    }

    /// Sphere centered on the origin.
    pub fn sphere(&self, radius: f64, segment_count: Option<f64>) -> CsgResult<SolidHandle> {
        trace!(radius, "sphere");
        let radius = finite("radius", radius)?;
        let n = segments(&self.config, segment_count)?;
        Ok(self.wrap(Manifold::sphere(radius, n)))
    }

    /// Regular tetrahedron on alternate corners of the cube `[-1, 1]^3`.
    pub fn tetrahedron(&self) -> SolidHandle {
        trace!("tetrahedron");
        self.wrap(Manifold::tetrahedron())
    }

    /// Torus around Z: a circle of `minor_radius` placed `major_radius` off
    /// the axis and revolved a full turn.
    pub fn torus(
        &self,
        major_radius: f64,
        minor_radius: f64,
        major_segments: Option<f64>,
        minor_segments: Option<f64>,
    ) -> CsgResult<SolidHandle> {
        trace!(major_radius, minor_radius, "torus");
        let major_radius = finite("major radius", major_radius)?;
        let minor_radius = finite("minor radius", minor_radius)?;
        let major = segments(&self.config, major_segments)?;
        let minor = match minor_segments {
            None => self.config.torus_minor_segments,
            some => segments(&self.config, some)?,
        };
        let section =
            CrossSection::circle(minor_radius, minor).translate(DVec2::new(major_radius, 0.0));
        let solid = section.revolve(major, FULL_TURN_DEGREES)?;
        Ok(self.wrap(solid))
    }

    // =========================================================================
    // COMBINATORS
    // =========================================================================

    /// `a ∪ b`. Neither input is consumed.
    pub fn union(&self, a: &SolidHandle, b: &SolidHandle) -> CsgResult<SolidHandle> {
        self.binary("union", a, b, |a, b| a.union(b))
    }

    /// `a − b`.
    pub fn difference(&self, a: &SolidHandle, b: &SolidHandle) -> CsgResult<SolidHandle> {
        self.binary("difference", a, b, |a, b| a.difference(b))
    }

    /// `a ∩ b`.
    pub fn intersection(&self, a: &SolidHandle, b: &SolidHandle) -> CsgResult<SolidHandle> {
        self.binary("intersection", a, b, |a, b| a.intersection(b))
    }

    /// Minkowski sum of `a` and `b`.
    pub fn minkowski_sum(&self, a: &SolidHandle, b: &SolidHandle) -> CsgResult<SolidHandle> {
        self.binary("minkowski_sum", a, b, |a, b| a.minkowski_sum(b))
    }

    fn binary(
        &self,
        name: &str,
        a: &SolidHandle,
        b: &SolidHandle,
        op: impl FnOnce(&Manifold, &Manifold) -> csg_kernel::KernelResult<Manifold>,
    ) -> CsgResult<SolidHandle> {
        trace!(op = name, a = a.id(), b = b.id(), "binary");
        let a = self.handles.unwrap(a)?;
        let b = self.handles.unwrap(b)?;
        let result = op(&a, &b)?;
        Ok(self.wrap(result))
    }

    /// Union of any number of solids. Inputs are copied into the batch and
    /// stay valid.
    pub fn union_many(&self, solids: &[&SolidHandle]) -> CsgResult<SolidHandle> {
        let mut batch = SolidCollection::new();
        for handle in solids {
            batch.copy_into(&self.handles, handle)?;
        }
        self.finish_union(batch)
    }

    /// [`CsgSession::union_many`] for hosts holding only handle ids.
    pub fn union_many_ids(&self, ids: &[u64]) -> CsgResult<SolidHandle> {
        let mut batch = SolidCollection::new();
        for &id in ids {
            batch.copy_key(&self.handles, SolidKey::from_id(id))?;
        }
        self.finish_union(batch)
    }

    fn finish_union(&self, batch: SolidCollection) -> CsgResult<SolidHandle> {
        trace!(inputs = batch.len(), "union_many");
        let result = Manifold::batch_union(batch.as_slice())?;
        Ok(self.wrap(result))
    }

    /// Convex hull of any number of solids. The inputs are donated: their
    /// handles are consumed.
    ///
    /// The handles are moved in, so they are consumed even when the call
    /// fails: if any handle is stale or foreign, the rest are dropped and
    /// their solids released. Use [`CsgSession::hull_ids`] to keep the inputs
    /// alive on failure.
    pub fn hull(&self, solids: Vec<SolidHandle>) -> CsgResult<SolidHandle> {
        for handle in &solids {
            // on error `solids` drops here and releases every input
            self.handles.unwrap(handle)?;
        }
        let mut batch = SolidCollection::new();
        for handle in solids {
            batch.donate_into(&self.handles, handle)?;
        }
        Ok(self.finish_hull(batch))
    }

    /// [`CsgSession::hull`] for hosts holding only handle ids. Every listed
    /// handle is invalidated, including repeats of the same handle. Nothing
    /// is donated unless every id is live.
    pub fn hull_ids(&self, ids: &[u64]) -> CsgResult<SolidHandle> {
        let mut keys: Vec<SolidKey> = Vec::with_capacity(ids.len());
        for key in ids.iter().map(|&id| SolidKey::from_id(id)) {
            if !keys.contains(&key) {
                self.handles.lookup(key)?;
                keys.push(key);
            }
        }
        if keys.len() < ids.len() {
            debug!(
                listed = ids.len(),
                distinct = keys.len(),
                "hull input repeats a handle"
            );
        }
        let mut batch = SolidCollection::new();
        for key in keys {
            batch.donate_key(&self.handles, key)?;
        }
        Ok(self.finish_hull(batch))
    }

    fn finish_hull(&self, batch: SolidCollection) -> SolidHandle {
        trace!(inputs = batch.len(), "hull");
        self.wrap(Manifold::batch_hull(batch.as_slice()))
    }

    // =========================================================================
    // SWEEPS
    // =========================================================================

    /// Extrude an outline along +Z.
    ///
    /// `slices` defaults to 0 (one division), `twist_degrees` to 0 and both
    /// top scales to 1.
    pub fn extrude(
        &self,
        polygon: &[HostPoint2],
        height: f64,
        slices: Option<f64>,
        twist_degrees: Option<f64>,
        scale_x: Option<f64>,
        scale_y: Option<f64>,
    ) -> CsgResult<SolidHandle> {
        let outline = PointPolygon::from_host(polygon)?;
        let height = finite("height", height)?;
        let slices = count_or_zero("slices", slices)?;
        let twist = finite_or("twist", twist_degrees, 0.0)?;
        let scale = DVec2::new(
            finite_or("scale_x", scale_x, 1.0)?,
            finite_or("scale_y", scale_y, 1.0)?,
        );
        trace!(points = outline.len(), height, slices, twist, "extrude");
        let section = outline.to_cross_section()?;
        let solid = section.extrude(height, slices, twist, scale)?;
        Ok(self.wrap(solid))
    }

    /// Revolve an outline about Z. `segments` defaults to 0 (proportional to
    /// the angle), `degrees` to a full turn.
    pub fn revolve(
        &self,
        polygon: &[HostPoint2],
        segment_count: Option<f64>,
        degrees: Option<f64>,
    ) -> CsgResult<SolidHandle> {
        let outline = PointPolygon::from_host(polygon)?;
        let n = count_or_zero("segments", segment_count)?;
        let degrees = finite_or("degrees", degrees, FULL_TURN_DEGREES)?;
        trace!(points = outline.len(), n, degrees, "revolve");
        let section = outline.to_cross_section()?;
        let solid = section.revolve(n, degrees)?;
        Ok(self.wrap(solid))
    }

    // =========================================================================
    // TRANSFORMS
    // =========================================================================

    /// Moved copy.
    pub fn translate(&self, solid: &SolidHandle, x: f64, y: f64, z: f64) -> CsgResult<SolidHandle> {
        let offset = vector3("translation", x, y, z)?;
        self.unary("translate", solid, |s| Ok(s.translate(offset)?))
    }

    /// Rotated copy; Euler angles in degrees applied about X, then Y, then Z.
    pub fn rotate(&self, solid: &SolidHandle, x: f64, y: f64, z: f64) -> CsgResult<SolidHandle> {
        let degrees = vector3("rotation", x, y, z)?;
        self.unary("rotate", solid, |s| Ok(s.rotate(degrees)?))
    }

    /// Scaled copy.
    pub fn scale(&self, solid: &SolidHandle, x: f64, y: f64, z: f64) -> CsgResult<SolidHandle> {
        let factors = vector3("scale", x, y, z)?;
        self.unary("scale", solid, |s| Ok(s.scale(factors)?))
    }

    /// Copy mirrored through the plane with normal `(nx, ny, nz)` through the
    /// origin.
    pub fn mirror(&self, solid: &SolidHandle, nx: f64, ny: f64, nz: f64) -> CsgResult<SolidHandle> {
        let normal = vector3("mirror normal", nx, ny, nz)?;
        self.unary("mirror", solid, |s| Ok(s.mirror(normal)?))
    }

    /// Copy with every vertex moved by a host function.
    pub fn warp<F: VertexFunction>(&self, solid: &SolidHandle, function: F) -> CsgResult<SolidHandle> {
        self.unary("warp", solid, |s| self.bridge.warp(s, function))
    }

    fn unary(
        &self,
        name: &str,
        solid: &SolidHandle,
        op: impl FnOnce(&Manifold) -> CsgResult<Manifold>,
    ) -> CsgResult<SolidHandle> {
        trace!(op = name, solid = solid.id(), "unary");
        let input = self.handles.unwrap(solid)?;
        let result = op(&input)?;
        Ok(self.wrap(result))
    }

    // =========================================================================
    // PLANE OPERATIONS
    // =========================================================================

    /// Part on the normal side of `dot(n, p) = offset`.
    pub fn trim_by_plane(
        &self,
        solid: &SolidHandle,
        nx: f64,
        ny: f64,
        nz: f64,
        offset: Option<f64>,
    ) -> CsgResult<SolidHandle> {
        let normal = vector3("plane normal", nx, ny, nz)?;
        let offset = finite_or("offset", offset, 0.0)?;
        self.unary("trim_by_plane", solid, |s| Ok(s.trim_by_plane(normal, offset)?))
    }

    /// `(kept, removed)`: two independently owned handles.
    pub fn split_by_plane(
        &self,
        solid: &SolidHandle,
        nx: f64,
        ny: f64,
        nz: f64,
        offset: Option<f64>,
    ) -> CsgResult<(SolidHandle, SolidHandle)> {
        let normal = vector3("plane normal", nx, ny, nz)?;
        let offset = finite_or("offset", offset, 0.0)?;
        trace!(solid = solid.id(), "split_by_plane");
        let input = self.handles.unwrap(solid)?;
        let (kept, removed) = input.split_by_plane(normal, offset)?;
        Ok((self.wrap(kept), self.wrap(removed)))
    }

    /// Connected components, each with its own handle.
    pub fn decompose(&self, solid: &SolidHandle) -> CsgResult<Vec<SolidHandle>> {
        trace!(solid = solid.id(), "decompose");
        let input = self.handles.unwrap(solid)?;
        let parts = input.decompose();
        Ok(parts.into_iter().map(|part| self.wrap(part)).collect())
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    /// Enclosed volume.
    pub fn volume(&self, solid: &SolidHandle) -> CsgResult<f64> {
        Ok(self.handles.unwrap(solid)?.volume())
    }

    /// Total surface area.
    pub fn surface_area(&self, solid: &SolidHandle) -> CsgResult<f64> {
        Ok(self.handles.unwrap(solid)?.surface_area())
    }

    /// `[[min], [max]]`, or `None` for the empty solid.
    pub fn bounding_box(&self, solid: &SolidHandle) -> CsgResult<Option<[[f64; 3]; 2]>> {
        let bounds = self.handles.unwrap(solid)?.bounding_box();
        Ok(bounds.map(|bb| [bb.min.to_array(), bb.max.to_array()]))
    }

    /// Vertex count.
    pub fn num_vert(&self, solid: &SolidHandle) -> CsgResult<usize> {
        Ok(self.handles.unwrap(solid)?.num_vert())
    }

    /// Triangle count.
    pub fn num_tri(&self, solid: &SolidHandle) -> CsgResult<usize> {
        Ok(self.handles.unwrap(solid)?.num_tri())
    }

    /// True for the empty solid.
    pub fn is_empty(&self, solid: &SolidHandle) -> CsgResult<bool> {
        Ok(self.handles.unwrap(solid)?.is_empty())
    }

    // =========================================================================
    // MESH I/O AND LIFETIME
    // =========================================================================

    /// Boundary as host lists with 1-based faces.
    pub fn to_mesh(&self, solid: &SolidHandle) -> CsgResult<HostMesh> {
        let solid = self.handles.unwrap(solid)?;
        Ok(encode_mesh(&solid))
    }

    /// Solid from host lists with 1-based faces.
    pub fn from_mesh(&self, verts: &[HostPoint3], faces: &[HostFace]) -> CsgResult<SolidHandle> {
        trace!(verts = verts.len(), faces = faces.len(), "from_mesh");
        let solid = decode_mesh(verts, faces, &self.config)?;
        Ok(self.wrap(solid))
    }

    /// Binary STL bytes.
    pub fn to_stl(&self, solid: &SolidHandle) -> CsgResult<Vec<u8>> {
        Ok(to_stl_binary(self.handles.unwrap(solid)?.mesh()))
    }

    /// Independent deep copy under a new handle.
    pub fn copy(&self, solid: &SolidHandle) -> CsgResult<SolidHandle> {
        self.unary("copy", solid, |s| Ok(s.clone()))
    }

    /// Destroy the solid now. Returns `false` when already released.
    pub fn release(&self, solid: &SolidHandle) -> CsgResult<bool> {
        self.handles.release(solid)
    }

    /// True once the handle has been released or donated. A handle from
    /// another session is never live here.
    pub fn is_released(&self, solid: &SolidHandle) -> bool {
        !self.handles.holds(solid)
    }
}
