//! # Sweeps
//!
//! Linear extrusion along +Z and revolution about the Z axis. Both emit
//! shared vertices with outward winding, taking the outline's triangulation
//! for the caps.

use config::constants::{
    DEFAULT_SEGMENTS, EPSILON, FULL_TURN_DEGREES, MAX_SEGMENTS, MIN_SEGMENTS,
};
use glam::{DVec2, DVec3};
use tracing::instrument;

use super::triangulate::triangulate;
use super::{signed_area, CrossSection};
use crate::error::{KernelError, KernelResult};
use crate::manifold::transform::{cosd, sind};
use crate::manifold::Manifold;
use crate::mesh::MeshBuffers;

// =============================================================================
// LINEAR EXTRUDE
// =============================================================================

impl CrossSection {
    /// Extrude from `z = 0` to `z = height`.
    ///
    /// The outline is rotated counter-clockwise by up to `twist_degrees` and
    /// scaled by up to `scale_top` as it rises, both linearly over `slices`
    /// divisions (at least one). A top scale of zero on both axes closes the
    /// solid with an apex. Non-positive heights give the empty solid.
    #[instrument(skip(self), fields(points = self.len()))]
    pub fn extrude(
        &self,
        height: f64,
        slices: u32,
        twist_degrees: f64,
        scale_top: DVec2,
    ) -> KernelResult<Manifold> {
        if !height.is_finite() || !twist_degrees.is_finite() {
            return Err(KernelError::invalid_parameter(
                "extrude",
                "height and twist must be finite",
            ));
        }
        if !scale_top.is_finite() || scale_top.min_element() < 0.0 {
            return Err(KernelError::invalid_parameter(
                "extrude",
                "top scale must be finite and non-negative",
            ));
        }
        let outline = self.ccw_points();
        if height <= 0.0 || signed_area(&outline) <= EPSILON {
            return Ok(Manifold::empty());
        }
        let caps = triangulate(&outline)?;

        let n = outline.len();
        let divisions = slices.clamp(1, MAX_SEGMENTS) as usize;
        let apex = scale_top == DVec2::ZERO;
        let mut mesh = MeshBuffers::with_capacity(n * (divisions + 1), 2 * n * divisions + 2 * caps.len());

        let full_layers = if apex { divisions } else { divisions + 1 };
        for layer in 0..full_layers {
            let t = layer as f64 / divisions as f64;
            let scale = DVec2::ONE + (scale_top - DVec2::ONE) * t;
            let (s, c) = (sind(twist_degrees * t), cosd(twist_degrees * t));
            for p in &outline {
                let q = *p * scale;
                mesh.add_vertex(DVec3::new(q.x * c - q.y * s, q.x * s + q.y * c, height * t));
            }
        }
        let apex_index = apex.then(|| mesh.add_vertex(DVec3::new(0.0, 0.0, height)));

        let at = |layer: usize, i: usize| (layer * n + i) as u32;
        for layer in 0..divisions {
            let top_is_apex = apex && layer + 1 == divisions;
            for i in 0..n {
                let j = (i + 1) % n;
                match apex_index.filter(|_| top_is_apex) {
                    Some(tip) => mesh.add_triangle(at(layer, i), at(layer, j), tip),
                    None => {
                        mesh.add_triangle(at(layer, i), at(layer, j), at(layer + 1, j));
                        mesh.add_triangle(at(layer, i), at(layer + 1, j), at(layer + 1, i));
                    }
                }
            }
        }

        for &[a, b, c] in &caps {
            mesh.add_triangle(at(0, a), at(0, c), at(0, b));
            if !apex {
                mesh.add_triangle(at(divisions, a), at(divisions, b), at(divisions, c));
            }
        }
        Ok(Manifold::from_buffers(mesh))
    }

    // =========================================================================
    // REVOLVE
    // =========================================================================

    /// Revolve the `x >= 0` part of the outline about the Z axis, mapping
    /// outline `(x, y)` to `(x, 0, y)` and sweeping toward +Y.
    ///
    /// `segments == 0` picks a count proportional to the swept angle.
    /// Angles beyond a full turn are clamped to one; a partial turn is
    /// closed with flat caps. Outline points on the axis become single
    /// vertices shared by every ring.
    #[instrument(skip(self), fields(points = self.len()))]
    pub fn revolve(&self, segments: u32, degrees: f64) -> KernelResult<Manifold> {
        if !degrees.is_finite() {
            return Err(KernelError::invalid_parameter(
                "revolve",
                "angle must be finite",
            ));
        }
        if degrees <= 0.0 {
            return Ok(Manifold::empty());
        }
        let degrees = degrees.min(FULL_TURN_DEGREES);
        let full_turn = degrees >= FULL_TURN_DEGREES;

        let outline = clip_to_positive_x(&self.ccw_points());
        if outline.len() < 3 || signed_area(&outline) <= EPSILON {
            return Ok(Manifold::empty());
        }
        let caps = if full_turn { Vec::new() } else { triangulate(&outline)? };

        let segments: u32 = if segments == 0 {
            let scaled = f64::from(DEFAULT_SEGMENTS) * degrees / FULL_TURN_DEGREES;
            (scaled.ceil() as u32).clamp(MIN_SEGMENTS, MAX_SEGMENTS)
        } else {
            segments.clamp(MIN_SEGMENTS, MAX_SEGMENTS)
        };
        let segments = segments as usize;
        let rings = if full_turn { segments } else { segments + 1 };

        // index[ring][point]
        let mut mesh = MeshBuffers::new();
        let mut index = vec![vec![0u32; outline.len()]; rings];
        for (i, p) in outline.iter().enumerate() {
            if p.x == 0.0 {
                let v = mesh.add_vertex(DVec3::new(0.0, 0.0, p.y));
                index.iter_mut().for_each(|ring| ring[i] = v);
            }
        }
        for (r, ring) in index.iter_mut().enumerate() {
            let phi = degrees * r as f64 / segments as f64;
            let (s, c) = (sind(phi), cosd(phi));
            for (i, p) in outline.iter().enumerate() {
                if p.x != 0.0 {
                    ring[i] = mesh.add_vertex(DVec3::new(p.x * c, p.x * s, p.y));
                }
            }
        }

        let n = outline.len();
        for r in 0..segments {
            let next = (r + 1) % rings;
            for i in 0..n {
                let j = (i + 1) % n;
                let (a, b) = (index[r][i], index[r][j]);
                let (c, d) = (index[next][j], index[next][i]);
                if b != c {
                    mesh.add_triangle(a, c, b);
                }
                if a != d {
                    mesh.add_triangle(a, d, c);
                }
            }
        }

        let last = rings - 1;
        for &[a, b, c] in &caps {
            mesh.add_triangle(index[0][a], index[0][b], index[0][c]);
            mesh.add_triangle(index[last][a], index[last][c], index[last][b]);
        }
        Ok(Manifold::from_buffers(mesh))
    }
}

/// Clip a counter-clockwise outline to the half-plane `x >= 0`, snapping
/// near-axis points onto the axis and dropping repeated points.
fn clip_to_positive_x(points: &[DVec2]) -> Vec<DVec2> {
    let extent = points
        .iter()
        .fold(1.0_f64, |m, p| m.max(p.abs().max_element()));
    let snap = EPSILON * extent;

    let mut clipped: Vec<DVec2> = Vec::with_capacity(points.len() + 2);
    let n = points.len();
    for i in 0..n {
        let (p, q) = (points[i], points[(i + 1) % n]);
        if p.x >= 0.0 {
            clipped.push(p);
        }
        if (p.x < 0.0) != (q.x < 0.0) {
            let t = p.x / (p.x - q.x);
            clipped.push(DVec2::new(0.0, p.y + (q.y - p.y) * t));
        }
    }
    for p in &mut clipped {
        if p.x.abs() <= snap {
            p.x = 0.0;
        }
    }
    clipped.dedup();
    if clipped.len() > 1 && clipped.first() == clipped.last() {
        clipped.pop();
    }
    clipped
}
