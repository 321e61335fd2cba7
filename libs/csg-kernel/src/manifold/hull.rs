//! # Convex Hull
//!
//! QuickHull over the vertices of one or more solids.
//!
//! ## Algorithm
//!
//! 1. Find an initial tetrahedron from extreme points
//! 2. Assign outside points to faces
//! 3. While a face has outside points:
//!    - take its farthest point
//!    - collect the faces visible from it and their horizon edges
//!    - replace the visible faces with a fan from the horizon to the point
//!    - reassign orphaned points to the new faces
//! 4. Emit the surviving faces with shared vertices
//!
//! Fewer than four non-coplanar points produce the empty solid.
//!
//! ## References
//!
//! - Barber, Dobkin & Huhdanpaa (1996). "The Quickhull Algorithm for Convex Hulls"

use std::collections::{HashMap, HashSet};

use config::constants::HULL_EPSILON;
use glam::DVec3;
use tracing::{debug, instrument};

use super::Manifold;
use crate::mesh::MeshBuffers;

impl Manifold {
    /// Convex hull of this solid.
    #[must_use]
    pub fn hull(&self) -> Manifold {
        Manifold::batch_hull(std::slice::from_ref(self))
    }

    /// Convex hull of the union of all vertices of `solids`.
    #[instrument(skip_all, fields(solids = solids.len()))]
    #[must_use]
    pub fn batch_hull(solids: &[Manifold]) -> Manifold {
        let mut seen = HashSet::new();
        let points: Vec<DVec3> = solids
            .iter()
            .flat_map(|s| s.mesh().positions())
            .filter(|p| seen.insert([p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]))
            .collect();
        Manifold::from_buffers(hull_points(&points))
    }
}

/// Convex hull of a point cloud as a closed mesh.
#[must_use]
pub fn hull_points(points: &[DVec3]) -> MeshBuffers {
    if points.len() < 4 {
        return MeshBuffers::new();
    }
    let scale = points
        .iter()
        .fold(1.0_f64, |m, p| m.max(p.abs().max_element()));
    let mut hull = Hull::new(points, HULL_EPSILON * scale);
    if !hull.build_initial_tetrahedron() {
        debug!(points = points.len(), "points are degenerate, hull is empty");
        return MeshBuffers::new();
    }
    hull.assign_points((0..points.len()).collect(), 0);
    hull.expand();
    hull.to_mesh()
}

// =============================================================================
// HULL STRUCTURE
// =============================================================================

struct Hull<'a> {
    points: &'a [DVec3],
    eps: f64,
    faces: Vec<HullFace>,
    in_hull: Vec<bool>,
}

struct HullFace {
    verts: [usize; 3],
    normal: DVec3,
    d: f64,
    outside: Vec<usize>,
    active: bool,
}

impl HullFace {
    fn distance(&self, p: DVec3) -> f64 {
        self.normal.dot(p) - self.d
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.verts;
        [(a, b), (b, c), (c, a)]
    }
}

impl<'a> Hull<'a> {
    fn new(points: &'a [DVec3], eps: f64) -> Self {
        Self {
            points,
            eps,
            faces: Vec::new(),
            in_hull: vec![false; points.len()],
        }
    }

    fn build_initial_tetrahedron(&mut self) -> bool {
        let pts = self.points;
        let mut extremes = [0usize; 6];
        for (i, p) in pts.iter().enumerate() {
            for axis in 0..3 {
                if p[axis] < pts[extremes[axis * 2]][axis] {
                    extremes[axis * 2] = i;
                }
                if p[axis] > pts[extremes[axis * 2 + 1]][axis] {
                    extremes[axis * 2 + 1] = i;
                }
            }
        }

        let mut best = (0.0, 0, 0);
        for (k, &i) in extremes.iter().enumerate() {
            for &j in &extremes[k + 1..] {
                let d = pts[i].distance_squared(pts[j]);
                if d > best.0 {
                    best = (d, i, j);
                }
            }
        }
        let (_, p0, p1) = best;
        if best.0.sqrt() < self.eps {
            return false;
        }

        let axis = pts[p1] - pts[p0];
        let Some((p2, d2)) = farthest(pts, |p| axis.cross(p - pts[p0]).length()) else {
            return false;
        };
        if d2 < self.eps {
            return false;
        }

        let normal = axis.cross(pts[p2] - pts[p0]).normalize_or_zero();
        let Some((p3, d3)) = farthest(pts, |p| normal.dot(p - pts[p0]).abs()) else {
            return false;
        };
        if d3 < self.eps {
            return false;
        }

        for p in [p0, p1, p2, p3] {
            self.in_hull[p] = true;
        }
        if normal.dot(pts[p3] - pts[p0]) > 0.0 {
            self.add_face(p0, p2, p1);
            self.add_face(p0, p1, p3);
            self.add_face(p1, p2, p3);
            self.add_face(p2, p0, p3);
        } else {
            self.add_face(p0, p1, p2);
            self.add_face(p0, p3, p1);
            self.add_face(p1, p3, p2);
            self.add_face(p2, p3, p0);
        }
        true
    }

    fn add_face(&mut self, a: usize, b: usize, c: usize) {
        let (pa, pb, pc) = (self.points[a], self.points[b], self.points[c]);
        let normal = (pb - pa).cross(pc - pa).normalize_or_zero();
        self.faces.push(HullFace {
            verts: [a, b, c],
            normal,
            d: normal.dot(pa),
            outside: Vec::new(),
            active: true,
        });
    }

    /// Give each candidate to the first active face at or after
    /// `first_face` that it lies above. Points above no face are interior.
    fn assign_points(&mut self, candidates: Vec<usize>, first_face: usize) {
        for pt in candidates {
            if self.in_hull[pt] {
                continue;
            }
            let p = self.points[pt];
            let eps = self.eps;
            if let Some(face) = self.faces[first_face..]
                .iter_mut()
                .find(|f| f.active && f.distance(p) > eps)
            {
                face.outside.push(pt);
            }
        }
    }

    fn expand(&mut self) {
        let points = self.points;
        loop {
            let next = self
                .faces
                .iter()
                .filter(|f| f.active)
                .flat_map(|f| f.outside.iter().map(move |&pt| (f.distance(points[pt]), pt)))
                .max_by(|a, b| a.0.total_cmp(&b.0));
            match next {
                Some((_, pt)) => self.add_point(pt),
                None => break,
            }
        }
    }

    fn add_point(&mut self, pt: usize) {
        let p = self.points[pt];
        let visible: Vec<usize> = self
            .faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.active && f.distance(p) > self.eps)
            .map(|(i, _)| i)
            .collect();

        let visible_edges: HashSet<(usize, usize)> = visible
            .iter()
            .flat_map(|&i| self.faces[i].edges())
            .collect();
        // a visible edge whose twin is not visible borders a hidden face
        let horizon: Vec<(usize, usize)> = visible_edges
            .iter()
            .copied()
            .filter(|&(a, b)| !visible_edges.contains(&(b, a)))
            .collect();

        let mut orphans = Vec::new();
        for &i in &visible {
            let face = &mut self.faces[i];
            face.active = false;
            orphans.append(&mut face.outside);
        }
        self.in_hull[pt] = true;

        let first_new = self.faces.len();
        for (a, b) in horizon {
            self.add_face(a, b, pt);
        }
        self.assign_points(orphans, first_new);
    }

    fn to_mesh(&self) -> MeshBuffers {
        let mut mesh = MeshBuffers::new();
        let mut remap: HashMap<usize, u32> = HashMap::new();
        for face in self.faces.iter().filter(|f| f.active) {
            let [a, b, c] = face.verts.map(|v| {
                *remap
                    .entry(v)
                    .or_insert_with(|| mesh.add_vertex(self.points[v]))
            });
            mesh.add_triangle(a, b, c);
        }
        mesh
    }
}

fn farthest(points: &[DVec3], metric: impl Fn(DVec3) -> f64) -> Option<(usize, f64)> {
    points
        .iter()
        .enumerate()
        .map(|(i, &p)| (i, metric(p)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hull_of_cube_is_cube() {
        let cube = Manifold::cube(DVec3::splat(2.0), true);
        let hull = cube.hull();
        assert_eq!(hull.num_vert(), 8);
        assert_eq!(hull.num_tri(), 12);
        assert_relative_eq!(hull.mesh().signed_volume(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn test_hull_of_two_cubes_spans_both() {
        let a = Manifold::cube(DVec3::ONE, false);
        let b = a.translate(DVec3::new(3.0, 0.0, 0.0)).unwrap();
        let hull = Manifold::batch_hull(&[a, b]);
        assert_relative_eq!(hull.volume(), 4.0, epsilon = 1e-6);
    }

    #[test]
    fn test_hull_of_sphere_matches_sphere() {
        let sphere = Manifold::sphere(1.0, 16);
        let hull = sphere.hull();
        assert_relative_eq!(hull.volume(), sphere.volume(), epsilon = 1e-6);
        assert!(hull.mesh().signed_volume() > 0.0);
    }

    #[test]
    fn test_hull_ignores_interior_points() {
        let mut points: Vec<DVec3> = Manifold::tetrahedron().mesh().positions().collect();
        points.push(DVec3::ZERO);
        points.push(DVec3::splat(0.1));
        let mesh = hull_points(&points);
        assert_eq!(mesh.vertex_count(), 4);
        assert_relative_eq!(mesh.signed_volume(), 8.0 / 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_hulls_are_empty() {
        assert!(hull_points(&[DVec3::ZERO, DVec3::X, DVec3::Y]).is_empty());
        let planar = [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::new(1.0, 1.0, 0.0)];
        assert!(hull_points(&planar).is_empty());
    }
}
