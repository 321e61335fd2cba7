//! # Geometry Utilities
//!
//! Point-in-solid classification for boolean operations.
//!
//! ## Contents
//!
//! - **Ray casting**: `ray_hits_triangle`, parity voting over skewed rays
//! - **Surface contact**: detection of fragments lying on a face of the
//!   other solid, with the relative orientation of the two faces

use config::constants::PLANE_EPSILON;
use glam::DVec3;

use super::polygon::BspPolygon;
use crate::mesh::MeshBuffers;

/// Stricter tolerance for ray intersection.
const RAY_EPSILON: f64 = 1e-12;

/// Ray directions deliberately off every axis and diagonal, so rays from
/// fragment centroids rarely graze the edges of axis-aligned geometry.
const RAY_DIRECTIONS: [[f64; 3]; 5] = [
    [0.5773, 0.6123, 0.5404],
    [-0.6917, 0.3517, 0.6307],
    [0.2621, -0.8413, 0.4729],
    [-0.4071, -0.3397, -0.8479],
    [0.8233, 0.1607, -0.5444],
];

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// Where a fragment of one solid lies relative to the other solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Containment {
    /// Strictly inside.
    Inside,
    /// Strictly outside.
    Outside,
    /// On the surface, facing the same way as the surface.
    CoplanarSame,
    /// On the surface, facing the opposite way.
    CoplanarOpposite,
}

/// Triangle with its unit normal, precomputed for repeated probing.
#[derive(Debug, Clone, Copy)]
struct RayTriangle {
    corners: [DVec3; 3],
    normal: DVec3,
}

/// Read-only view of a closed mesh for repeated point classification.
#[derive(Debug)]
pub struct SolidClassifier {
    triangles: Vec<RayTriangle>,
}

impl SolidClassifier {
    /// Precompute triangle data for `mesh`. Zero-area triangles are skipped.
    pub fn new(mesh: &MeshBuffers) -> Self {
        let triangles = (0..mesh.triangle_count())
            .filter_map(|t| {
                let corners = mesh.triangle(t);
                let normal = (corners[1] - corners[0])
                    .cross(corners[2] - corners[0])
                    .try_normalize()?;
                Some(RayTriangle { corners, normal })
            })
            .collect();
        Self { triangles }
    }

    /// Classify a polygon fragment by its centroid.
    pub fn classify(&self, poly: &BspPolygon) -> Containment {
        let center = poly.centroid();
        if let Some(surface_normal) = self.surface_normal_at(center, poly.normal) {
            return if surface_normal.dot(poly.normal) > 0.0 {
                Containment::CoplanarSame
            } else {
                Containment::CoplanarOpposite
            };
        }
        if self.contains(center) {
            Containment::Inside
        } else {
            Containment::Outside
        }
    }

    /// Majority vote of ray parity over the ray directions.
    pub fn contains(&self, point: DVec3) -> bool {
        let inside_votes = RAY_DIRECTIONS
            .iter()
            .filter(|dir| {
                let dir = DVec3::from_array(**dir);
                let hits = self
                    .triangles
                    .iter()
                    .filter(|tri| ray_hits_triangle(point, dir, &tri.corners))
                    .count();
                hits % 2 == 1
            })
            .count();
        inside_votes * 2 > RAY_DIRECTIONS.len()
    }

    /// Normal of a face that `point` lies on and that is parallel to
    /// `fragment_normal`, if any.
    fn surface_normal_at(&self, point: DVec3, fragment_normal: DVec3) -> Option<DVec3> {
        self.triangles
            .iter()
            .filter(|tri| tri.normal.dot(fragment_normal).abs() > 1.0 - 1e-6)
            .find(|tri| {
                let distance = tri.normal.dot(point - tri.corners[0]);
                distance.abs() < PLANE_EPSILON && point_in_triangle(point, tri)
            })
            .map(|tri| tri.normal)
    }
}

// =============================================================================
// RAY CASTING
// =============================================================================

/// Möller–Trumbore ray-triangle intersection, positive direction only.
///
/// ## Reference
///
/// Möller, T., & Trumbore, B. (1997). Fast, minimum storage ray-triangle intersection.
pub fn ray_hits_triangle(origin: DVec3, dir: DVec3, corners: &[DVec3; 3]) -> bool {
    let [v0, v1, v2] = *corners;
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;

    let h = dir.cross(edge2);
    let a = edge1.dot(h);
    if a.abs() < RAY_EPSILON {
        return false;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return false;
    }

    let q = s.cross(edge1);
    let v = f * dir.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return false;
    }

    f * edge2.dot(q) > RAY_EPSILON
}

/// Barycentric containment of a point already known to be near the
/// triangle's plane, with a small tolerance on the edges.
fn point_in_triangle(p: DVec3, tri: &RayTriangle) -> bool {
    let [a, b, c] = tri.corners;
    let n = tri.normal;
    let tolerance = -PLANE_EPSILON;
    (b - a).cross(p - a).dot(n) >= tolerance * (b - a).length()
        && (c - b).cross(p - b).dot(n) >= tolerance * (c - b).length()
        && (a - c).cross(p - c).dot(n) >= tolerance * (a - c).length()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Manifold;

    fn unit_cube_classifier() -> SolidClassifier {
        SolidClassifier::new(Manifold::cube(DVec3::ONE, false).mesh())
    }

    #[test]
    fn test_ray_hits_triangle() {
        let tri = [DVec3::ZERO, DVec3::X, DVec3::Y];
        let origin = DVec3::new(0.2, 0.2, 1.0);
        assert!(ray_hits_triangle(origin, -DVec3::Z, &tri));
        assert!(!ray_hits_triangle(origin, DVec3::Z, &tri));
    }

    #[test]
    fn test_contains_center_not_outside() {
        let classifier = unit_cube_classifier();
        assert!(classifier.contains(DVec3::splat(0.5)));
        assert!(!classifier.contains(DVec3::splat(1.5)));
        assert!(!classifier.contains(DVec3::new(-0.5, 0.5, 0.5)));
    }

    #[test]
    fn test_classify_coplanar_fragments() {
        let classifier = unit_cube_classifier();
        // lies on the top face, facing up like the face
        let same = BspPolygon::new(vec![
            DVec3::new(0.2, 0.2, 1.0),
            DVec3::new(0.4, 0.2, 1.0),
            DVec3::new(0.2, 0.4, 1.0),
        ])
        .unwrap();
        assert_eq!(classifier.classify(&same), Containment::CoplanarSame);

        let mut opposite = same.clone();
        opposite.flip();
        assert_eq!(classifier.classify(&opposite), Containment::CoplanarOpposite);
    }

    #[test]
    fn test_classify_strict() {
        let classifier = unit_cube_classifier();
        let inside = BspPolygon::new(vec![
            DVec3::new(0.2, 0.2, 0.5),
            DVec3::new(0.4, 0.2, 0.5),
            DVec3::new(0.2, 0.4, 0.5),
        ])
        .unwrap();
        assert_eq!(classifier.classify(&inside), Containment::Inside);

        let outside = BspPolygon::new(vec![
            DVec3::new(2.2, 0.2, 0.5),
            DVec3::new(2.4, 0.2, 0.5),
            DVec3::new(2.2, 0.4, 0.5),
        ])
        .unwrap();
        assert_eq!(classifier.classify(&outside), Containment::Outside);
    }
}
