//! # Minkowski Sum
//!
//! For convex operands the sum is the hull of all pairwise vertex sums.
//!
//! A non-convex operand is swept instead: the result is the union of
//! `hull(triangle ⊕ B)` over every triangle of the non-convex solid, plus a
//! copy of that solid translated by one vertex of `B`. This is exact when the
//! other operand is convex; a non-convex `B` is replaced by its hull, which
//! over-approximates.

use tracing::{debug, instrument};

use super::hull::hull_points;
use super::Manifold;
use crate::error::KernelResult;

/// Relative volume difference below which a solid counts as convex.
const CONVEXITY_TOLERANCE: f64 = 1e-6;

impl Manifold {
    /// True when the solid equals its own convex hull.
    #[must_use]
    pub fn is_convex(&self) -> bool {
        let volume = self.volume();
        let hull_volume = self.hull().volume();
        (hull_volume - volume).abs() <= CONVEXITY_TOLERANCE * hull_volume.max(1.0)
    }

    /// Minkowski sum of `self` and `other`.
    #[instrument(skip_all, fields(a_verts = self.num_vert(), b_verts = other.num_vert()))]
    pub fn minkowski_sum(&self, other: &Manifold) -> KernelResult<Manifold> {
        if self.is_empty() || other.is_empty() {
            return Ok(Manifold::empty());
        }
        match (self.is_convex(), other.is_convex()) {
            (true, true) => Ok(convex_sum(self, other)),
            (false, true) => swept_sum(self, other),
            (true, false) => swept_sum(other, self),
            (false, false) => {
                debug!("both operands non-convex, sweeping against hull of the second");
                swept_sum(self, &other.hull())
            }
        }
    }
}

fn convex_sum(a: &Manifold, b: &Manifold) -> Manifold {
    let b_points: Vec<_> = b.mesh().positions().collect();
    let sums: Vec<_> = a
        .mesh()
        .positions()
        .flat_map(|p| b_points.iter().map(move |&q| p + q))
        .collect();
    Manifold::from_buffers(hull_points(&sums))
}

fn swept_sum(non_convex: &Manifold, convex: &Manifold) -> KernelResult<Manifold> {
    let b_points: Vec<_> = convex.mesh().positions().collect();
    let mesh = non_convex.mesh();
    let mut pieces = Vec::with_capacity(mesh.triangle_count() + 1);
    pieces.push(non_convex.translate(b_points[0])?);
    for t in 0..mesh.triangle_count() {
        let sums: Vec<_> = mesh
            .triangle(t)
            .into_iter()
            .flat_map(|p| b_points.iter().map(move |&q| p + q))
            .collect();
        pieces.push(Manifold::from_buffers(hull_points(&sums)));
    }
    Manifold::batch_union(&pieces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DVec3;

    #[test]
    fn test_cube_plus_cube() {
        let a = Manifold::cube(DVec3::splat(2.0), true);
        let b = Manifold::cube(DVec3::splat(1.0), true);
        let sum = a.minkowski_sum(&b).unwrap();
        assert_relative_eq!(sum.volume(), 27.0, epsilon = 1e-6);
        let bb = sum.bounding_box().unwrap();
        assert_eq!(bb.min, DVec3::splat(-1.5));
    }

    #[test]
    fn test_is_convex() {
        assert!(Manifold::cube(DVec3::ONE, false).is_convex());
        assert!(Manifold::sphere(1.0, 12).is_convex());
        let l_shape = Manifold::cube(DVec3::new(2.0, 1.0, 1.0), false)
            .union(&Manifold::cube(DVec3::new(1.0, 2.0, 1.0), false))
            .unwrap();
        assert!(!l_shape.is_convex());
    }

    #[test]
    fn test_non_convex_sum_grows_l_shape() {
        let l_shape = Manifold::cube(DVec3::new(2.0, 1.0, 1.0), false)
            .union(&Manifold::cube(DVec3::new(1.0, 2.0, 1.0), false))
            .unwrap();
        let small = Manifold::cube(DVec3::splat(0.2), true);
        let sum = l_shape.minkowski_sum(&small).unwrap();
        let bb = sum.bounding_box().unwrap();
        assert_relative_eq!(bb.min.x, -0.1, epsilon = 1e-5);
        assert_relative_eq!(bb.max.y, 2.1, epsilon = 1e-5);
        // outline grows to a 2.2 square minus a unit notch, height grows to 1.2
        assert_relative_eq!(sum.volume(), (2.2 * 2.2 - 1.0) * 1.2, epsilon = 1e-3);
    }

    #[test]
    fn test_empty_operand() {
        let a = Manifold::cube(DVec3::ONE, false);
        assert!(a.minkowski_sum(&Manifold::empty()).unwrap().is_empty());
    }
}
