//! # Plane Operations
//!
//! Cutting a solid by the plane `dot(normal, p) = offset`. The retained
//! half-space is the side the normal points to, `dot(normal, p) >= offset`.
//!
//! The cut is an intersection with a box large enough to contain the solid,
//! with one face on the plane.

use glam::{DMat3, DQuat, DVec3};
use tracing::instrument;

use super::Manifold;
use crate::error::{KernelError, KernelResult};

impl Manifold {
    /// Part of the solid on the normal side of the plane.
    pub fn trim_by_plane(&self, normal: DVec3, offset: f64) -> KernelResult<Manifold> {
        let n = unit_normal("trim_by_plane", normal, offset)?;
        self.keep_side(n, offset)
    }

    /// Both parts of the solid: `(kept, removed)`, where `kept` is what
    /// [`Manifold::trim_by_plane`] returns and `removed` is the remainder.
    /// Both are computed before either is returned.
    pub fn split_by_plane(&self, normal: DVec3, offset: f64) -> KernelResult<(Manifold, Manifold)> {
        let n = unit_normal("split_by_plane", normal, offset)?;
        let kept = self.keep_side(n, offset)?;
        let removed = self.keep_side(-n, -offset)?;
        Ok((kept, removed))
    }

    #[instrument(skip(self), fields(tris = self.num_tri()))]
    fn keep_side(&self, n: DVec3, offset: f64) -> KernelResult<Manifold> {
        let Some(bb) = self.bounding_box() else {
            return Ok(Manifold::empty());
        };
        let distances = self.mesh().positions().map(|p| n.dot(p) - offset);
        let (lo, hi) = distances.fold((f64::MAX, f64::MIN), |(lo, hi), d| (lo.min(d), hi.max(d)));
        if lo >= 0.0 {
            return Ok(self.clone());
        }
        if hi <= 0.0 {
            return Ok(Manifold::empty());
        }
        self.intersection(&half_space(n, offset, bb.max_abs_coordinate())?)
    }
}

fn unit_normal(operation: &str, normal: DVec3, offset: f64) -> KernelResult<DVec3> {
    if !offset.is_finite() {
        return Err(KernelError::invalid_parameter(operation, "plane offset must be finite"));
    }
    normal
        .try_normalize()
        .ok_or_else(|| KernelError::invalid_parameter(operation, "plane normal must be non-zero"))
}

/// Box covering `dot(n, p) >= offset` within `reach` of the origin.
fn half_space(n: DVec3, offset: f64, reach: f64) -> KernelResult<Manifold> {
    let size = 4.0 * (reach + offset.abs()) + 2.0;
    let slab = Manifold::cube(DVec3::new(size, size, size), false)
        .translate(DVec3::new(-size / 2.0, -size / 2.0, 0.0))?;
    let rotation = DMat3::from_quat(DQuat::from_rotation_arc(DVec3::Z, n));
    slab.transform(rotation, n * offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_trim_cube_in_half() {
        let cube = Manifold::cube(DVec3::splat(2.0), true);
        let kept = cube.trim_by_plane(DVec3::X, 0.0).unwrap();
        assert_relative_eq!(kept.volume(), 4.0, epsilon = 1e-4);
        assert!(kept.bounding_box().unwrap().min.x > -1e-5);
    }

    #[test]
    fn test_split_volumes_sum() {
        let cube = Manifold::cube(DVec3::splat(2.0), true);
        let (kept, removed) = cube.split_by_plane(DVec3::new(0.0, 0.0, 1.0), 0.0).unwrap();
        assert_relative_eq!(kept.volume(), 4.0, epsilon = 1e-4);
        assert_relative_eq!(removed.volume(), 4.0, epsilon = 1e-4);
        assert_relative_eq!(kept.volume() + removed.volume(), cube.volume(), epsilon = 1e-4);
    }

    #[test]
    fn test_oblique_split_of_cube() {
        let cube = Manifold::cube(DVec3::splat(2.0), true);
        let (kept, removed) = cube.split_by_plane(DVec3::new(1.0, 1.0, 0.0), 0.0).unwrap();
        assert_relative_eq!(kept.volume(), 4.0, epsilon = 1e-3);
        assert_relative_eq!(removed.volume(), 4.0, epsilon = 1e-3);
    }

    #[test]
    fn test_trim_with_offset() {
        let cube = Manifold::cube(DVec3::splat(2.0), true);
        let kept = cube.trim_by_plane(DVec3::Z, 0.5).unwrap();
        assert_relative_eq!(kept.volume(), 2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_plane_missing_solid() {
        let cube = Manifold::cube(DVec3::ONE, false);
        let (kept, removed) = cube.split_by_plane(DVec3::Z, -1.0).unwrap();
        assert_eq!(kept, cube);
        assert!(removed.is_empty());
    }

    #[test]
    fn test_zero_normal_rejected() {
        let cube = Manifold::cube(DVec3::ONE, false);
        let err = cube.trim_by_plane(DVec3::ZERO, 0.0).unwrap_err();
        assert!(matches!(err, KernelError::InvalidParameter { .. }));
    }
}
