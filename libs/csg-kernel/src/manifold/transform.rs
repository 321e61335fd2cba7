//! # Transforms
//!
//! Affine transforms and per-vertex deformation.
//!
//! Rotations take Euler angles in degrees applied about X, then Y, then Z.
//! Multiples of 90° are evaluated exactly so axis-aligned solids stay
//! axis-aligned. Any transform with a negative determinant flips triangle
//! winding so the result keeps outward orientation.

use glam::{DMat3, DVec3};
use tracing::instrument;

use super::Manifold;
use crate::error::{KernelError, KernelResult};
use crate::mesh::narrow;

impl Manifold {
    /// Apply `p -> linear * p + translation` to every vertex.
    ///
    /// ## Errors
    ///
    /// [`KernelError::NonFinite`] if a moved vertex overflows `f32` storage.
    pub fn transform(&self, linear: DMat3, translation: DVec3) -> KernelResult<Self> {
        let mut mesh = self.mesh().clone();
        mesh.try_map_positions("transform", |p| linear * p + translation)?;
        if linear.determinant() < 0.0 {
            mesh.flip_winding();
        }
        Ok(Self::from_buffers(mesh))
    }

    /// Move by `offset`.
    pub fn translate(&self, offset: DVec3) -> KernelResult<Self> {
        self.transform(DMat3::IDENTITY, offset)
    }

    /// Scale about the origin. Negative factors mirror.
    pub fn scale(&self, factors: DVec3) -> KernelResult<Self> {
        self.transform(DMat3::from_diagonal(factors), DVec3::ZERO)
    }

    /// Rotate by Euler angles in degrees, X first, then Y, then Z.
    pub fn rotate(&self, degrees: DVec3) -> KernelResult<Self> {
        self.transform(euler_rotation(degrees), DVec3::ZERO)
    }

    /// Reflect across the plane through the origin with the given normal.
    ///
    /// A zero normal produces the empty solid.
    pub fn mirror(&self, normal: DVec3) -> KernelResult<Self> {
        let n = normal.normalize_or_zero();
        if n == DVec3::ZERO {
            return Ok(Self::empty());
        }
        let outer = DMat3::from_cols(n * n.x, n * n.y, n * n.z);
        self.transform(DMat3::IDENTITY - outer * 2.0, DVec3::ZERO)
    }

    /// Replace every vertex with `f(vertex)`; topology is unchanged.
    ///
    /// ## Errors
    ///
    /// [`KernelError::NonFinite`] if `f` produces NaN, infinity, or a value
    /// too large for `f32` storage.
    pub fn warp(&self, mut f: impl FnMut(DVec3) -> DVec3) -> KernelResult<Self> {
        self.try_warp(|p| Ok::<_, KernelError>(f(p)))
    }

    /// Fallible warp. `f` is called exactly once per vertex, in vertex order,
    /// on the calling thread; the first error aborts the warp and is returned
    /// unchanged.
    #[instrument(skip(self, f), fields(vertices = self.num_vert()))]
    pub fn try_warp<E, F>(&self, mut f: F) -> Result<Self, E>
    where
        E: From<KernelError>,
        F: FnMut(DVec3) -> Result<DVec3, E>,
    {
        let source = self.mesh();
        let mut mesh = source.clone();
        for i in 0..source.vertex_count() {
            let stored = narrow(f(source.position(i))?).ok_or_else(|| KernelError::NonFinite {
                operation: "warp".to_string(),
                vertex: i,
            })?;
            mesh.vertices[i * 3..i * 3 + 3].copy_from_slice(&stored);
        }
        Ok(Self::from_buffers(mesh))
    }
}

/// Rotation matrix `Rz · Ry · Rx` for angles in degrees.
#[must_use]
pub fn euler_rotation(degrees: DVec3) -> DMat3 {
    let (sx, cx) = (sind(degrees.x), cosd(degrees.x));
    let (sy, cy) = (sind(degrees.y), cosd(degrees.y));
    let (sz, cz) = (sind(degrees.z), cosd(degrees.z));

    let rx = DMat3::from_cols(
        DVec3::new(1.0, 0.0, 0.0),
        DVec3::new(0.0, cx, sx),
        DVec3::new(0.0, -sx, cx),
    );
    let ry = DMat3::from_cols(
        DVec3::new(cy, 0.0, -sy),
        DVec3::new(0.0, 1.0, 0.0),
        DVec3::new(sy, 0.0, cy),
    );
    let rz = DMat3::from_cols(
        DVec3::new(cz, sz, 0.0),
        DVec3::new(-sz, cz, 0.0),
        DVec3::new(0.0, 0.0, 1.0),
    );
    rz * ry * rx
}

/// Sine of an angle in degrees, exact at multiples of 90°.
#[must_use]
pub fn sind(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    if d == 0.0 || d == 180.0 {
        0.0
    } else if d == 90.0 {
        1.0
    } else if d == 270.0 {
        -1.0
    } else {
        d.to_radians().sin()
    }
}

/// Cosine of an angle in degrees, exact at multiples of 90°.
#[must_use]
pub fn cosd(degrees: f64) -> f64 {
    sind(degrees + 90.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_cube() -> Manifold {
        Manifold::cube(DVec3::ONE, false)
    }

    #[test]
    fn test_exact_quarter_turns() {
        assert_eq!(sind(90.0), 1.0);
        assert_eq!(sind(-90.0), -1.0);
        assert_eq!(cosd(180.0), -1.0);
        assert_eq!(cosd(90.0), 0.0);
        assert_relative_eq!(sind(30.0), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_rotate_z_quarter_turn() {
        let rotated = unit_cube().rotate(DVec3::new(0.0, 0.0, 90.0)).unwrap();
        let bb = rotated.bounding_box().unwrap();
        assert_eq!(bb.min, DVec3::new(-1.0, 0.0, 0.0));
        assert_eq!(bb.max, DVec3::new(0.0, 1.0, 1.0));
    }

    #[test]
    fn test_rotation_order_is_x_then_z() {
        // +Y rotated 90° about X becomes +Z, which a Z rotation leaves alone.
        let m = euler_rotation(DVec3::new(90.0, 0.0, 90.0));
        let v = m * DVec3::Y;
        assert_relative_eq!(v.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_translate_preserves_volume() {
        let moved = unit_cube().translate(DVec3::new(5.0, -2.0, 1.0)).unwrap();
        assert_relative_eq!(moved.mesh().signed_volume(), 1.0, epsilon = 1e-6);
        assert_eq!(moved.bounding_box().unwrap().min, DVec3::new(5.0, -2.0, 1.0));
    }

    #[test]
    fn test_negative_scale_keeps_orientation() {
        let mirrored = unit_cube().scale(DVec3::new(-2.0, 1.0, 1.0)).unwrap();
        assert_relative_eq!(mirrored.mesh().signed_volume(), 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_mirror_across_x_plane() {
        let mirrored = unit_cube().mirror(DVec3::new(3.0, 0.0, 0.0)).unwrap();
        let bb = mirrored.bounding_box().unwrap();
        assert_eq!(bb.min.x, -1.0);
        assert_eq!(bb.max.x, 0.0);
        assert!(mirrored.mesh().signed_volume() > 0.0);
    }

    #[test]
    fn test_mirror_zero_normal_is_empty() {
        assert!(unit_cube().mirror(DVec3::ZERO).unwrap().is_empty());
    }

    #[test]
    fn test_shear_warp_preserves_volume() {
        let warped = unit_cube()
            .warp(|p| DVec3::new(p.x, p.y, p.z + p.x))
            .unwrap();
        assert_relative_eq!(warped.volume(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_warp_visits_each_vertex_once() {
        let cube = unit_cube();
        let mut calls = 0;
        cube.warp(|p| {
            calls += 1;
            p
        })
        .unwrap();
        assert_eq!(calls, cube.num_vert());
    }

    #[test]
    fn test_try_warp_aborts_on_first_error() {
        #[derive(Debug)]
        enum Failure {
            Kernel(KernelError),
            Host(&'static str),
        }
        impl From<KernelError> for Failure {
            fn from(e: KernelError) -> Self {
                Failure::Kernel(e)
            }
        }

        let mut calls = 0;
        let result = unit_cube().try_warp(|p| {
            calls += 1;
            if calls == 3 {
                Err(Failure::Host("boom"))
            } else {
                Ok(p)
            }
        });
        assert!(matches!(result, Err(Failure::Host("boom"))));
        assert_eq!(calls, 3);

        let result = unit_cube().try_warp(|_| Ok::<_, Failure>(DVec3::splat(f64::NAN)));
        assert!(matches!(result, Err(Failure::Kernel(KernelError::NonFinite { vertex: 0, .. }))));
    }

    #[test]
    fn test_warp_rejects_values_beyond_f32() {
        // finite as f64, infinite once stored
        let err = unit_cube().warp(|p| p * 1e300).unwrap_err();
        assert!(matches!(err, KernelError::NonFinite { ref operation, .. } if operation == "warp"));
    }

    #[test]
    fn test_translate_overflow_is_rejected() {
        let err = unit_cube().translate(DVec3::new(1e39, 0.0, 0.0)).unwrap_err();
        assert!(matches!(
            err,
            KernelError::NonFinite { ref operation, vertex: 0 } if operation == "transform"
        ));
        assert!(unit_cube().scale(DVec3::splat(f64::MAX)).is_err());
    }
}
