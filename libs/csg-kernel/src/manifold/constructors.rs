//! # Primitive Constructors
//!
//! Cube, cylinder (and cone), sphere and tetrahedron. Every constructor emits
//! shared vertices with outward counter-clockwise winding. Degenerate
//! parameters (non-positive sizes or radii) produce the empty solid.

use std::f64::consts::TAU;

use config::constants::{MAX_SEGMENTS, MIN_SEGMENTS};
use glam::DVec3;

use super::Manifold;
use crate::mesh::MeshBuffers;

/// Corner `i` of the unit cube has coordinates `(i & 1, (i >> 1) & 1, (i >> 2) & 1)`.
const CUBE_TRIANGLES: [[u32; 3]; 12] = [
    [0, 2, 3],
    [0, 3, 1],
    [4, 5, 7],
    [4, 7, 6],
    [0, 1, 5],
    [0, 5, 4],
    [2, 6, 7],
    [2, 7, 3],
    [0, 4, 6],
    [0, 6, 2],
    [1, 3, 7],
    [1, 7, 5],
];

impl Manifold {
    /// Axis-aligned box with extents `size`, cornered at the origin or
    /// centered on it.
    #[must_use]
    pub fn cube(size: DVec3, center: bool) -> Self {
        if !size.is_finite() || size.cmple(DVec3::ZERO).any() {
            return Self::empty();
        }
        let offset = if center { size * 0.5 } else { DVec3::ZERO };

        let mut mesh = MeshBuffers::with_capacity(8, 12);
        for i in 0..8u32 {
            let unit = DVec3::new(
                f64::from(i & 1),
                f64::from((i >> 1) & 1),
                f64::from((i >> 2) & 1),
            );
            mesh.add_vertex(unit * size - offset);
        }
        for [a, b, c] in CUBE_TRIANGLES {
            mesh.add_triangle(a, b, c);
        }
        Self::from_buffers(mesh)
    }

    /// Cylinder along +Z. A zero radius at either end produces a cone with
    /// an apex vertex there.
    #[must_use]
    pub fn cylinder(
        height: f64,
        radius_low: f64,
        radius_high: f64,
        segments: u32,
        center: bool,
    ) -> Self {
        let valid = height.is_finite() && radius_low.is_finite() && radius_high.is_finite();
        if !valid
            || height <= 0.0
            || radius_low < 0.0
            || radius_high < 0.0
            || (radius_low == 0.0 && radius_high == 0.0)
        {
            return Self::empty();
        }
        let n = segments.clamp(MIN_SEGMENTS, MAX_SEGMENTS);
        let z0 = if center { -height / 2.0 } else { 0.0 };
        let z1 = z0 + height;

        let mut mesh = MeshBuffers::with_capacity(2 * n as usize, 4 * n as usize);
        let bottom = add_ring(&mut mesh, radius_low, z0, n);
        let top = add_ring(&mut mesh, radius_high, z1, n);

        for i in 0..n as usize {
            let j = (i + 1) % n as usize;
            match (&bottom, &top) {
                (Ring::Apex(b), Ring::Loop(t)) => mesh.add_triangle(*b, t[j], t[i]),
                (Ring::Loop(b), Ring::Apex(t)) => mesh.add_triangle(b[i], b[j], *t),
                (Ring::Loop(b), Ring::Loop(t)) => {
                    mesh.add_triangle(b[i], b[j], t[j]);
                    mesh.add_triangle(b[i], t[j], t[i]);
                }
                (Ring::Apex(_), Ring::Apex(_)) => {}
            }
        }
        if let Ring::Loop(b) = &bottom {
            for i in 1..b.len() - 1 {
                mesh.add_triangle(b[0], b[i + 1], b[i]);
            }
        }
        if let Ring::Loop(t) = &top {
            for i in 1..t.len() - 1 {
                mesh.add_triangle(t[0], t[i], t[i + 1]);
            }
        }
        Self::from_buffers(mesh)
    }

    /// Sphere centered on the origin.
    ///
    /// Uses `segments` divisions around and `segments / 2` latitude rings
    /// offset half a step from the poles, with flat polygonal caps.
    #[must_use]
    pub fn sphere(radius: f64, segments: u32) -> Self {
        if !radius.is_finite() || radius <= 0.0 {
            return Self::empty();
        }
        let n = segments.clamp(MIN_SEGMENTS, MAX_SEGMENTS) as usize;
        let num_rings = ((n + 1) / 2).max(2);

        let mut mesh = MeshBuffers::with_capacity(n * num_rings, 2 * n * num_rings);
        let rings: Vec<Vec<u32>> = (0..num_rings)
            .map(|ring| {
                let phi = std::f64::consts::PI * (ring as f64 + 0.5) / num_rings as f64;
                let (ring_radius, z) = (radius * phi.sin(), radius * phi.cos());
                (0..n)
                    .map(|seg| {
                        let theta = TAU * seg as f64 / n as f64;
                        mesh.add_vertex(DVec3::new(
                            ring_radius * theta.cos(),
                            ring_radius * theta.sin(),
                            z,
                        ))
                    })
                    .collect()
            })
            .collect();

        let first = &rings[0];
        for i in 1..n - 1 {
            mesh.add_triangle(first[0], first[i], first[i + 1]);
        }
        for pair in rings.windows(2) {
            let (upper, lower) = (&pair[0], &pair[1]);
            for i in 0..n {
                let j = (i + 1) % n;
                mesh.add_triangle(upper[i], lower[i], lower[j]);
                mesh.add_triangle(upper[i], lower[j], upper[j]);
            }
        }
        let last = &rings[num_rings - 1];
        for i in 1..n - 1 {
            mesh.add_triangle(last[0], last[i + 1], last[i]);
        }
        Self::from_buffers(mesh)
    }

    /// Regular tetrahedron inscribed in the cube `[-1, 1]³`.
    #[must_use]
    pub fn tetrahedron() -> Self {
        let mut mesh = MeshBuffers::with_capacity(4, 4);
        for p in [
            DVec3::new(1.0, 1.0, 1.0),
            DVec3::new(-1.0, -1.0, 1.0),
            DVec3::new(1.0, -1.0, -1.0),
            DVec3::new(-1.0, 1.0, -1.0),
        ] {
            mesh.add_vertex(p);
        }
        mesh.add_triangle(2, 0, 1);
        mesh.add_triangle(0, 3, 1);
        mesh.add_triangle(2, 3, 0);
        mesh.add_triangle(3, 2, 1);
        Self::from_buffers(mesh)
    }
}

/// One end of a cylinder: a ring of vertices, or a single apex.
enum Ring {
    Loop(Vec<u32>),
    Apex(u32),
}

fn add_ring(mesh: &mut MeshBuffers, radius: f64, z: f64, n: u32) -> Ring {
    if radius == 0.0 {
        return Ring::Apex(mesh.add_vertex(DVec3::new(0.0, 0.0, z)));
    }
    Ring::Loop(
        (0..n)
            .map(|i| {
                let theta = TAU * f64::from(i) / f64::from(n);
                mesh.add_vertex(DVec3::new(radius * theta.cos(), radius * theta.sin(), z))
            })
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_cube_volume_and_area() {
        let cube = Manifold::cube(DVec3::splat(2.0), true);
        assert_eq!(cube.num_vert(), 8);
        assert_eq!(cube.num_tri(), 12);
        assert_relative_eq!(cube.mesh().signed_volume(), 8.0, epsilon = 1e-9);
        assert_relative_eq!(cube.surface_area(), 24.0, epsilon = 1e-9);
    }

    #[test]
    fn test_cube_centering() {
        let bb = Manifold::cube(DVec3::new(2.0, 4.0, 6.0), true)
            .bounding_box()
            .unwrap();
        assert_eq!(bb.min, DVec3::new(-1.0, -2.0, -3.0));
        let bb = Manifold::cube(DVec3::new(2.0, 4.0, 6.0), false)
            .bounding_box()
            .unwrap();
        assert_eq!(bb.min, DVec3::ZERO);
    }

    #[test]
    fn test_degenerate_cube_is_empty() {
        assert!(Manifold::cube(DVec3::new(1.0, 0.0, 1.0), false).is_empty());
        assert!(Manifold::cube(DVec3::new(1.0, -1.0, 1.0), false).is_empty());
    }

    #[test]
    fn test_cylinder_volume_approaches_exact() {
        let cyl = Manifold::cylinder(2.0, 1.0, 1.0, 64, false);
        let exact = PI * 2.0;
        assert!(cyl.mesh().signed_volume() > 0.0);
        assert!((cyl.volume() - exact).abs() / exact < 0.01);
    }

    #[test]
    fn test_cone_has_apex() {
        let cone = Manifold::cylinder(3.0, 1.0, 0.0, 16, false);
        assert_eq!(cone.num_vert(), 17);
        assert!(cone.mesh().signed_volume() > 0.0);
        let inverted = Manifold::cylinder(3.0, 0.0, 1.0, 16, true);
        assert!(inverted.mesh().signed_volume() > 0.0);
        assert_relative_eq!(cone.volume(), inverted.volume(), epsilon = 1e-6);
    }

    #[test]
    fn test_cylinder_segments_coerced() {
        let cyl = Manifold::cylinder(1.0, 1.0, 1.0, 1, false);
        assert_eq!(cyl.num_vert(), 6);
    }

    #[test]
    fn test_sphere_volume_within_one_percent() {
        let sphere = Manifold::sphere(1.0, 64);
        let exact = 4.0 / 3.0 * PI;
        assert!(sphere.mesh().signed_volume() > 0.0);
        assert!((sphere.volume() - exact).abs() / exact < 0.01);
    }

    #[test]
    fn test_tetrahedron_volume() {
        let tet = Manifold::tetrahedron();
        assert_relative_eq!(tet.mesh().signed_volume(), 8.0 / 3.0, epsilon = 1e-9);
    }
}
