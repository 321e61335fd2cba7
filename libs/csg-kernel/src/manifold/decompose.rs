//! Connected components.
//!
//! Triangles are connected when they share a vertex position. Positions are
//! compared bit-for-bit, so meshes with duplicated (unwelded) vertices still
//! decompose by geometry rather than by index.
//!
//! An inside-out shell (a cavity) is not a part of its own: it stays with the
//! smallest outward shell that encloses it, so a hollow solid decomposes to
//! one part whose volume excludes the cavity.

use std::collections::HashMap;

use super::boolean::geometry::SolidClassifier;
use super::Manifold;
use crate::mesh::MeshBuffers;

impl Manifold {
    /// Split into connected components, ordered by their first triangle.
    ///
    /// A connected solid yields a single component equal to a copy of
    /// itself; the empty solid yields no components.
    #[must_use]
    pub fn decompose(&self) -> Vec<Manifold> {
        let mesh = self.mesh();
        if mesh.is_empty() {
            return Vec::new();
        }

        // Map every vertex to a canonical vertex at the same position.
        let mut canonical_of: HashMap<[u32; 3], usize> = HashMap::new();
        let canonical: Vec<usize> = mesh
            .vertices
            .chunks_exact(3)
            .enumerate()
            .map(|(i, v)| {
                *canonical_of
                    .entry([v[0].to_bits(), v[1].to_bits(), v[2].to_bits()])
                    .or_insert(i)
            })
            .collect();

        let mut sets = DisjointSet::new(mesh.vertex_count());
        for tri in mesh.indices.chunks_exact(3) {
            let a = canonical[tri[0] as usize];
            sets.union(a, canonical[tri[1] as usize]);
            sets.union(a, canonical[tri[2] as usize]);
        }

        let mut component_of_root: HashMap<usize, usize> = HashMap::new();
        let mut shells: Vec<(MeshBuffers, HashMap<u32, u32>)> = Vec::new();
        for tri in mesh.indices.chunks_exact(3) {
            let root = sets.find(canonical[tri[0] as usize]);
            let part = *component_of_root.entry(root).or_insert_with(|| {
                shells.push((MeshBuffers::new(), HashMap::new()));
                shells.len() - 1
            });
            let (out, remap) = &mut shells[part];
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|v| {
                *remap
                    .entry(v)
                    .or_insert_with(|| out.add_vertex(mesh.position(v as usize)))
            });
            out.add_triangle(a, b, c);
        }

        if shells.len() == 1 {
            return vec![self.clone()];
        }
        let shells: Vec<MeshBuffers> = shells.into_iter().map(|(m, _)| m).collect();
        group_cavities(shells)
            .into_iter()
            .map(Manifold::from_buffers)
            .collect()
    }
}

/// Fold every inside-out shell into the smallest outward shell containing
/// it. A cavity with no enclosing shell is kept as a part of its own.
fn group_cavities(shells: Vec<MeshBuffers>) -> Vec<MeshBuffers> {
    let volumes: Vec<f64> = shells.iter().map(MeshBuffers::signed_volume).collect();
    if volumes.iter().all(|v| *v >= 0.0) {
        return shells;
    }
    let outer: Vec<(usize, SolidClassifier)> = (0..shells.len())
        .filter(|&i| volumes[i] > 0.0)
        .map(|i| (i, SolidClassifier::new(&shells[i])))
        .collect();

    let mut owner: Vec<usize> = (0..shells.len()).collect();
    for cavity in (0..shells.len()).filter(|&i| volumes[i] < 0.0) {
        // any vertex of a cavity lies strictly inside its enclosing shell
        let inside = shells[cavity].position(0);
        if let Some((enclosing, _)) = outer
            .iter()
            .filter(|(_, classifier)| classifier.contains(inside))
            .min_by(|(a, _), (b, _)| volumes[*a].total_cmp(&volumes[*b]))
        {
            owner[cavity] = *enclosing;
        }
    }

    let mut merged: Vec<Option<MeshBuffers>> = shells.into_iter().map(Some).collect();
    for cavity in 0..merged.len() {
        if owner[cavity] == cavity {
            continue;
        }
        let Some(inner) = merged[cavity].take() else {
            continue;
        };
        if let Some(target) = merged[owner[cavity]].as_mut() {
            target.merge(&inner);
        }
    }
    merged.into_iter().flatten().collect()
}

/// Union-find with path halving.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[rb] = ra;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DVec3;

    #[test]
    fn test_single_component() {
        let cube = Manifold::cube(DVec3::ONE, false);
        let parts = cube.decompose();
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0], cube);
    }

    #[test]
    fn test_two_disjoint_cubes() {
        let a = Manifold::cube(DVec3::ONE, false);
        let b = Manifold::cube(DVec3::splat(2.0), false).translate(DVec3::new(5.0, 0.0, 0.0)).unwrap();
        let both = a.union(&b).unwrap();
        let parts = both.decompose();
        assert_eq!(parts.len(), 2);
        assert_relative_eq!(parts[0].volume(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(parts[1].volume(), 8.0, epsilon = 1e-6);
        assert_eq!(parts[1].num_vert(), 8);
    }

    #[test]
    fn test_unwelded_vertices_still_connect() {
        // same cube with every triangle owning its own three vertices
        let cube = Manifold::cube(DVec3::ONE, false);
        let mut soup = MeshBuffers::new();
        for t in 0..cube.num_tri() {
            let [a, b, c] = cube.mesh().triangle(t).map(|p| soup.add_vertex(p));
            soup.add_triangle(a, b, c);
        }
        let parts = Manifold::from_mesh(soup).unwrap().decompose();
        assert_eq!(parts.len(), 1);
    }

    #[test]
    fn test_empty_has_no_components() {
        assert!(Manifold::empty().decompose().is_empty());
    }

    #[test]
    fn test_hollow_cube_is_one_part() {
        let outer = Manifold::cube(DVec3::splat(3.0), true);
        let inner = Manifold::cube(DVec3::ONE, true);
        let hollow = outer.difference(&inner).unwrap();
        let parts = hollow.decompose();
        assert_eq!(parts.len(), 1);
        assert_relative_eq!(parts[0].volume(), 26.0, epsilon = 1e-6);
        assert_relative_eq!(parts[0].volume(), hollow.volume(), epsilon = 1e-9);
    }

    #[test]
    fn test_solid_inside_cavity_is_separate() {
        let outer = Manifold::cube(DVec3::splat(5.0), true);
        let cavity = Manifold::cube(DVec3::splat(3.0), true);
        let core = Manifold::cube(DVec3::ONE, true);
        let nested = outer.difference(&cavity).unwrap().union(&core).unwrap();
        let mut volumes: Vec<f64> = nested.decompose().iter().map(Manifold::volume).collect();
        volumes.sort_by(f64::total_cmp);
        assert_eq!(volumes.len(), 2);
        assert_relative_eq!(volumes[0], 1.0, epsilon = 1e-6);
        assert_relative_eq!(volumes[1], 125.0 - 27.0, epsilon = 1e-6);
    }
}
