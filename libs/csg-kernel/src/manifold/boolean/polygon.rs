//! # Polygon Operations
//!
//! Polygon data structures and operations for BSP boolean operations.
//!
//! ## Contents
//!
//! - **Data structures**: `BspPolygon`, `Plane`, `PolygonClassification`
//! - **Split operations**: `split_polygon` for BSP tree construction
//! - **Merge operations**: `merge_coplanar_polygons` to undo fragmentation
//! - **Conversion**: `mesh_to_polygons`, `polygons_to_mesh`
//!
//! All polygons are convex; splitting and merging preserve convexity.

use std::collections::HashMap;

use config::constants::{PLANE_EPSILON, VERTEX_MERGE_EPSILON};
use glam::DVec3;

use crate::mesh::MeshBuffers;

// =============================================================================
// DATA STRUCTURES
// =============================================================================

/// Splitting plane `dot(normal, p) = w`. Points with `dot(normal, p) > w`
/// are in front.
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    /// Unit normal pointing to the front side.
    pub normal: DVec3,
    /// Offset along the normal.
    pub w: f64,
}

impl Plane {
    /// Plane of a polygon.
    pub fn from_polygon(poly: &BspPolygon) -> Self {
        Self {
            normal: poly.normal,
            w: poly.normal.dot(poly.vertices[0]),
        }
    }

    /// Signed distance of `p` from the plane.
    #[inline]
    pub fn distance(&self, p: DVec3) -> f64 {
        self.normal.dot(p) - self.w
    }
}

/// Convex polygon with a precomputed unit normal.
///
/// ## Invariants
///
/// - `vertices.len() >= 3`
/// - vertices are counter-clockwise when viewed from the side `normal` points to
#[derive(Debug, Clone)]
pub struct BspPolygon {
    /// Polygon vertices.
    pub vertices: Vec<DVec3>,
    /// Unit normal.
    pub normal: DVec3,
}

impl BspPolygon {
    /// Polygon from vertices, or `None` when they enclose no area.
    pub fn new(vertices: Vec<DVec3>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let normal = newell_normal(&vertices).try_normalize()?;
        Some(Self { vertices, normal })
    }

    /// Polygon with an explicit normal.
    pub fn with_normal(vertices: Vec<DVec3>, normal: DVec3) -> Self {
        Self { vertices, normal }
    }

    /// Average of the vertices.
    pub fn centroid(&self) -> DVec3 {
        self.vertices.iter().copied().sum::<DVec3>() / self.vertices.len() as f64
    }

    /// Reverse winding and normal.
    pub fn flip(&mut self) {
        self.vertices.reverse();
        self.normal = -self.normal;
    }
}

/// Area-weighted normal of a planar polygon.
fn newell_normal(vertices: &[DVec3]) -> DVec3 {
    let origin = vertices[0];
    vertices
        .windows(2)
        .skip(1)
        .map(|w| (w[0] - origin).cross(w[1] - origin))
        .sum()
}

/// Classification of a polygon relative to a splitting plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonClassification {
    /// All vertices on the plane.
    Coplanar,
    /// All vertices in front.
    Front,
    /// All vertices behind.
    Back,
    /// Vertices on both sides.
    Spanning,
}

// =============================================================================
// POLYGON SPLITTING
// =============================================================================

/// Classify and optionally split a polygon by a plane.
///
/// Returns `(classification, front_part, back_part)`; both parts are `None`
/// unless the polygon spans the plane.
pub fn split_polygon(
    poly: &BspPolygon,
    plane: &Plane,
) -> (PolygonClassification, Option<BspPolygon>, Option<BspPolygon>) {
    let sides: Vec<i8> = poly
        .vertices
        .iter()
        .map(|&v| {
            let d = plane.distance(v);
            if d < -PLANE_EPSILON {
                -1
            } else if d > PLANE_EPSILON {
                1
            } else {
                0
            }
        })
        .collect();
    let front_count = sides.iter().filter(|&&s| s > 0).count();
    let back_count = sides.iter().filter(|&&s| s < 0).count();

    match (front_count, back_count) {
        (0, 0) => return (PolygonClassification::Coplanar, None, None),
        (_, 0) => return (PolygonClassification::Front, None, None),
        (0, _) => return (PolygonClassification::Back, None, None),
        _ => {}
    }

    let n = poly.vertices.len();
    let mut front = Vec::with_capacity(n + 1);
    let mut back = Vec::with_capacity(n + 1);
    for i in 0..n {
        let j = (i + 1) % n;
        let (si, sj) = (sides[i], sides[j]);
        let (vi, vj) = (poly.vertices[i], poly.vertices[j]);

        if si >= 0 {
            front.push(vi);
        }
        if si <= 0 {
            back.push(vi);
        }
        if si * sj < 0 {
            let (di, dj) = (plane.distance(vi), plane.distance(vj));
            let t = di / (di - dj);
            let cut = vi + (vj - vi) * t;
            front.push(cut);
            back.push(cut);
        }
    }

    let part = |verts: Vec<DVec3>| {
        (verts.len() >= 3).then(|| BspPolygon::with_normal(verts, poly.normal))
    };
    (PolygonClassification::Spanning, part(front), part(back))
}

// =============================================================================
// POLYGON MERGING
// =============================================================================

/// Merge coplanar polygons that share an edge when the union stays convex.
pub fn merge_coplanar_polygons(polygons: Vec<BspPolygon>) -> Vec<BspPolygon> {
    let mut groups: HashMap<[i64; 4], Vec<BspPolygon>> = HashMap::new();
    let mut order = Vec::new();
    for poly in polygons {
        let key = plane_key(&poly);
        let group = groups.entry(key).or_default();
        if group.is_empty() {
            order.push(key);
        }
        group.push(poly);
    }

    order
        .into_iter()
        .filter_map(|key| groups.remove(&key))
        .flat_map(merge_polygon_group)
        .collect()
}

/// Quantized plane key for grouping coplanar polygons.
fn plane_key(poly: &BspPolygon) -> [i64; 4] {
    let n = poly.normal;
    let d = n.dot(poly.vertices[0]);
    [
        (n.x * 1e4).round() as i64,
        (n.y * 1e4).round() as i64,
        (n.z * 1e4).round() as i64,
        (d * 1e4).round() as i64,
    ]
}

fn merge_polygon_group(mut group: Vec<BspPolygon>) -> Vec<BspPolygon> {
    let mut merged = true;
    while merged {
        merged = false;
        let mut next: Vec<BspPolygon> = Vec::with_capacity(group.len());
        for poly in group {
            let mut current = poly;
            let mut i = 0;
            while i < next.len() {
                if let Some(m) = try_merge_polygons(&next[i], &current) {
                    next.swap_remove(i);
                    current = m;
                    merged = true;
                    i = 0;
                } else {
                    i += 1;
                }
            }
            next.push(current);
        }
        group = next;
    }
    group
}

/// Merge two polygons sharing an edge (in opposite directions), if the
/// result is convex.
fn try_merge_polygons(p1: &BspPolygon, p2: &BspPolygon) -> Option<BspPolygon> {
    let n1 = p1.vertices.len();
    let n2 = p2.vertices.len();
    for i in 0..n1 {
        let a1 = p1.vertices[i];
        let b1 = p1.vertices[(i + 1) % n1];
        for j in 0..n2 {
            let a2 = p2.vertices[j];
            let b2 = p2.vertices[(j + 1) % n2];
            if same_point(a1, b2) && same_point(b1, a2) {
                let mut merged = Vec::with_capacity(n1 + n2 - 2);
                // p1 from b1 around to a1, then p2 strictly between a1(=b2) and b1(=a2)
                for k in 0..n1 {
                    merged.push(p1.vertices[(i + 1 + k) % n1]);
                }
                for k in 1..n2 - 1 {
                    merged.push(p2.vertices[(j + 1 + k) % n2]);
                }
                let cleaned = remove_collinear_vertices(&merged);
                if cleaned.len() >= 3 && is_convex(&cleaned, p1.normal) {
                    return Some(BspPolygon::with_normal(cleaned, p1.normal));
                }
                return None;
            }
        }
    }
    None
}

fn same_point(a: DVec3, b: DVec3) -> bool {
    a.distance_squared(b) < VERTEX_MERGE_EPSILON * VERTEX_MERGE_EPSILON
}

fn remove_collinear_vertices(vertices: &[DVec3]) -> Vec<DVec3> {
    let n = vertices.len();
    (0..n)
        .filter(|&i| {
            let prev = vertices[(i + n - 1) % n];
            let curr = vertices[i];
            let next = vertices[(i + 1) % n];
            let (e1, e2) = (curr - prev, next - curr);
            let scale = e1.length() * e2.length();
            scale > 0.0 && e1.cross(e2).length() / scale > 1e-9
        })
        .map(|i| vertices[i])
        .collect()
}

fn is_convex(vertices: &[DVec3], normal: DVec3) -> bool {
    let n = vertices.len();
    (0..n).all(|i| {
        let prev = vertices[(i + n - 1) % n];
        let curr = vertices[i];
        let next = vertices[(i + 1) % n];
        (curr - prev).cross(next - curr).dot(normal) > 0.0
    })
}

// =============================================================================
// MESH CONVERSION
// =============================================================================

/// Convert mesh triangles to polygons, skipping zero-area triangles.
pub fn mesh_to_polygons(mesh: &MeshBuffers) -> Vec<BspPolygon> {
    (0..mesh.triangle_count())
        .filter_map(|t| BspPolygon::new(mesh.triangle(t).to_vec()))
        .collect()
}

/// Convert polygons back to a mesh: merge, fan-triangulate, weld.
pub fn polygons_to_mesh(polygons: Vec<BspPolygon>) -> MeshBuffers {
    let merged = merge_coplanar_polygons(polygons);
    let mut mesh = MeshBuffers::new();
    let mut welder = VertexWelder::new();

    for poly in &merged {
        let idx: Vec<u32> = poly
            .vertices
            .iter()
            .map(|&v| welder.add(&mut mesh, v))
            .collect();
        for k in 1..idx.len() - 1 {
            let (a, b, c) = (idx[0], idx[k], idx[k + 1]);
            if a != b && b != c && a != c {
                mesh.add_triangle(a, b, c);
            }
        }
    }
    mesh
}

// =============================================================================
// VERTEX WELDING
// =============================================================================

/// Deduplicates vertices by quantized position so output triangles share
/// vertices along common edges.
#[derive(Debug, Default)]
pub struct VertexWelder {
    cache: HashMap<[i64; 3], u32>,
}

impl VertexWelder {
    /// Create an empty welder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the vertex at `pos`, appending it to `mesh` if new.
    pub fn add(&mut self, mesh: &mut MeshBuffers, pos: DVec3) -> u32 {
        let q = (pos / VERTEX_MERGE_EPSILON).round();
        let key = [q.x as i64, q.y as i64, q.z as i64];
        *self.cache.entry(key).or_insert_with(|| mesh.add_vertex(pos))
    }
}
