//! Binary STL encoding.
//!
//! Layout:
//! - 80 bytes: header
//! - 4 bytes: u32 LE triangle count
//! - Per triangle (50 bytes each):
//!   - 12 bytes: facet normal (3 × f32 LE)
//!   - 36 bytes: 3 vertices (3 × 3 × f32 LE)
//!   - 2 bytes: attribute byte count (0u16)

use crate::mesh::MeshBuffers;

const HEADER: &[u8] = b"csg-kernel binary STL";
const HEADER_LEN: usize = 80;
const RECORD_LEN: usize = 50;

/// Encode a mesh as binary STL.
///
/// ```rust
/// use csg_kernel::{export::to_stl_binary, Manifold};
/// use glam::DVec3;
///
/// let cube = Manifold::cube(DVec3::ONE, false);
/// let bytes = to_stl_binary(cube.mesh());
/// assert_eq!(bytes.len(), 84 + 12 * 50);
/// ```
#[must_use]
pub fn to_stl_binary(mesh: &MeshBuffers) -> Vec<u8> {
    let tri_count = mesh.triangle_count();
    let mut buf = Vec::with_capacity(HEADER_LEN + 4 + tri_count * RECORD_LEN);

    buf.extend_from_slice(HEADER);
    buf.resize(HEADER_LEN, 0);
    buf.extend_from_slice(&(tri_count as u32).to_le_bytes());

    for t in 0..tri_count {
        let [a, b, c] = mesh.triangle(t);
        let normal = (b - a).cross(c - a).normalize_or_zero();

        for component in normal.to_array() {
            buf.extend_from_slice(&(component as f32).to_le_bytes());
        }
        for corner in &mesh.indices[t * 3..t * 3 + 3] {
            let i = *corner as usize * 3;
            for component in &mesh.vertices[i..i + 3] {
                buf.extend_from_slice(&component.to_le_bytes());
            }
        }
        buf.extend_from_slice(&0u16.to_le_bytes());
    }

    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn test_empty_mesh_is_header_only() {
        let bytes = to_stl_binary(&MeshBuffers::new());
        assert_eq!(bytes.len(), 84);
        assert_eq!(&bytes[80..84], &0u32.to_le_bytes());
    }

    #[test]
    fn test_single_triangle_record() {
        let mut mesh = MeshBuffers::new();
        let a = mesh.add_vertex(DVec3::ZERO);
        let b = mesh.add_vertex(DVec3::X);
        let c = mesh.add_vertex(DVec3::Y);
        mesh.add_triangle(a, b, c);

        let bytes = to_stl_binary(&mesh);
        assert_eq!(bytes.len(), 84 + 50);
        assert!(bytes.starts_with(HEADER));

        let nz = f32::from_le_bytes([bytes[92], bytes[93], bytes[94], bytes[95]]);
        assert_eq!(nz, 1.0);
        // second vertex x coordinate
        let bx = f32::from_le_bytes([bytes[108], bytes[109], bytes[110], bytes[111]]);
        assert_eq!(bx, 1.0);
    }
}
