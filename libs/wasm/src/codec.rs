//! # Mesh Codec
//!
//! Host vertex and face lists to packed kernel buffers and back.
//!
//! Host faces use 1-based indices; kernel buffers are 0-based. Coordinates
//! are narrowed to single precision on the way in, so a decode followed by an
//! encode returns the narrowed positions exactly. Winding and vertex order
//! pass through unchanged.

use config::constants::BridgeConfig;
use csg_kernel::{Manifold, MeshBuffers};
use serde::{Deserialize, Serialize};

use crate::error::{CsgError, CsgResult};
use crate::value::HostPoint3;

/// Vertex as returned to the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

/// Triangle as returned to the host, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Face {
    /// First corner.
    pub i: u32,
    /// Second corner.
    pub j: u32,
    /// Third corner.
    pub k: u32,
}

/// Triangle as the host may spell it on input: `[i, j, k]` or `{i, j, k}`,
/// 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HostFace {
    /// `[i, j, k]`
    Array([f64; 3]),
    /// `{i, j, k}`
    Object {
        /// First corner.
        i: f64,
        /// Second corner.
        j: f64,
        /// Third corner.
        k: f64,
    },
}

impl HostFace {
    fn corners(&self) -> [f64; 3] {
        match *self {
            HostFace::Array(c) => c,
            HostFace::Object { i, j, k } => [i, j, k],
        }
    }
}

/// Boundary representation in host form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HostMesh {
    /// Vertex positions.
    pub verts: Vec<Vertex>,
    /// Triangles, 1-based.
    pub faces: Vec<Face>,
}

/// Copy a solid's boundary into host values. The empty solid yields empty
/// lists.
pub fn encode_mesh(solid: &Manifold) -> HostMesh {
    let mesh = solid.mesh();
    let verts = mesh
        .vertices
        .chunks_exact(3)
        .map(|v| Vertex {
            x: f64::from(v[0]),
            y: f64::from(v[1]),
            z: f64::from(v[2]),
        })
        .collect();
    let faces = mesh
        .indices
        .chunks_exact(3)
        .map(|t| Face {
            i: t[0] + 1,
            j: t[1] + 1,
            k: t[2] + 1,
        })
        .collect();
    HostMesh { verts, faces }
}

/// Validate host lists and build a solid from them.
///
/// Nothing is allocated for the kernel until every check has passed.
pub fn decode_mesh(
    verts: &[HostPoint3],
    faces: &[HostFace],
    config: &BridgeConfig,
) -> CsgResult<Manifold> {
    if verts.is_empty() {
        return Err(CsgError::InvalidMesh("vertex list is empty".to_string()));
    }
    if faces.is_empty() {
        return Err(CsgError::InvalidMesh("face list is empty".to_string()));
    }
    if verts.len() > config.max_vertices {
        return Err(CsgError::InvalidMesh(format!(
            "{} vertices exceeds the limit of {}",
            verts.len(),
            config.max_vertices
        )));
    }
    if faces.len() > config.max_triangles {
        return Err(CsgError::InvalidMesh(format!(
            "{} faces exceeds the limit of {}",
            faces.len(),
            config.max_triangles
        )));
    }

    let vertex_count = verts.len();
    let mut indices = Vec::with_capacity(faces.len() * 3);
    for (f, face) in faces.iter().enumerate() {
        for corner in face.corners() {
            indices.push(zero_based(corner, vertex_count).ok_or_else(|| {
                CsgError::InvalidMesh(format!(
                    "face {} references vertex {corner}, expected 1..={vertex_count}",
                    f + 1
                ))
            })?);
        }
    }

    let mut vertices = Vec::with_capacity(vertex_count * 3);
    for (v, point) in verts.iter().enumerate() {
        let coords = point.coords();
        if coords.iter().any(|c| !c.is_finite()) {
            return Err(CsgError::InvalidMesh(format!(
                "vertex {} has a non-finite coordinate",
                v + 1
            )));
        }
        vertices.extend(coords.map(|c| c as f32));
    }

    Ok(Manifold::from_mesh(MeshBuffers::from_parts(vertices, indices)?)?)
}

/// 1-based host index to 0-based, if it is an integer in range.
fn zero_based(index: f64, vertex_count: usize) -> Option<u32> {
    if index.fract() != 0.0 || index < 1.0 || index > vertex_count as f64 {
        return None;
    }
    u32::try_from(index as u64 - 1).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    fn parse<T: serde::de::DeserializeOwned>(json: &str) -> T {
        serde_json::from_str(json).unwrap()
    }

    fn tetra_lists() -> (Vec<HostPoint3>, Vec<HostFace>) {
        (
            parse("[[0,0,0],[1,0,0],[0,1,0],[0,0,1]]"),
            parse(r#"[[1,3,2],[1,2,4],{"i":2,"j":3,"k":4},[1,4,3]]"#),
        )
    }

    #[test]
    fn test_round_trip_preserves_positions_and_faces() {
        let (verts, faces) = tetra_lists();
        let solid = decode_mesh(&verts, &faces, &BridgeConfig::default()).unwrap();
        let host = encode_mesh(&solid);
        assert_eq!(host.verts.len(), 4);
        assert_eq!(host.faces.len(), 4);
        assert_eq!(host.verts[1], Vertex { x: 1.0, y: 0.0, z: 0.0 });
        assert_eq!(host.faces[0], Face { i: 1, j: 3, k: 2 });
        assert_eq!(host.faces[2], Face { i: 2, j: 3, k: 4 });
        assert!((solid.volume() - 1.0 / 6.0).abs() < 1e-9);
    }

    #[test]
    fn test_coordinates_narrow_to_single_precision() {
        let verts = vec![
            HostPoint3::Array([0.1, 0.0, 0.0]),
            HostPoint3::Array([1.0, 0.0, 0.0]),
            HostPoint3::Array([0.0, 1.0, 0.0]),
        ];
        let faces = vec![HostFace::Array([1.0, 2.0, 3.0])];
        let solid = decode_mesh(&verts, &faces, &BridgeConfig::default()).unwrap();
        let again = encode_mesh(&solid);
        assert_eq!(again.verts[0].x, f64::from(0.1_f32));
    }

    #[test]
    fn test_rejects_empty_lists() {
        let (verts, faces) = tetra_lists();
        let config = BridgeConfig::default();
        assert_eq!(decode_mesh(&[], &faces, &config).unwrap_err().kind(), "InvalidMesh");
        assert_eq!(decode_mesh(&verts, &[], &config).unwrap_err().kind(), "InvalidMesh");
    }

    #[test]
    fn test_rejects_out_of_range_and_fractional_indices() {
        let (verts, _) = tetra_lists();
        let config = BridgeConfig::default();
        for bad in ["[[0,1,2]]", "[[1,2,5]]", "[[1,2.5,3]]", "[[-1,2,3]]"] {
            let faces: Vec<HostFace> = parse(bad);
            let err = decode_mesh(&verts, &faces, &config).unwrap_err();
            assert_eq!(err.kind(), "InvalidMesh", "{bad}");
        }
    }

    #[test]
    fn test_rejects_non_finite_vertex() {
        let (mut verts, faces) = tetra_lists();
        verts[2] = HostPoint3::Object {
            x: 0.0,
            y: f64::NAN,
            z: 0.0,
        };
        let err = decode_mesh(&verts, &faces, &BridgeConfig::default()).unwrap_err();
        assert!(err.to_string().contains("vertex 3"));
    }

    #[test]
    fn test_respects_configured_limits() {
        let (verts, faces) = tetra_lists();
        let config = BridgeConfig::new(32, 16, 3, 100).unwrap();
        assert_eq!(decode_mesh(&verts, &faces, &config).unwrap_err().kind(), "InvalidMesh");
    }

    #[test]
    fn test_encode_empty_solid() {
        let host = encode_mesh(&Manifold::empty());
        assert!(host.verts.is_empty());
        assert!(host.faces.is_empty());
    }

    #[test]
    fn test_encoded_shape_is_objects() {
        let cube = Manifold::cube(DVec3::ONE, false);
        let json = serde_json::to_value(encode_mesh(&cube)).unwrap();
        assert_eq!(json["verts"].as_array().unwrap().len(), 8);
        assert_eq!(json["faces"][0]["i"], 1);
    }
}
