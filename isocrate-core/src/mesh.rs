//! Indexed triangle buffers produced by isosurface extraction

use crate::point::*;
use serde::{Deserialize, Serialize};

/// A triangle list over welded vertices.
///
/// `indices` holds one `u32` triple per triangle. The mesh is renderable only
/// when it holds at least one triangle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexedMesh {
    pub vertices: Vec<SurfaceVertex>,
    pub indices: Vec<u32>,
}

impl IndexedMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from vertex and index buffers
    pub fn from_buffers(vertices: Vec<SurfaceVertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether there is anything to draw
    pub fn is_renderable(&self) -> bool {
        self.triangle_count() > 0
    }

    /// Push a vertex and return its index
    pub fn add_vertex(&mut self, vertex: SurfaceVertex) -> u32 {
        let index = self.vertices.len() as u32;
        self.vertices.push(vertex);
        index
    }

    /// Iterate over triangles as index triples
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Calculate unit face normals from the winding order
    pub fn face_normals(&self) -> Vec<Vector3f> {
        self.triangles()
            .map(|[a, b, c]| {
                let v0 = self.vertices[a as usize].position();
                let v1 = self.vertices[b as usize].position();
                let v2 = self.vertices[c as usize].position();

                (v1 - v0)
                    .cross(&(v2 - v0))
                    .try_normalize(f32::EPSILON)
                    .unwrap_or_else(Vector3f::z)
            })
            .collect()
    }

    /// Vertex buffer contents as raw bytes
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer contents as raw bytes
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Clear the mesh
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }
}
