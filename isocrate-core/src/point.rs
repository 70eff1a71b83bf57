//! Point types and the surface vertex layout

use bytemuck::{Pod, Zeroable};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// A mesh vertex as handed to the rendering side: position followed by normal.
///
/// The layout is `#[repr(C)]` and `Pod`, so a `&[SurfaceVertex]` can be cast
/// straight to bytes for a vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
#[repr(C)]
pub struct SurfaceVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl SurfaceVertex {
    /// Create a vertex from a position and a normal
    pub fn new(position: Point3f, normal: Vector3f) -> Self {
        Self {
            position: [position.x, position.y, position.z],
            normal: [normal.x, normal.y, normal.z],
        }
    }

    /// Vertex position as a point
    pub fn position(&self) -> Point3f {
        Point3f::new(self.position[0], self.position[1], self.position[2])
    }

    /// Vertex normal as a vector
    pub fn normal(&self) -> Vector3f {
        Vector3f::new(self.normal[0], self.normal[1], self.normal[2])
    }
}

impl Default for SurfaceVertex {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            normal: [0.0, 0.0, 1.0],
        }
    }
}
