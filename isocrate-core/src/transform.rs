//! World transforms applied to extracted triangles

use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// A homogeneous 4x4 transform from object space into the query frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform3D {
    pub matrix: Matrix4<f32>,
}

impl Transform3D {
    /// Create an identity transformation
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
        }
    }

    /// Create a translation transformation
    pub fn translation(offset: Vector3<f32>) -> Self {
        Self {
            matrix: Matrix4::new_translation(&offset),
        }
    }

    /// Create a rotation transformation from a quaternion
    pub fn rotation(rotation: UnitQuaternion<f32>) -> Self {
        Self {
            matrix: rotation.to_homogeneous(),
        }
    }

    /// Create a uniform scaling transformation
    pub fn uniform_scaling(scale: f32) -> Self {
        Self {
            matrix: Matrix4::new_scaling(scale),
        }
    }

    /// Map a point; a degenerate projective row leaves it unchanged
    pub fn transform_point(&self, point: &Point3<f32>) -> Point3<f32> {
        let homogeneous = self.matrix * point.to_homogeneous();
        Point3::from_homogeneous(homogeneous).unwrap_or(*point)
    }

    /// Apply `self` first, then `next`
    pub fn then(self, next: Self) -> Self {
        Self {
            matrix: next.matrix * self.matrix,
        }
    }

    /// Check if this is approximately the identity transformation
    pub fn is_identity(&self, epsilon: f32) -> bool {
        (self.matrix - Matrix4::identity()).norm() < epsilon
    }
}

impl Default for Transform3D {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Matrix4<f32>> for Transform3D {
    fn from(matrix: Matrix4<f32>) -> Self {
        Self { matrix }
    }
}
