//! Core data structures and traits for isocrate
//!
//! This crate provides the fundamental types shared by the extraction and
//! spatial crates: math aliases, the GPU-ready surface vertex, indexed mesh
//! buffers, world transforms and the common error type.

pub mod point;
pub mod mesh;
pub mod traits;
pub mod transform;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use traits::*;
pub use transform::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};
