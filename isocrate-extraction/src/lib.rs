//! # isocrate Extraction
//!
//! Marching cubes isosurface extraction over byte density fields.
//!
//! One extraction pass produces three structures together: welded vertex and
//! index buffers for rendering, an adjacency map from grid edges to the
//! triangles welded on them, and a k-d tree over the triangles' centroids.

pub mod adjacency;
pub mod config;
pub mod density;
pub mod edge;
pub mod extractor;
pub mod geometry;
pub mod surface;
pub mod tables;
pub mod timing;
pub mod triangle;

// Re-export commonly used items
pub use adjacency::*;
pub use config::*;
pub use density::*;
pub use edge::*;
pub use extractor::*;
pub use geometry::*;
pub use surface::*;
pub use triangle::*;
