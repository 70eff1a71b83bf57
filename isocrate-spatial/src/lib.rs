//! # isocrate Spatial
//!
//! A generic k-d tree over arbitrary elements.
//!
//! The tree knows nothing about geometry: callers supply an [`AxisCompare`]
//! that orders two elements along a numbered axis, and the tree partitions its
//! backing collection by the median along cycling axes. There is no query API
//! beyond structural traversal; callers walk the nodes with the same
//! comparator semantics they built with.

pub mod compare;
pub mod spatial_tree;

// Re-export commonly used items
pub use compare::*;
pub use spatial_tree::*;
