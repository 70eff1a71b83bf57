//! Canonical keys for grid edges
//!
//! Every sample point owns the three edges leaving it towards +x, +y and +z,
//! so an edge is named by its lower endpoint and its axis. Two cells sharing a
//! physical edge therefore compute the same key, which is what vertex welding
//! and the adjacency map rely on.

use crate::tables::{CORNER_OFFSETS, EDGE_AXIS, EDGE_CORNERS};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of one edge of the global sample grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(u64);

impl EdgeId {
    /// Edge leaving sample `origin` along `axis` in a field of `dimensions`
    pub fn new(dimensions: [usize; 3], origin: [usize; 3], axis: usize) -> Self {
        debug_assert!(axis < 3);
        let linear = origin[0] + dimensions[0] * (origin[1] + dimensions[1] * origin[2]);
        Self(linear as u64 * 3 + axis as u64)
    }

    /// Key of cube edge `cube_edge` (0..12) of the cell whose lowest corner is `cell`
    pub fn from_cell(dimensions: [usize; 3], cell: [usize; 3], cube_edge: usize) -> Self {
        let offset = CORNER_OFFSETS[EDGE_CORNERS[cube_edge][0]];
        let origin = [cell[0] + offset[0], cell[1] + offset[1], cell[2] + offset[2]];
        Self::new(dimensions, origin, EDGE_AXIS[cube_edge])
    }

    /// Raw key value
    pub fn value(self) -> u64 {
        self.0
    }

    /// Axis the edge runs along
    pub fn axis(self) -> usize {
        (self.0 % 3) as usize
    }

    /// Lower endpoint of the edge
    pub fn origin(self, dimensions: [usize; 3]) -> [usize; 3] {
        let linear = (self.0 / 3) as usize;
        let plane = dimensions[0] * dimensions[1];
        [
            linear % dimensions[0],
            (linear % plane) / dimensions[0],
            linear / plane,
        ]
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge#{}", self.0)
    }
}
