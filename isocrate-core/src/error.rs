//! Error types for isocrate

use thiserror::Error;

/// Main error type for isocrate operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error(
        "Invalid region: origin {origin:?} with size {size:?} exceeds field dimensions {dimensions:?}"
    )]
    InvalidRegion {
        origin: [usize; 3],
        size: [usize; 3],
        dimensions: [usize; 3],
    },

    #[error("Sample ({x}, {y}, {z}) out of bounds for dimensions {dimensions:?}")]
    OutOfBounds {
        x: usize,
        y: usize,
        z: usize,
        dimensions: [usize; 3],
    },
}

/// Result type alias for isocrate operations
pub type Result<T> = std::result::Result<T, Error>;
