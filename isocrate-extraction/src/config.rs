//! Extraction parameters

use crate::density::DensityField;
use isocrate_core::{Error, Result, Transform3D};
use serde::{Deserialize, Serialize};

/// A box of cells: `size` cells starting at cell `origin`.
///
/// Cell `(x, y, z)` spans samples `x..=x+1` (and likewise on y and z), so a
/// region fits a field when `origin + size < dimensions` on every axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub origin: [usize; 3],
    pub size: [usize; 3],
}

impl Region {
    pub fn new(origin: [usize; 3], size: [usize; 3]) -> Self {
        Self { origin, size }
    }

    /// Every cell of `field`
    pub fn whole(field: &DensityField) -> Self {
        Self {
            origin: [0; 3],
            size: field.cell_dimensions(),
        }
    }

    /// Total number of cells
    pub fn cell_count(&self) -> usize {
        self.size.iter().product()
    }

    /// Whether the region stays inside a field of `dimensions`
    pub fn fits(&self, dimensions: [usize; 3]) -> bool {
        (0..3).all(|axis| {
            self.origin[axis]
                .checked_add(self.size[axis])
                .is_some_and(|end| end < dimensions[axis])
        })
    }

    /// Cells along one axis
    pub(crate) fn range(&self, axis: usize) -> std::ops::Range<usize> {
        self.origin[axis]..self.origin[axis] + self.size[axis]
    }
}

/// Configuration for one extraction pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Density threshold; samples above it are inside
    pub iso_value: u8,
    /// Cells to process, `None` for the whole field
    pub region: Option<Region>,
    /// Grid units to object space
    pub cell_scale: f32,
    /// Object space to the frame used by the adjacency map and spatial tree
    pub world_transform: Transform3D,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            iso_value: 127,
            region: None,
            cell_scale: 1.0,
            world_transform: Transform3D::identity(),
        }
    }
}

impl ExtractionConfig {
    pub fn new(iso_value: u8) -> Self {
        Self {
            iso_value,
            ..Default::default()
        }
    }

    pub fn with_iso_value(mut self, iso_value: u8) -> Self {
        self.iso_value = iso_value;
        self
    }

    pub fn with_region(mut self, origin: [usize; 3], size: [usize; 3]) -> Self {
        self.region = Some(Region::new(origin, size));
        self
    }

    pub fn with_cell_scale(mut self, cell_scale: f32) -> Self {
        self.cell_scale = cell_scale;
        self
    }

    pub fn with_world_transform(mut self, world_transform: Transform3D) -> Self {
        self.world_transform = world_transform;
        self
    }

    /// Check the parameters against `field` and return the region to walk
    pub fn resolve_region(&self, field: &DensityField) -> Result<Region> {
        if !(self.cell_scale.is_finite() && self.cell_scale > 0.0) {
            return Err(Error::InvalidData(format!(
                "Cell scale must be positive and finite, got {}",
                self.cell_scale
            )));
        }

        let region = self.region.unwrap_or_else(|| Region::whole(field));
        if !region.fits(field.dimensions()) {
            return Err(Error::InvalidRegion {
                origin: region.origin,
                size: region.size,
                dimensions: field.dimensions(),
            });
        }

        Ok(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = ExtractionConfig::default();
        assert_eq!(config.iso_value, 127);
        assert_eq!(config.region, None);
        assert_eq!(config.cell_scale, 1.0);
        assert!(config.world_transform.is_identity(1e-6));
    }

    #[test]
    fn test_builder() {
        let config = ExtractionConfig::new(64)
            .with_region([1, 0, 0], [2, 2, 2])
            .with_cell_scale(0.5);

        assert_eq!(config.iso_value, 64);
        assert_eq!(config.region, Some(Region::new([1, 0, 0], [2, 2, 2])));
        assert_eq!(config.cell_scale, 0.5);
    }

    #[test]
    fn test_region_fits() {
        let dims = [4, 4, 4];
        assert!(Region::new([0, 0, 0], [3, 3, 3]).fits(dims));
        assert!(Region::new([3, 3, 3], [0, 0, 0]).fits(dims));
        assert!(!Region::new([1, 0, 0], [3, 3, 3]).fits(dims));
        assert!(!Region::new([usize::MAX, 0, 0], [1, 1, 1]).fits(dims));
    }

    #[test]
    fn test_resolve_region() {
        let field = DensityField::new([3, 4, 5]).unwrap();

        let whole = ExtractionConfig::default().resolve_region(&field).unwrap();
        assert_eq!(whole, Region::new([0, 0, 0], [2, 3, 4]));
        assert_eq!(whole.cell_count(), 24);

        let too_big = ExtractionConfig::default().with_region([0, 0, 0], [3, 3, 3]);
        assert!(matches!(too_big.resolve_region(&field), Err(Error::InvalidRegion { .. })));

        let bad_scale = ExtractionConfig::default().with_cell_scale(0.0);
        assert!(matches!(bad_scale.resolve_region(&field), Err(Error::InvalidData(_))));
    }
}
