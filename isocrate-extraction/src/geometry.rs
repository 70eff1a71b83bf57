//! Owning geometry object that publishes extraction results
//!
//! A [`VoxelGeometry`] holds the latest [`GeometrySnapshot`] behind one lock.
//! `generate` builds a complete new snapshot off to the side and swaps it in
//! with a single write, so readers see either the old mesh, adjacency map and
//! tree or the new ones, never a mix.

use crate::config::ExtractionConfig;
use crate::density::DensityField;
use crate::extractor::IsosurfaceExtractor;
use crate::surface::SurfaceMesh;
use crate::triangle::SurfaceTriangle;
use isocrate_core::Result;
use std::sync::{Arc, RwLock};

/// One published extraction together with the field it came from
#[derive(Debug, Clone)]
pub struct GeometrySnapshot {
    field: Option<Arc<DensityField>>,
    surface: SurfaceMesh,
}

impl GeometrySnapshot {
    fn empty() -> Self {
        Self {
            field: None,
            surface: SurfaceMesh::empty(0, [0; 3]),
        }
    }

    /// Source field, `None` before the first successful `generate`
    pub fn field(&self) -> Option<&Arc<DensityField>> {
        self.field.as_ref()
    }

    pub fn surface(&self) -> &SurfaceMesh {
        &self.surface
    }

    pub fn is_renderable(&self) -> bool {
        self.surface.is_renderable()
    }
}

/// Voxel surface that can be regenerated while readers hold older snapshots
#[derive(Debug)]
pub struct VoxelGeometry {
    current: RwLock<Arc<GeometrySnapshot>>,
}

impl Default for VoxelGeometry {
    fn default() -> Self {
        Self::new()
    }
}

impl VoxelGeometry {
    pub fn new() -> Self {
        Self {
            current: RwLock::new(Arc::new(GeometrySnapshot::empty())),
        }
    }

    /// Extract `field` with `config` and publish the result.
    ///
    /// On error nothing is replaced and the previous snapshot stays current.
    pub fn generate(
        &self,
        field: Arc<DensityField>,
        config: &ExtractionConfig,
    ) -> Result<Arc<GeometrySnapshot>> {
        let surface = IsosurfaceExtractor::new(config.clone()).extract(&field)?;
        let snapshot = Arc::new(GeometrySnapshot {
            field: Some(field),
            surface,
        });

        self.publish(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    /// The currently published snapshot
    pub fn snapshot(&self) -> Arc<GeometrySnapshot> {
        self.current
            .read()
            .map(|current| Arc::clone(&*current))
            .unwrap_or_else(|poisoned| Arc::clone(&*poisoned.into_inner()))
    }

    pub fn is_renderable(&self) -> bool {
        self.snapshot().is_renderable()
    }

    /// Drop the published geometry
    pub fn clear(&self) {
        log::debug!("Clearing voxel geometry");
        self.publish(Arc::new(GeometrySnapshot::empty()));
    }

    /// Triangles touching cell `(x, y, z)` of the current snapshot.
    ///
    /// `None` when nothing has been generated, the cell is outside the field
    /// or the surface does not cross it.
    pub fn lookup_triangles_touching_cell(
        &self,
        x: usize,
        y: usize,
        z: usize,
    ) -> Option<Vec<Arc<SurfaceTriangle>>> {
        let snapshot = self.snapshot();
        let field = snapshot.field()?;
        snapshot.surface().triangles_touching_cell(field, x, y, z)
    }

    fn publish(&self, snapshot: Arc<GeometrySnapshot>) {
        match self.current.write() {
            Ok(mut current) => *current = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
    }
}
