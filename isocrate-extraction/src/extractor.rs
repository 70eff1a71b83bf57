//! Marching cubes isosurface extraction
//!
//! Cells are visited z, then y, then x. Along each x row the four samples on
//! the shared face are carried over from the previous cell, so every sample
//! is read once per row. Vertices are welded by [`EdgeId`]: the first triangle
//! that needs a crossing on an edge creates the vertex and later triangles
//! reuse its index.

use crate::adjacency::AdjacencyMap;
use crate::config::ExtractionConfig;
use crate::density::DensityField;
use crate::edge::EdgeId;
use crate::surface::{SurfaceMesh, TriangleTree};
use crate::tables::{
    case_index, case_triangles, is_surface_case, CORNER_OFFSETS, EDGE_CORNERS, LEADING_CORNERS,
    TRAILING_CORNERS,
};
use crate::timing::{Phase, PhaseTimer};
use crate::triangle::{CentroidCompare, SurfaceTriangle};
use isocrate_core::{IndexedMesh, Point3f, Result, SurfaceVertex, Vector3f};
use std::collections::HashMap;
use std::sync::Arc;

/// Added to the gradient length before normalizing corner normals
pub const NORMAL_REGULARIZATION: f32 = 1e-5;

/// Crossings this close to a corner sample snap onto that corner
pub const SNAP_EPSILON: f32 = 1e-5;

/// Marching cubes extractor for byte density fields
#[derive(Debug, Clone, Default)]
pub struct IsosurfaceExtractor {
    config: ExtractionConfig,
}

impl IsosurfaceExtractor {
    pub fn new(config: ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract the surface of `field` over the configured region.
    ///
    /// Fails with `InvalidRegion` before touching any sample when the region
    /// does not fit the field. A region without crossings yields an empty,
    /// non-renderable mesh.
    ///
    /// Crossings within [`SNAP_EPSILON`] of a corner snap onto it, so a
    /// sample exactly at the iso value pulls the vertices of all its crossed
    /// edges onto one point. Those vertices stay separate (one per edge) and
    /// the zero-area triangles between them are kept; check
    /// [`SurfaceTriangle::is_degenerate`] to skip them.
    pub fn extract(&self, field: &DensityField) -> Result<SurfaceMesh> {
        let region = self.config.resolve_region(field)?;
        let _timer = PhaseTimer::start(Phase::Extraction);

        log::debug!(
            "Extracting iso {} from {:?} field, {} cells at {:?}",
            self.config.iso_value,
            field.dimensions(),
            region.cell_count(),
            region.origin
        );

        let mut pass = ExtractionPass::new(field, &self.config);
        for z in region.range(2) {
            for y in region.range(1) {
                let mut cache = CellCache::new();
                cache.load(field, [region.origin[0], y, z], &TRAILING_CORNERS);

                for x in region.range(0) {
                    let cell = [x, y, z];
                    cache.load(field, cell, &LEADING_CORNERS);
                    pass.march_cell(cell, &cache);
                    cache.advance();
                }
            }
        }

        Ok(pass.finish())
    }
}

/// Extract the whole of `field` at `iso_value` with default settings
pub fn extract_isosurface(field: &DensityField, iso_value: u8) -> Result<SurfaceMesh> {
    IsosurfaceExtractor::new(ExtractionConfig::new(iso_value)).extract(field)
}

/// Corner samples and grid positions of the current cell
#[derive(Debug)]
struct CellCache {
    samples: [u8; 8],
    positions: [Point3f; 8],
}

impl CellCache {
    fn new() -> Self {
        Self {
            samples: [0; 8],
            positions: [Point3f::origin(); 8],
        }
    }

    fn load(&mut self, field: &DensityField, cell: [usize; 3], corners: &[usize; 4]) {
        for &corner in corners {
            let [dx, dy, dz] = CORNER_OFFSETS[corner];
            let [x, y, z] = [cell[0] + dx, cell[1] + dy, cell[2] + dz];
            self.samples[corner] = field.sample(x, y, z);
            self.positions[corner] = Point3f::new(x as f32, y as f32, z as f32);
        }
    }

    /// Shift the +x face into the -x slots for the next cell of the row
    fn advance(&mut self) {
        for (&lead, &trail) in LEADING_CORNERS.iter().zip(TRAILING_CORNERS.iter()) {
            self.samples[trail] = self.samples[lead];
            self.positions[trail] = self.positions[lead];
        }
    }
}

/// Scratch state of one `extract` call
struct ExtractionPass<'a> {
    field: &'a DensityField,
    config: &'a ExtractionConfig,
    welds: HashMap<EdgeId, u32>,
    mesh: IndexedMesh,
    triangles: Vec<Arc<SurfaceTriangle>>,
    adjacency: AdjacencyMap,
}

impl<'a> ExtractionPass<'a> {
    fn new(field: &'a DensityField, config: &'a ExtractionConfig) -> Self {
        Self {
            field,
            config,
            welds: HashMap::new(),
            mesh: IndexedMesh::new(),
            triangles: Vec::new(),
            adjacency: AdjacencyMap::new(),
        }
    }

    fn march_cell(&mut self, cell: [usize; 3], cache: &CellCache) {
        let case = case_index(&cache.samples, self.config.iso_value);
        if !is_surface_case(case) {
            return;
        }

        let normals: [Vector3f; 8] = std::array::from_fn(|corner| {
            let [dx, dy, dz] = CORNER_OFFSETS[corner];
            corner_normal(self.field.gradient(cell[0] + dx, cell[1] + dy, cell[2] + dz))
        });

        for [a, b, c] in case_triangles(case) {
            // Table rows wind towards the denser side; flip so faces look outwards
            let cube_edges = [a, c, b];
            let edges = cube_edges
                .map(|cube_edge| EdgeId::from_cell(self.field.dimensions(), cell, cube_edge));

            let mut indices = [0u32; 3];
            for (slot, (&edge, &cube_edge)) in edges.iter().zip(cube_edges.iter()).enumerate() {
                indices[slot] = self.weld(edge, cube_edge, cache, &normals);
            }
            self.mesh.indices.extend_from_slice(&indices);

            let positions = indices.map(|i| {
                let local = self.mesh.vertices[i as usize].position();
                self.config.world_transform.transform_point(&local)
            });
            let triangle = Arc::new(SurfaceTriangle::new(self.triangles.len(), indices, positions));

            for edge in edges {
                self.adjacency.register(edge, Arc::clone(&triangle));
            }
            self.triangles.push(triangle);
        }
    }

    /// Index of the vertex on `edge`, interpolating it on first use
    fn weld(
        &mut self,
        edge: EdgeId,
        cube_edge: usize,
        cache: &CellCache,
        normals: &[Vector3f; 8],
    ) -> u32 {
        let Self {
            welds,
            mesh,
            config,
            ..
        } = self;

        *welds.entry(edge).or_insert_with(|| {
            mesh.add_vertex(interpolate_vertex(
                cube_edge,
                cache,
                normals,
                config.iso_value,
                config.cell_scale,
            ))
        })
    }

    fn finish(self) -> SurfaceMesh {
        let mut spatial_tree = TriangleTree::new(CentroidCompare);
        {
            let _timer = PhaseTimer::start(Phase::TreeBuild);
            spatial_tree.add_element_range(self.triangles.iter().cloned(), true);
        }

        if self.triangles.is_empty() {
            log::debug!("No cell crosses iso {}; mesh is empty", self.config.iso_value);
        } else {
            log::info!(
                "Extracted {} vertices, {} triangles, {} edge buckets, tree depth {}",
                self.mesh.vertex_count(),
                self.triangles.len(),
                self.adjacency.len(),
                spatial_tree.depth()
            );
        }

        SurfaceMesh::from_parts(
            self.mesh,
            self.triangles,
            self.adjacency,
            spatial_tree,
            self.config.iso_value,
            self.field.dimensions(),
        )
    }
}

/// Outward unit normal from a density gradient; zero on flat regions
fn corner_normal(gradient: Vector3f) -> Vector3f {
    -gradient / (gradient.magnitude() + NORMAL_REGULARIZATION)
}

fn interpolate_vertex(
    cube_edge: usize,
    cache: &CellCache,
    normals: &[Vector3f; 8],
    iso_value: u8,
    cell_scale: f32,
) -> SurfaceVertex {
    let [a, b] = EDGE_CORNERS[cube_edge];
    let iso = iso_value as f32;
    let (va, vb) = (cache.samples[a] as f32, cache.samples[b] as f32);

    let t = if (iso - va).abs() < SNAP_EPSILON {
        0.0
    } else if (iso - vb).abs() < SNAP_EPSILON {
        1.0
    } else if (vb - va).abs() < SNAP_EPSILON {
        0.5
    } else {
        (iso - va) / (vb - va)
    };

    let position = cache.positions[a].coords.lerp(&cache.positions[b].coords, t) * cell_scale;
    let normal = normals[a]
        .lerp(&normals[b], t)
        .try_normalize(f32::EPSILON)
        .or_else(|| normals[a].try_normalize(f32::EPSILON))
        .or_else(|| normals[b].try_normalize(f32::EPSILON))
        .unwrap_or_else(Vector3f::z);

    SurfaceVertex::new(Point3f::from(position), normal)
}
