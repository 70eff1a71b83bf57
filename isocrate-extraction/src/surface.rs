//! Result of one extraction: render buffers plus query structures

use crate::adjacency::AdjacencyMap;
use crate::density::DensityField;
use crate::edge::EdgeId;
use crate::tables::{case_index, crossed_edges, is_surface_case, CORNER_OFFSETS};
use crate::triangle::{CentroidCompare, SurfaceTriangle};
use isocrate_core::{IndexedMesh, Point3f, SurfaceVertex, Vector3f};
use isocrate_spatial::{Descend, SpatialTree};
use std::sync::Arc;

/// Spatial tree over extracted triangles, split on centroids
pub type TriangleTree = SpatialTree<Arc<SurfaceTriangle>, CentroidCompare>;

/// Nearest triangle hit by a ray
#[derive(Debug, Clone)]
pub struct RayHit {
    /// Ray parameter of the hit
    pub t: f32,
    pub point: Point3f,
    pub triangle: Arc<SurfaceTriangle>,
}

/// Everything one extraction produced.
///
/// The mesh buffers are in object space (grid coordinates times cell scale);
/// triangles, adjacency and the spatial tree are in the world frame.
#[derive(Debug, Clone)]
pub struct SurfaceMesh {
    mesh: IndexedMesh,
    triangles: Vec<Arc<SurfaceTriangle>>,
    adjacency: AdjacencyMap,
    spatial_tree: TriangleTree,
    iso_value: u8,
    dimensions: [usize; 3],
}

impl SurfaceMesh {
    /// Surface with no geometry, as if nothing crossed `iso_value`
    pub fn empty(iso_value: u8, dimensions: [usize; 3]) -> Self {
        Self {
            mesh: IndexedMesh::new(),
            triangles: Vec::new(),
            adjacency: AdjacencyMap::new(),
            spatial_tree: TriangleTree::new(CentroidCompare),
            iso_value,
            dimensions,
        }
    }

    pub(crate) fn from_parts(
        mesh: IndexedMesh,
        triangles: Vec<Arc<SurfaceTriangle>>,
        adjacency: AdjacencyMap,
        spatial_tree: TriangleTree,
        iso_value: u8,
        dimensions: [usize; 3],
    ) -> Self {
        Self {
            mesh,
            triangles,
            adjacency,
            spatial_tree,
            iso_value,
            dimensions,
        }
    }

    pub fn mesh(&self) -> &IndexedMesh {
        &self.mesh
    }

    pub fn vertices(&self) -> &[SurfaceVertex] {
        &self.mesh.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.mesh.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Whether at least one triangle was produced
    pub fn is_renderable(&self) -> bool {
        !self.triangles.is_empty()
    }

    /// Triangles in emission order
    pub fn triangles(&self) -> &[Arc<SurfaceTriangle>] {
        &self.triangles
    }

    pub fn adjacency(&self) -> &AdjacencyMap {
        &self.adjacency
    }

    pub fn spatial_tree(&self) -> &TriangleTree {
        &self.spatial_tree
    }

    /// Iso value the surface was extracted at
    pub fn iso_value(&self) -> u8 {
        self.iso_value
    }

    /// Sample dimensions of the source field
    pub fn dimensions(&self) -> [usize; 3] {
        self.dimensions
    }

    /// Give up the query structures and keep the render buffers
    pub fn into_mesh(self) -> IndexedMesh {
        self.mesh
    }

    /// Triangles welded on the edges the surface crosses in cell `(x, y, z)`.
    ///
    /// The case is recomputed from `field`, which must be the field this
    /// surface was extracted from. Returns `None` for cells outside the field
    /// and for cells the surface does not cross. A cell outside the extracted
    /// region returns `Some` with whatever neighbouring triangles share its
    /// edges, possibly none.
    pub fn triangles_touching_cell(
        &self,
        field: &DensityField,
        x: usize,
        y: usize,
        z: usize,
    ) -> Option<Vec<Arc<SurfaceTriangle>>> {
        if field.dimensions() != self.dimensions {
            log::warn!(
                "Cell lookup against a {:?} field, surface was extracted from {:?}",
                field.dimensions(),
                self.dimensions
            );
            return None;
        }

        let samples = cell_samples(field, [x, y, z])?;
        let case = case_index(&samples, self.iso_value);
        if !is_surface_case(case) {
            return None;
        }

        let edges = crossed_edges(case)
            .map(|cube_edge| EdgeId::from_cell(self.dimensions, [x, y, z], cube_edge));
        Some(self.adjacency.triangles_on(edges))
    }

    /// Nearest triangle hit at `t >= 0` along the ray, checking every triangle
    pub fn raycast(&self, origin: &Point3f, direction: &Vector3f) -> Option<RayHit> {
        self.triangles
            .iter()
            .filter_map(|triangle| {
                let t = triangle.ray_intersect(origin, direction)?;
                (t >= 0.0).then_some((t, triangle))
            })
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(t, triangle)| RayHit {
                t,
                point: origin + direction * t,
                triangle: Arc::clone(triangle),
            })
    }

    /// Triangles whose centroid lies in the box `[min, max]`, found by
    /// walking the spatial tree and skipping subtrees beyond the box
    pub fn triangles_with_centroid_in(
        &self,
        min: &Point3f,
        max: &Point3f,
    ) -> Vec<Arc<SurfaceTriangle>> {
        let mut found = Vec::new();

        self.spatial_tree.walk(|node| {
            let triangle = node.value();
            let centroid = triangle.centroid();
            if (0..3).all(|axis| (min[axis]..=max[axis]).contains(&centroid[axis])) {
                found.push(Arc::clone(triangle));
            }

            let axis = node.axis();
            let below = centroid[axis] < min[axis];
            let above = centroid[axis] > max[axis];
            match (below, above) {
                (true, _) => Descend::Right,
                (_, true) => Descend::Left,
                _ => Descend::Both,
            }
        });

        found
    }
}

/// Corner samples of cell `cell`, `None` when it is not fully inside `field`
fn cell_samples(field: &DensityField, cell: [usize; 3]) -> Option<[u8; 8]> {
    let mut samples = [0u8; 8];
    for (corner, [dx, dy, dz]) in CORNER_OFFSETS.iter().enumerate() {
        samples[corner] = field.get(cell[0] + dx, cell[1] + dy, cell[2] + dz)?;
    }
    Some(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::extract_isosurface;
    use approx::assert_relative_eq;

    fn sphere() -> (DensityField, SurfaceMesh) {
        let center = Point3f::new(5.5, 5.5, 5.5);
        let field = DensityField::sphere([12, 12, 12], center, 3.5, 2.0).unwrap();
        let surface = extract_isosurface(&field, 127).unwrap();
        (field, surface)
    }

    #[test]
    fn test_empty_surface() {
        let surface = SurfaceMesh::empty(127, [2, 2, 2]);

        assert!(!surface.is_renderable());
        assert_eq!(surface.triangle_count(), 0);
        assert!(surface.adjacency().is_empty());
        assert!(!surface.spatial_tree().is_built());
        assert!(surface.raycast(&Point3f::origin(), &Vector3f::x()).is_none());
    }

    #[test]
    fn test_into_mesh_keeps_render_buffers() {
        let (_, surface) = sphere();
        let vertex_count = surface.vertices().len();
        let index_count = surface.indices().len();

        let mesh = surface.into_mesh();
        assert_eq!(mesh.vertex_count(), vertex_count);
        assert_eq!(mesh.indices.len(), index_count);
        assert!(mesh.is_renderable());
    }

    #[test]
    fn test_lookup_uniform_and_invalid_cells() {
        let (field, surface) = sphere();

        assert!(surface.triangles_touching_cell(&field, 0, 0, 0).is_none());
        assert!(surface.triangles_touching_cell(&field, 5, 5, 5).is_none());
        assert!(surface.triangles_touching_cell(&field, 11, 0, 0).is_none());

        let other = DensityField::new([4, 4, 4]).unwrap();
        assert!(surface.triangles_touching_cell(&other, 0, 0, 0).is_none());
    }

    #[test]
    fn test_lookup_finds_cell_triangles() {
        let (field, surface) = sphere();

        // Cell straddling the +x pole of the sphere
        let found = surface
            .triangles_touching_cell(&field, 8, 5, 5)
            .expect("surface crosses the cell");
        assert!(!found.is_empty());

        let mut indices: Vec<usize> = found.iter().map(|t| t.index()).collect();
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices.len(), found.len());

        for triangle in &found {
            for p in triangle.positions() {
                assert!(p.x >= 7.0 && p.x <= 10.0);
            }
        }
    }

    #[test]
    fn test_raycast_nearest_hit() {
        let (_, surface) = sphere();
        let origin = Point3f::new(-5.0, 5.6, 5.4);

        let hit = surface.raycast(&origin, &Vector3f::x()).expect("ray crosses the sphere");
        assert!(hit.t > 0.0);
        assert!((hit.point.x - 2.0).abs() < 0.5);
        assert_relative_eq!(hit.point.y, 5.6, epsilon = 1e-4);

        assert!(surface.raycast(&origin, &-Vector3f::x()).is_none());
    }

    #[test]
    fn test_centroid_box_query_matches_scan() {
        let (_, surface) = sphere();
        let min = Point3f::new(5.5, 0.0, 0.0);
        let max = Point3f::new(12.0, 5.5, 12.0);

        let mut from_tree: Vec<usize> = surface
            .triangles_with_centroid_in(&min, &max)
            .iter()
            .map(|t| t.index())
            .collect();
        let mut from_scan: Vec<usize> = surface
            .triangles()
            .iter()
            .filter(|t| {
                let c = t.centroid();
                (0..3).all(|axis| c[axis] >= min[axis] && c[axis] <= max[axis])
            })
            .map(|t| t.index())
            .collect();
        from_tree.sort_unstable();
        from_scan.sort_unstable();

        assert!(!from_scan.is_empty());
        assert_eq!(from_tree, from_scan);
    }
}
