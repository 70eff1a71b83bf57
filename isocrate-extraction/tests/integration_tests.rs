//! Integration tests for isocrate-extraction
//!
//! These exercise extraction end to end: welding, case coverage, the derived
//! triangle data, the spatial tree and region tiling.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use isocrate_core::{Error, Point3f, Transform3D, UnitQuaternion, Vector3f};
use isocrate_extraction::tables::{case_triangle_count, CORNER_OFFSETS};
use isocrate_extraction::*;
use isocrate_spatial::{AxisCompare, TreeNode};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

const SPHERE_CENTER: [f32; 3] = [7.5, 7.5, 7.5];

fn half_split() -> DensityField {
    DensityField::from_samples([2, 2, 2], vec![0, 0, 0, 0, 255, 255, 255, 255]).unwrap()
}

fn sphere_field() -> DensityField {
    let [x, y, z] = SPHERE_CENTER;
    DensityField::sphere([16, 16, 16], Point3f::new(x, y, z), 5.0, 2.0).unwrap()
}

/// Field for a single cell with bit `i` of `case` marking corner `i` inside
fn single_cell(case: usize) -> DensityField {
    let mut field = DensityField::new([2, 2, 2]).unwrap();
    for (corner, [x, y, z]) in CORNER_OFFSETS.iter().enumerate() {
        let value = if case & (1 << corner) != 0 { 255 } else { 0 };
        field.set(*x, *y, *z, value).unwrap();
    }
    field
}

fn undirected_edges(mesh: &isocrate_core::IndexedMesh) -> BTreeSet<(u32, u32)> {
    mesh.triangles()
        .flat_map(|[a, b, c]| [(a, b), (b, c), (c, a)])
        .map(|(a, b)| (a.min(b), a.max(b)))
        .collect()
}

#[test]
fn test_half_split_scenario() {
    let config = ExtractionConfig::new(127).with_region([0, 0, 0], [1, 1, 1]);
    let surface = IsosurfaceExtractor::new(config).extract(&half_split()).unwrap();

    assert!(surface.is_renderable());
    assert_eq!(surface.triangle_count(), 2);
    assert_eq!(surface.mesh().triangle_count(), 2);
    assert_eq!(surface.mesh().vertex_count(), 4);

    // One bucket per welded vertex; the quad diagonal only shows up as an
    // index-buffer edge
    assert_eq!(surface.adjacency().len(), 4);
    assert_eq!(undirected_edges(surface.mesh()).len(), 5);

    let tree = surface.spatial_tree();
    assert!(tree.is_built());
    assert_eq!(tree.node_count(), 2);

    for vertex in surface.vertices() {
        assert_abs_diff_eq!(vertex.position().z, 127.0 / 255.0, epsilon = 1e-6);
    }
}

#[test]
fn test_half_split_buckets_share_triangles() {
    let field = half_split();
    let surface = extract_isosurface(&field, 127).unwrap();

    let shared: Vec<usize> = surface
        .adjacency()
        .iter()
        .map(|(_, triangles)| triangles.len())
        .collect();
    let mut sorted = shared.clone();
    sorted.sort_unstable();
    // Diagonal endpoints are used by both triangles, the other two corners by one
    assert_eq!(sorted, vec![1, 1, 2, 2]);

    let touching = surface.triangles_touching_cell(&field, 0, 0, 0).expect("cell is crossed");
    assert_eq!(touching.len(), 2);
}

#[test]
fn test_shared_face_vertices_are_welded() {
    let field = DensityField::from_fn([3, 2, 2], |_, _, z| if z == 1 { 255 } else { 0 }).unwrap();
    let surface = extract_isosurface(&field, 127).unwrap();

    assert_eq!(surface.triangle_count(), 4);
    assert_eq!(surface.mesh().vertex_count(), 6);

    let positions: BTreeSet<[u32; 3]> = surface
        .vertices()
        .iter()
        .map(|v| v.position.map(f32::to_bits))
        .collect();
    assert_eq!(positions.len(), 6);
}

#[test]
fn test_every_case_emits_table_triangles() {
    for case in 0..256 {
        let surface = extract_isosurface(&single_cell(case), 127).unwrap();
        let expected = case_triangle_count(case);

        assert_eq!(surface.triangle_count(), expected, "case {}", case);
        if case == 0 || case == 255 {
            assert_eq!(expected, 0);
            assert!(!surface.is_renderable());
        } else {
            assert!((1..=5).contains(&expected), "case {}", case);
            assert_eq!(surface.adjacency().len(), surface.mesh().vertex_count());
        }
    }
}

#[test]
fn test_triangle_normals_and_planes() {
    let surface = extract_isosurface(&sphere_field(), 127).unwrap();
    let center = Point3f::from(SPHERE_CENTER);
    assert!(surface.triangle_count() > 100);

    for triangle in surface.triangles() {
        assert_relative_eq!(triangle.normal().magnitude(), 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(
            triangle.normal().dot(&triangle.centroid().coords) + triangle.plane_distance(),
            0.0,
            epsilon = 1e-4
        );

        if triangle.area() > 1e-3 {
            assert!(triangle.normal().dot(&(triangle.centroid() - center)) > 0.0);
        }
    }

    for vertex in surface.vertices() {
        assert_relative_eq!(vertex.normal().magnitude(), 1.0, epsilon = 1e-4);
        assert!(vertex.normal().dot(&(vertex.position() - center)) > 0.0);
    }
}

#[test]
fn test_vertices_are_inside_their_triangle() {
    let surface = extract_isosurface(&sphere_field(), 127).unwrap();

    for triangle in surface.triangles().iter().filter(|t| !t.is_degenerate()) {
        for p in triangle.positions() {
            assert!(triangle.point_in_triangle(p), "triangle {}", triangle.index());
        }
        if triangle.area() > 1e-3 {
            assert!(triangle.point_in_triangle(&triangle.centroid()));
        }

        // The projection drops the dominant axis, so only a tilted normal
        // moves a far point off the triangle
        let n = triangle.normal();
        let tilt = (0..3)
            .filter(|&axis| axis != triangle.dominant_axis())
            .map(|axis| n[axis].abs())
            .fold(0.0f32, f32::max);
        if tilt > 0.1 {
            let far = triangle.centroid() + n * 100.0;
            assert!(!triangle.point_in_triangle(&far));
        }
    }
}

fn check_partition(node: &TreeNode<Arc<SurfaceTriangle>>, count: &mut usize) {
    *count += 1;
    let axis = node.axis();

    let mut stack: Vec<_> = node.left().into_iter().collect();
    while let Some(child) = stack.pop() {
        assert_ne!(CentroidCompare.compare(child.value(), node.value(), axis), Ordering::Greater);
        stack.extend(child.left());
        stack.extend(child.right());
    }

    let mut stack: Vec<_> = node.right().into_iter().collect();
    while let Some(child) = stack.pop() {
        assert_ne!(CentroidCompare.compare(child.value(), node.value(), axis), Ordering::Less);
        stack.extend(child.left());
        stack.extend(child.right());
    }

    for child in node.left().into_iter().chain(node.right()) {
        check_partition(child, count);
    }
}

#[test]
fn test_spatial_tree_covers_all_triangles() {
    let surface = extract_isosurface(&sphere_field(), 127).unwrap();
    let tree = surface.spatial_tree();

    let mut count = 0;
    check_partition(tree.root().expect("tree is built"), &mut count);
    assert_eq!(count, surface.triangle_count());

    let visited: BTreeSet<usize> = tree.iter().map(|t| t.index()).collect();
    assert_eq!(visited.len(), surface.triangle_count());
}

#[test]
fn test_buckets_match_welded_vertices() {
    let surface = extract_isosurface(&sphere_field(), 127).unwrap();

    assert_eq!(surface.adjacency().len(), surface.mesh().vertex_count());
    for (edge, triangles) in surface.adjacency().iter() {
        assert!(!triangles.is_empty(), "{}", edge);
    }

    let registrations: usize = surface.adjacency().iter().map(|(_, t)| t.len()).sum();
    assert_eq!(registrations, 3 * surface.triangle_count());
}

#[test]
fn test_tiled_regions_match_whole_field() {
    let field = sphere_field();
    let whole = extract_isosurface(&field, 127).unwrap();

    let left_config = ExtractionConfig::new(127).with_region([0, 0, 0], [7, 15, 15]);
    let right_config = ExtractionConfig::new(127).with_region([7, 0, 0], [8, 15, 15]);
    let left = IsosurfaceExtractor::new(left_config).extract(&field).unwrap();
    let right = IsosurfaceExtractor::new(right_config).extract(&field).unwrap();

    assert!(left.is_renderable() && right.is_renderable());
    assert_eq!(left.triangle_count() + right.triangle_count(), whole.triangle_count());
    assert!(left.mesh().vertex_count() + right.mesh().vertex_count() > whole.mesh().vertex_count());

    // Tiles share vertex positions along the seam
    let seam = |surface: &SurfaceMesh| -> BTreeSet<[u32; 3]> {
        surface
            .vertices()
            .iter()
            .filter(|v| (v.position[0] - 7.0).abs() < 1e-4)
            .map(|v| v.position.map(f32::to_bits))
            .collect()
    };
    assert!(!seam(&left).is_empty());
    assert_eq!(seam(&left), seam(&right));
}

#[test]
fn test_invalid_region_is_rejected() {
    let field = sphere_field();
    let config = ExtractionConfig::new(127).with_region([8, 0, 0], [8, 15, 15]);

    match IsosurfaceExtractor::new(config).extract(&field) {
        Err(Error::InvalidRegion { origin, size, dimensions }) => {
            assert_eq!(origin, [8, 0, 0]);
            assert_eq!(size, [8, 15, 15]);
            assert_eq!(dimensions, [16, 16, 16]);
        }
        other => panic!("expected InvalidRegion, got {:?}", other.map(|s| s.triangle_count())),
    }
}

#[test]
fn test_uniform_field_is_empty_not_error() {
    let field = DensityField::from_fn([6, 6, 6], |_, _, _| 200).unwrap();
    let surface = extract_isosurface(&field, 127).unwrap();

    assert!(!surface.is_renderable());
    assert_eq!(surface.mesh().vertex_count(), 0);
    assert!(surface.adjacency().is_empty());
    assert!(!surface.spatial_tree().is_built());
}

#[test]
fn test_world_transform_moves_query_frame() {
    let field = sphere_field();
    let rotation =
        UnitQuaternion::from_axis_angle(&Vector3f::z_axis(), std::f32::consts::FRAC_PI_2);
    let lift = Transform3D::translation(Vector3f::new(0.0, 0.0, 50.0));
    let transform = Transform3D::rotation(rotation).then(lift);

    let plain = extract_isosurface(&field, 127).unwrap();
    let moved = IsosurfaceExtractor::new(ExtractionConfig::new(127).with_world_transform(transform))
        .extract(&field)
        .unwrap();

    assert_eq!(plain.vertices(), moved.vertices());
    for (a, b) in plain.triangles().iter().zip(moved.triangles()) {
        let expected = transform.transform_point(&a.centroid());
        assert_relative_eq!(b.centroid(), expected, epsilon = 1e-3);
        assert_relative_eq!(b.area(), a.area(), epsilon = 1e-3);
    }
}

#[test]
fn test_raycast_through_sphere() {
    let surface = extract_isosurface(&sphere_field(), 127).unwrap();
    let origin = Point3f::new(7.3, 7.6, -20.0);

    let hit = surface.raycast(&origin, &Vector3f::z()).expect("ray crosses the sphere");
    assert!((hit.point.z - 2.5).abs() < 0.5, "hit at {}", hit.point);
    assert!(hit.triangle.point_in_triangle(&hit.point));
}

#[test]
fn test_voxel_geometry_regeneration() {
    let geometry = VoxelGeometry::new();
    let field = Arc::new(sphere_field());

    geometry.generate(Arc::clone(&field), &ExtractionConfig::default()).unwrap();
    let first = geometry.snapshot();
    assert!(first.is_renderable());

    let bad = ExtractionConfig::default().with_region([0, 0, 0], [16, 1, 1]);
    assert!(geometry.generate(Arc::clone(&field), &bad).is_err());
    assert!(Arc::ptr_eq(&first, &geometry.snapshot()));

    let found = geometry
        .lookup_triangles_touching_cell(12, 7, 7)
        .expect("surface crosses the cell");
    assert!(!found.is_empty());
}
