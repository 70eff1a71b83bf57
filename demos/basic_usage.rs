//! Basic usage example for isocrate
//!
//! This example demonstrates fundamental operations:
//! - Building a density field
//! - Extracting a welded mesh
//! - Querying triangles through the adjacency map and the spatial tree

use isocrate_core::{Point3f, Vector3f};
use isocrate_extraction::{DensityField, ExtractionConfig, VoxelGeometry};
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    println!("isocrate Example");
    println!("================");

    // Ground plane at z = 3.5 with a bump in the middle
    let field = DensityField::from_fn([12, 12, 8], |x, y, z| {
        let bump = if (4..8).contains(&x) && (4..8).contains(&y) { 2 } else { 0 };
        if z < 3 + bump { 255 } else { 0 }
    })?;
    let field = Arc::new(field);
    println!("Created {:?} density field ({} cells)", field.dimensions(), field.cell_count());

    let geometry = VoxelGeometry::new();
    let snapshot = geometry.generate(Arc::clone(&field), &ExtractionConfig::default())?;
    let surface = snapshot.surface();

    println!("\nExtraction:");
    println!("- Vertices: {}", surface.mesh().vertex_count());
    println!("- Triangles: {}", surface.triangle_count());
    println!("- Edge buckets: {}", surface.adjacency().len());
    println!("- Spatial tree depth: {}", surface.spatial_tree().depth());
    println!("- Vertex buffer: {} bytes", surface.mesh().vertex_bytes().len());

    println!("\nQueries:");
    match geometry.lookup_triangles_touching_cell(5, 5, 4) {
        Some(triangles) => println!("- Cell (5, 5, 4) touches {} triangles", triangles.len()),
        None => println!("- Cell (5, 5, 4) is not crossed"),
    }

    let origin = Point3f::new(2.3, 2.6, 10.0);
    if let Some(hit) = surface.raycast(&origin, &-Vector3f::z()) {
        println!("- Ray from {} hits triangle {} at {}", origin, hit.triangle.index(), hit.point);
    }

    let (low, high) = (Point3f::new(4.0, 4.0, 0.0), Point3f::new(8.0, 8.0, 8.0));
    let nearby = surface.triangles_with_centroid_in(&low, &high);
    println!("- {} triangles have their centroid above the bump", nearby.len());

    geometry.clear();
    println!("\nCleared, renderable: {}", geometry.is_renderable());

    Ok(())
}
