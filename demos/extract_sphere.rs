//! Extract a sphere and report mesh statistics

use anyhow::Context;
use clap::Parser;
use isocrate_core::{Bounded, Point3f, Transform3D, Vector3f};
use isocrate_extraction::{DensityField, ExtractionConfig, IsosurfaceExtractor};

/// Extract the isosurface of a synthetic sphere
#[derive(Parser, Debug)]
#[command(name = "extract_sphere", version, about)]
struct Cli {
    /// Samples along each axis
    #[arg(long, default_value_t = 48)]
    size: usize,

    /// Sphere radius in grid units
    #[arg(long, default_value_t = 16.0)]
    radius: f32,

    /// Width of the density falloff shell
    #[arg(long, default_value_t = 2.0)]
    falloff: f32,

    /// Density threshold
    #[arg(long, default_value_t = 127)]
    iso: u8,

    /// Object space size of one cell
    #[arg(long, default_value_t = 1.0)]
    scale: f32,

    /// Only extract this many cells along x, starting at the field origin
    #[arg(long, value_name = "CELLS")]
    slab: Option<usize>,

    /// Translate the query frame by this offset along z
    #[arg(long, default_value_t = 0.0)]
    lift: f32,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let center = (cli.size.saturating_sub(1)) as f32 / 2.0;
    let field = DensityField::sphere(
        [cli.size; 3],
        Point3f::new(center, center, center),
        cli.radius,
        cli.falloff,
    )
    .context("building sphere field")?;

    let mut config = ExtractionConfig::new(cli.iso)
        .with_cell_scale(cli.scale)
        .with_world_transform(Transform3D::translation(Vector3f::new(0.0, 0.0, cli.lift)));
    if let Some(cells) = cli.slab {
        let [_, height, depth] = field.cell_dimensions();
        config = config.with_region([0, 0, 0], [cells, height, depth]);
    }

    let surface = IsosurfaceExtractor::new(config)
        .extract(&field)
        .context("extracting isosurface")?;

    if !surface.is_renderable() {
        log::warn!("Iso {} does not cross the field", cli.iso);
        return Ok(());
    }

    let (min, max) = surface.mesh().bounding_box();
    let area: f32 = surface.triangles().iter().map(|t| t.area()).sum();
    let degenerate = surface.triangles().iter().filter(|t| t.is_degenerate()).count();

    println!("Vertices:      {}", surface.mesh().vertex_count());
    println!("Triangles:     {}", surface.triangle_count());
    println!("Degenerate:    {}", degenerate);
    println!("Edge buckets:  {}", surface.adjacency().len());
    println!("Tree depth:    {}", surface.spatial_tree().depth());
    println!("Bounds:        {} .. {}", min, max);
    println!("Surface area:  {:.2}", area);

    let expected = 4.0 * std::f32::consts::PI * (cli.radius * cli.scale).powi(2);
    if cli.slab.is_none() {
        println!("Sphere area:   {:.2} ({:+.1}%)", expected, 100.0 * (area - expected) / expected);
    }

    Ok(())
}
