//! Weldmesh CLI - runs the mesh pipeline over procedural shapes.
//!
//! Usage: weldmesh <COMMAND> [OPTIONS]
//!
//! Run `weldmesh --help` for available commands.

use std::time::Instant;

use clap::{Parser, Subcommand, ValueEnum};

use weldmesh::batch::{process_entities, process_entity, EntitySoup, ProcessedEntity, SoupTriangle};
use weldmesh::config::MeshOptions;
use weldmesh::shapes;

#[derive(Parser)]
#[command(name = "weldmesh")]
#[command(author, version, about = "Triangle soup welding and normal balancing", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build one shape and report on the result
    Info {
        /// Shape to generate
        #[arg(value_enum)]
        shape: Shape,

        /// Tessellation resolution (segments or grid cells)
        #[arg(short, long, default_value = "16")]
        resolution: usize,

        /// Reverse the winding of every n-th triangle before building
        #[arg(long)]
        flip_every: Option<usize>,

        #[command(flatten)]
        mesh: MeshArgs,
    },

    /// Process many generated entities at once
    Batch {
        /// Number of entities
        #[arg(short = 'n', long, default_value = "64")]
        count: usize,

        /// Tessellation resolution (segments or grid cells)
        #[arg(short, long, default_value = "16")]
        resolution: usize,

        /// Print a summary line per entity
        #[arg(short, long)]
        verbose: bool,

        /// Use single-threaded execution (for benchmarking)
        #[arg(long)]
        sequential: bool,

        #[command(flatten)]
        mesh: MeshArgs,
    },
}

#[derive(clap::Args)]
struct MeshArgs {
    /// Welding tolerance
    #[arg(short, long, default_value_t = weldmesh::config::DEFAULT_PRECISION)]
    precision: f64,

    /// Sharp edge threshold in degrees
    #[arg(short = 'a', long, default_value = "30")]
    sharp_angle: f64,
}

impl MeshArgs {
    fn options(&self) -> MeshOptions {
        MeshOptions::default()
            .with_precision(self.precision)
            .with_sharp_angle_degrees(self.sharp_angle)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Shape {
    /// Regular tetrahedron
    Tetrahedron,
    /// Axis-aligned cube
    Cube,
    /// Open UV hemisphere
    Hemisphere,
    /// Flat grid of quads
    Grid,
    /// Non-orientable Möbius strip
    Mobius,
}

const SHAPES: [Shape; 5] = [
    Shape::Tetrahedron,
    Shape::Cube,
    Shape::Hemisphere,
    Shape::Grid,
    Shape::Mobius,
];

impl Shape {
    fn soup(self, resolution: usize) -> Vec<SoupTriangle> {
        match self {
            Shape::Tetrahedron => shapes::tetrahedron(),
            Shape::Cube => shapes::cube(1.0),
            Shape::Hemisphere => shapes::uv_hemisphere(1.0, resolution, resolution / 2),
            Shape::Grid => shapes::grid(resolution),
            Shape::Mobius => shapes::mobius_strip(resolution),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Info {
            shape,
            resolution,
            flip_every,
            mesh,
        } => {
            cmd_info(shape, resolution, flip_every, &mesh.options())?;
        }

        Commands::Batch {
            count,
            resolution,
            verbose,
            sequential,
            mesh,
        } => {
            let options = mesh.options().with_parallel(!sequential);
            cmd_batch(count, resolution, verbose, &options)?;
        }
    }

    Ok(())
}

fn cmd_info(
    shape: Shape,
    resolution: usize,
    flip_every: Option<usize>,
    options: &MeshOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut soup = shape.soup(resolution);
    if let Some(n) = flip_every.filter(|&n| n > 0) {
        for tri in soup.iter_mut().step_by(n) {
            *tri = tri.flipped();
        }
    }

    let start = Instant::now();
    let processed = process_entity(EntitySoup::new(0, soup), options)?;
    let elapsed = start.elapsed();

    let mesh = &processed.mesh;
    let report = &processed.report;
    println!("Vertices: {}", mesh.vertex_count());
    println!("Triangles: {}", mesh.triangle_count());
    println!("Edges: {}", mesh.edge_table().len());
    println!("Boundary half-edges: {}", mesh.boundary_halfedge_count());
    println!("Faulty triangles: {}", mesh.faulty_triangles().len());

    let bounds = mesh.bounding_box();
    if !bounds.is_empty() {
        let (min, max) = (bounds.min, bounds.max);
        println!(
            "Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
            min.x, min.y, min.z, max.x, max.y, max.z
        );
        let size = bounds.size();
        println!("Dimensions: {:.3} x {:.3} x {:.3}", size.x, size.y, size.z);
    }

    println!(
        "Orientation: {} components, {} reversed, {} conflicts",
        report.orientation.components, report.orientation.reversed, report.orientation.conflicts
    );
    println!(
        "Normals: {} smoothing groups ({} averaged), {} degenerate triangles",
        report.balance.smoothing_groups,
        report.balance.averaged_groups,
        report.balance.degenerate_triangles
    );
    println!(
        "Shading: {} groups, {} mixed triangles",
        report.balance.shading_groups, report.balance.mixed_triangles
    );
    println!("Face groups: {}", mesh.face_groups().len());
    println!("Time: {:.2?}", elapsed);

    print_diagnostics(&processed);
    Ok(())
}

fn cmd_batch(
    count: usize,
    resolution: usize,
    verbose: bool,
    options: &MeshOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let entities: Vec<EntitySoup> = (0..count)
        .map(|i| EntitySoup::new(i as i64, SHAPES[i % SHAPES.len()].soup(resolution)))
        .collect();
    let input_triangles: usize = entities.iter().map(|e| e.triangles.len()).sum();

    let start = Instant::now();
    let processed = process_entities(entities, options)?;
    let elapsed = start.elapsed();

    let mut conflicts = 0;
    let mut faulty = 0;
    for entity in &processed {
        let summary = entity.summary();
        conflicts += summary.conflicts;
        faulty += summary.faulty;
        if verbose {
            println!("{}", summary);
            print_diagnostics(entity);
        }
    }

    println!(
        "Processed {} entities ({} triangles) in {:.2?} ({})",
        processed.len(),
        input_triangles,
        elapsed,
        if options.parallel { "parallel" } else { "sequential" }
    );
    println!("Faulty triangles: {}", faulty);
    println!("Orientation conflicts: {}", conflicts);
    Ok(())
}

fn print_diagnostics(entity: &ProcessedEntity) {
    for d in entity.mesh.diagnostics() {
        println!("  warning: {}", d);
    }
}
