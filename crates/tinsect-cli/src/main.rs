//! tinsect CLI - surface intersection and boolean split from the terminal
//!
//! Reads surfaces as JSON, runs the engine and writes JSON results to a file
//! or stdout.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use tinsect_booleans::{
    compute_splits, decimate_stride, dedup_points, intersect_surfaces, publish_polylines,
    IntersectSettings, IntersectionOutcome, PolylineStyle,
};
use tinsect_math::Point3;
use tinsect_surface::{RawPoint, Surface, SurfaceDocument};

mod output;

use output::{merged_document, EntityWriter, GroupTable, MergedFile};

#[derive(Parser)]
#[command(name = "tinsect")]
#[command(about = "Intersect and split triangulated surfaces", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Intersect every pair of surfaces and write the polylines
    Intersect {
        /// Surface document
        input: PathBuf,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Settings JSON file
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Vertex spacing along output polylines (0 keeps every vertex)
        #[arg(long)]
        spacing: Option<f64>,
        /// Emit closed polygons
        #[arg(long)]
        closed: bool,
        /// Layer for created polylines
        #[arg(long, default_value = "0")]
        layer: String,
    },
    /// Split two surfaces along their intersection and merge the kept groups
    Split {
        /// Document holding the first surface
        a: PathBuf,
        /// Document holding the second surface
        b: PathBuf,
        /// Group id to drop from the merge (repeatable)
        #[arg(long = "drop")]
        drop: Vec<String>,
        /// Vertex weld tolerance for the merged surface
        #[arg(long, default_value_t = 1e-6)]
        weld: f64,
        /// Output file for the merged surface (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Merge points that coincide in plan (XY)
    Dedup {
        /// JSON array of {x, y, z} points
        input: PathBuf,
        /// Merge distance in XY
        #[arg(short, long)]
        tolerance: f64,
        /// Evenly thin the result to at most this many points
        #[arg(long)]
        max_points: Option<usize>,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Display information about a surface document
    Info {
        /// Surface document
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Intersect {
            input,
            output,
            settings,
            spacing,
            closed,
            layer,
        } => {
            let mut settings = match settings {
                Some(path) => IntersectSettings::from_json(&read(&path)?)?,
                None => IntersectSettings::default(),
            };
            if let Some(spacing) = spacing {
                settings.vertex_spacing = spacing;
            }
            settings.closed_polygons |= closed;
            run_intersect(&input, output.as_deref(), &settings, layer)?;
        }
        Commands::Split {
            a,
            b,
            drop,
            weld,
            output,
        } => {
            run_split(&a, &b, &drop, weld, output.as_deref())?;
        }
        Commands::Dedup {
            input,
            tolerance,
            max_points,
            output,
        } => {
            run_dedup(&input, tolerance, max_points, output.as_deref())?;
        }
        Commands::Info { input } => {
            show_info(&input)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .init();
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_surfaces(path: &Path) -> Result<Vec<Surface>> {
    let doc = SurfaceDocument::from_json(&read(path)?)
        .with_context(|| format!("invalid surface document {}", path.display()))?;
    Ok(doc.normalize().into_iter().map(|(s, _)| s).collect())
}

fn load_first_surface(path: &Path) -> Result<Surface> {
    load_surfaces(path)?
        .into_iter()
        .next()
        .with_context(|| format!("{} holds no surfaces", path.display()))
}

fn write_json(value: &impl serde::Serialize, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn run_intersect(
    input: &Path,
    output: Option<&Path>,
    settings: &IntersectSettings,
    layer: String,
) -> Result<()> {
    let surfaces = load_surfaces(input)?;
    let outcome = intersect_surfaces(&surfaces, settings)?;
    tracing::info!("{}", outcome.message());

    let mut writer = EntityWriter::default();
    if let IntersectionOutcome::Polylines(polylines) = &outcome {
        let style = PolylineStyle {
            layer,
            ..Default::default()
        };
        publish_polylines(polylines, &style, settings, &mut writer);
    }
    write_json(&writer.into_file(&outcome), output)
}

fn run_split(
    a: &Path,
    b: &Path,
    drop: &[String],
    weld: f64,
    output: Option<&Path>,
) -> Result<()> {
    let surface_a = load_first_surface(a)?;
    let surface_b = load_first_surface(b)?;

    let Some(mut session) = compute_splits(&surface_a, &surface_b, &IntersectSettings::default())?
    else {
        tracing::info!("surfaces do not overlap; nothing to split");
        return Ok(());
    };

    for id in drop {
        session.set_kept(id, false)?;
    }

    let mut table = GroupTable::default();
    session.publish_preview(&mut table);
    eprint!("{}", table.render());

    let mut file = MergedFile::default();
    session.commit(weld, &mut file);
    let id = format!("{}+{}", surface_a.id, surface_b.id);
    let name = format!("{} + {}", surface_a.name, surface_b.name);
    let merged = file.merged.context("merge produced no surface")?;
    tracing::info!(faces = merged.len(), vertices = merged.vertices.len(), "merged kept groups");
    write_json(&merged_document(&merged, id, name), output)
}

fn run_dedup(
    input: &Path,
    tolerance: f64,
    max_points: Option<usize>,
    output: Option<&Path>,
) -> Result<()> {
    let raw: Vec<RawPoint> = serde_json::from_str(&read(input)?)
        .with_context(|| format!("{} is not a JSON array of points", input.display()))?;
    let points: Vec<Point3> = raw.into_iter().map(Point3::from).collect();

    let result = dedup_points(&points, tolerance);
    tracing::info!(
        input = points.len(),
        unique = result.unique_count,
        "deduplicated points"
    );
    let kept = match max_points {
        Some(n) => decimate_stride(&result.points, n),
        None => result.points,
    };
    let out: Vec<RawPoint> = kept.into_iter().map(RawPoint::from).collect();
    write_json(&out, output)
}

fn show_info(input: &Path) -> Result<()> {
    let doc = SurfaceDocument::from_json(&read(input)?)?;
    println!("File: {}", input.display());
    println!("Surfaces: {}", doc.surfaces.len());
    for (surface, report) in doc.normalize() {
        println!("  {} ({})", surface.id, surface.name);
        println!(
            "    triangles: {} ({} skipped)",
            report.extracted, report.skipped
        );
        let aabb = surface.aabb();
        if !aabb.is_empty() {
            println!(
                "    extent: ({:.3}, {:.3}, {:.3}) - ({:.3}, {:.3}, {:.3})",
                aabb.min.x, aabb.min.y, aabb.min.z, aabb.max.x, aabb.max.y, aabb.max.z
            );
            println!("    footprint area: {:.3}", surface.footprint_area());
        }
    }
    Ok(())
}
