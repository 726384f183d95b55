use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use grid_templator::export::{export_csv, export_json, CoordSpace};
use grid_templator::geometry::CircleLayout;
use grid_templator::infer::infer_template;
use grid_templator::lattice::{synthesize_circles, Margins};
use grid_templator::raster::io::load_page_raster;
use grid_templator::raster::{detect_shapes, RasterParams};
use grid_templator::types::{ExtractedTemplate, PageMetrics};
use grid_templator::vector::{parse_shapes, VectorParams, VectorPath};

#[derive(Parser, Debug)]
#[command(
    name = "templator",
    about = "Extract label-grid templates from rendered pages or synthesize circle lattices",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract a template from a rendered page image (raster pass).
    Extract(ExtractArgs),
    /// Extract a template from vector drawing primitives stored as JSON.
    ExtractVector(ExtractVectorArgs),
    /// Generate a circular layout in a simple or close-packed lattice.
    SynthesizeCircles(SynthArgs),
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Optional path for JSON output.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Optional path for CSV output.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Coordinate space for exported centers.
    #[arg(long = "coord-space", value_enum, default_value_t = CoordSpace::PercentWidth)]
    coord_space: CoordSpace,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Rendered page image (PNG, JPEG, ...).
    source: PathBuf,

    /// DPI the page was rendered at.
    #[arg(long, default_value_t = 200.0)]
    dpi: f64,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct ExtractVectorArgs {
    /// JSON file holding a list of vector paths for one page.
    source: PathBuf,

    /// Page width in points.
    #[arg(long = "page-width")]
    page_width: f64,

    /// Page height in points.
    #[arg(long = "page-height")]
    page_height: f64,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct SynthArgs {
    /// Circle lattice pattern.
    #[arg(value_enum)]
    layout: CircleLayout,

    /// Page width in points.
    #[arg(long = "page-width")]
    page_width: f64,

    /// Page height in points.
    #[arg(long = "page-height")]
    page_height: f64,

    /// Circle diameter in points.
    #[arg(long)]
    diameter: f64,

    /// Page margins in points (top right bottom left).
    #[arg(long, num_args = 4, value_names = ["TOP", "RIGHT", "BOTTOM", "LEFT"], default_values_t = [0.0, 0.0, 0.0, 0.0])]
    margin: Vec<f64>,

    /// Gap between circle rims in points.
    #[arg(long, default_value_t = 0.0)]
    gap: f64,

    /// Optional limit on generated columns.
    #[arg(long = "max-cols")]
    max_cols: Option<usize>,

    /// Optional limit on generated rows.
    #[arg(long = "max-rows")]
    max_rows: Option<usize>,

    #[command(flatten)]
    output: OutputArgs,
}

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let cli = Cli::parse();
    match cli.command {
        Command::Extract(args) => handle_extract(args),
        Command::ExtractVector(args) => handle_extract_vector(args),
        Command::SynthesizeCircles(args) => handle_synth(args),
    }
}

fn handle_extract(args: ExtractArgs) -> Result<(), String> {
    let page = load_page_raster(&args.source, args.dpi)?;
    let observations = detect_shapes(&page, &RasterParams::default());
    if observations.is_empty() {
        return Err(format!(
            "No components survived raster filtering in {}.",
            args.source.display()
        ));
    }

    let template = infer_template(&observations, page.page_width_pt(), page.page_height_pt())
        .map_err(|e| format!("Raster extraction failed: {e}"))?;

    let default_json = args.source.with_extension("json");
    write_outputs(&template, &args.output, Some(default_json))
}

fn handle_extract_vector(args: ExtractVectorArgs) -> Result<(), String> {
    let data = fs::read_to_string(&args.source)
        .map_err(|e| format!("Failed to read {}: {e}", args.source.display()))?;
    let paths: Vec<VectorPath> = serde_json::from_str(&data)
        .map_err(|e| format!("Failed to parse primitives {}: {e}", args.source.display()))?;

    let page = PageMetrics::new(args.page_width, args.page_height)
        .map_err(|e| format!("Invalid page dimensions: {e}"))?;
    let observations = parse_shapes(&paths, page, &VectorParams::default());
    if observations.is_empty() {
        return Err(format!(
            "No usable vector shapes in {}; try the raster pass.",
            args.source.display()
        ));
    }

    let template = infer_template(&observations, args.page_width, args.page_height)
        .map_err(|e| format!("Vector extraction failed: {e}"))?;

    let default_json = args.source.with_extension("json");
    write_outputs(&template, &args.output, Some(default_json))
}

fn handle_synth(args: SynthArgs) -> Result<(), String> {
    let margins = Margins {
        top: args.margin[0],
        right: args.margin[1],
        bottom: args.margin[2],
        left: args.margin[3],
    };

    let template = synthesize_circles(
        args.layout,
        args.page_width,
        args.page_height,
        args.diameter,
        margins,
        args.gap,
        args.max_cols,
        args.max_rows,
    )
    .map_err(|e| format!("Circle synthesis failed: {e}"))?;

    let layout_tag = match args.layout {
        CircleLayout::Simple => "simple",
        CircleLayout::Close => "close",
    };
    let default_json = PathBuf::from(format!("templator-circles-{layout_tag}.json"));
    write_outputs(&template, &args.output, Some(default_json))
}

/// Write requested outputs; with no explicit target, fall back to the
/// default JSON path.
fn write_outputs(
    template: &ExtractedTemplate,
    output: &OutputArgs,
    default_json: Option<PathBuf>,
) -> Result<(), String> {
    let mut wrote: Vec<(&str, PathBuf)> = Vec::new();

    let json_target: Option<&Path> = match (&output.json, &output.csv) {
        (Some(path), _) => Some(path.as_path()),
        (None, None) => default_json.as_deref(),
        (None, Some(_)) => None,
    };
    if let Some(path) = json_target {
        wrote.push(("JSON", export_json(template, path, output.coord_space)?));
    }
    if let Some(path) = &output.csv {
        wrote.push(("CSV", export_csv(template, path, output.coord_space)?));
    }

    for (kind, path) in wrote {
        println!("Wrote {kind} output to {}", path.display());
    }
    Ok(())
}
