//! Calibration Pattern Generator
//!
//! Writes circle-grid or checkerboard calibration patterns as SVG.
//!
//! `-h` is taken by the page height option; use `-H` or `--help` for the
//! usage text.
//!
//! Usage:
//!   cargo run --bin create_pattern -- -o pattern.svg -c 8 -r 11 -T circles

use calib_tools::target::pattern::{PatternConfig, PatternKind, Units};
use clap::{CommandFactory, Parser};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Generate circle grid and checkerboard calibration patterns as SVG",
    disable_help_flag = true
)]
struct Cli {
    /// Output SVG file
    #[arg(short = 'o', long, default_value = "out.svg")]
    output: String,

    /// Grid columns
    #[arg(short = 'c', long, default_value_t = 8)]
    columns: u32,

    /// Grid rows
    #[arg(short = 'r', long, default_value_t = 11)]
    rows: u32,

    /// Pattern type (circles, acircles, checkerboard)
    #[arg(short = 'T', long = "type", default_value = "circles")]
    pattern_type: String,

    /// Length unit (mm, inches, px, m)
    #[arg(short = 'u', long, default_value = "mm")]
    units: String,

    /// Grid pitch: circle spacing or checker square side
    #[arg(short = 's', long, default_value_t = 20.0)]
    square_size: f64,

    /// Circle radius as pitch / radius_rate
    #[arg(short = 'R', long, default_value_t = 5.0)]
    radius_rate: f64,

    /// Page width; requires --page_height and overrides --page_size
    #[arg(short = 'w', long = "page_width")]
    page_width: Option<f64>,

    /// Page height; requires --page_width and overrides --page_size
    #[arg(short = 'h', long = "page_height")]
    page_height: Option<f64>,

    /// Named page size (A0..A5), in millimetres
    #[arg(short = 'a', long = "page_size", default_value = "A4")]
    page_size: String,

    /// Render the circle grids without their embedded ArUco markers
    #[arg(long = "no-markers")]
    no_markers: bool,

    /// Print help
    #[arg(short = 'H', long = "help")]
    show_help: bool,
}

fn named_page_size_mm(name: &str) -> Option<(f64, f64)> {
    match name.to_uppercase().as_str() {
        "A0" => Some((840.0, 1188.0)),
        "A1" => Some((594.0, 840.0)),
        "A2" => Some((420.0, 594.0)),
        "A3" => Some((297.0, 420.0)),
        "A4" => Some((210.0, 297.0)),
        "A5" => Some((148.0, 210.0)),
        _ => None,
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    if cli.show_help {
        Cli::command().print_help()?;
        println!();
        return Ok(());
    }

    let kind = match cli.pattern_type.as_str() {
        "circles" => PatternKind::Circles,
        "acircles" => PatternKind::StaggeredCircles,
        "checkerboard" => PatternKind::Checkerboard,
        other => return Err(format!("Unsupported pattern type: {other}").into()),
    };

    let units = match cli.units.as_str() {
        "mm" => Units::Mm,
        "inches" => Units::Inches,
        "px" => Units::Px,
        "m" => Units::M,
        other => return Err(format!("Unsupported unit: {other}").into()),
    };

    let (page_width, page_height) = match (cli.page_width, cli.page_height) {
        (Some(width), Some(height)) => (width, height),
        (None, None) => named_page_size_mm(&cli.page_size)
            .ok_or_else(|| format!("Unsupported page size: {}", cli.page_size))?,
        _ => return Err("--page_width and --page_height must be given together".into()),
    };

    let config = PatternConfig {
        kind,
        columns: cli.columns,
        rows: cli.rows,
        square_size: cli.square_size,
        radius_rate: cli.radius_rate,
        units,
        page_width,
        page_height,
        embed_markers: !cli.no_markers,
        ..PatternConfig::default()
    };

    let drawing = config.build()?;
    println!(
        "✓ Laid out {} pattern: {} shapes on {}x{} {}",
        cli.pattern_type,
        drawing.shapes.len(),
        drawing.width,
        drawing.height,
        drawing.units.suffix()
    );

    std::fs::write(&cli.output, drawing.to_svg())?;
    println!("✓ Saved pattern to: {}", cli.output);

    Ok(())
}
