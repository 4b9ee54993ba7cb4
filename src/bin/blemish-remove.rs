use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use blemish_removal::{
    default_output_path, is_supported_image, save_image, ClickOutcome, Point, RemovalConfig,
    Session,
};

#[derive(Parser)]
#[command(
    name = "blemish-remove",
    about = "Remove small photo blemishes by patch search and seamless cloning",
    version,
    after_help = "Simple usage: blemish-remove <image> --at X,Y  (writes {name}_cleaned.{ext})\n\n\
                  Clicks given with repeated --at are applied one after another,\n\
                  each seeing the result of the previous one."
)]
struct Cli {
    /// Input image file
    input: String,

    /// Blemish location in pixels, as X,Y (repeatable)
    #[arg(long = "at", value_name = "X,Y", required = true, value_parser = parse_point)]
    points: Vec<Point>,

    /// Output file (default: {name}_cleaned.{ext})
    #[arg(short, long)]
    output: Option<String>,

    /// Analysis box size in pixels (odd, >= 5)
    #[arg(long, default_value = "35")]
    box_size: u32,

    /// Gradient threshold for edge detection (0-254)
    #[arg(short, long, default_value = "50")]
    threshold: u8,

    /// Patch search grid size (odd, >= 3)
    #[arg(long, default_value = "5")]
    grid: u32,

    /// Also write the smoothed preview used to spot blemishes
    #[arg(long)]
    preview: Option<String>,

    /// Revert the last successful edit before saving
    #[arg(long)]
    undo_last: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let x = x.trim().parse().map_err(|e| format!("bad x in '{s}': {e}"))?;
    let y = y.trim().parse().map_err(|e| format!("bad y in '{s}': {e}"))?;
    Ok(Point::new(x, y))
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.quiet {
        "warn"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = RemovalConfig {
        box_size: cli.box_size,
        gradient_threshold: cli.threshold,
        grid_size: cli.grid,
        ..RemovalConfig::default()
    };

    let input_path = Path::new(&cli.input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input);
        process::exit(1);
    }
    if !is_supported_image(input_path) {
        eprintln!("Error: Unsupported image format: {}", cli.input);
        process::exit(1);
    }

    let mut session = match Session::open(input_path, config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Fatal: {e}");
            process::exit(1);
        }
    };

    if let Some(preview) = &cli.preview {
        if let Err(e) = save_image(session.preview(), Path::new(preview)) {
            eprintln!("Error: Failed to save preview: {e}");
            process::exit(1);
        }
    }

    let mut edited = 0u32;
    let mut missed = 0u32;
    for &point in &cli.points {
        match session.click(point) {
            Ok(ClickOutcome::Edited(removal)) => {
                edited += 1;
                if !cli.quiet {
                    let circle = removal.report.shape.circle;
                    eprintln!(
                        "[OK] ({}, {}): radius {:.1}, donor score {:.2}",
                        point.x, point.y, circle.radius, removal.report.patch.best.score
                    );
                }
            }
            Ok(ClickOutcome::NoBlemish) => {
                missed += 1;
                if !cli.quiet {
                    eprintln!("[SKIP] ({}, {}): no blemish detected", point.x, point.y);
                }
            }
            Err(e) => {
                eprintln!("[FAIL] ({}, {}): {e}", point.x, point.y);
                process::exit(1);
            }
        }
    }

    if cli.undo_last && session.undo() && !cli.quiet {
        eprintln!("[UNDO] last edit reverted");
    }

    let output_path = cli
        .output
        .as_ref()
        .map_or_else(|| default_output_path(input_path), PathBuf::from);
    if let Err(e) = save_image(session.image(), &output_path) {
        eprintln!("[FAIL] {}: {e}", output_path.display());
        process::exit(1);
    }

    if !cli.quiet {
        eprintln!(
            "[Summary] Edited: {edited}, No blemish: {missed} -> {}",
            output_path.display()
        );
    }
}
