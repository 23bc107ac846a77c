//! board-vision CLI — inspect and drive the chessboard vision pipeline.
//!
//! The headless subcommands work from files and are what CI exercises; the
//! `watch` subcommand (feature `live`) runs the real camera turn loop.

use board_vision::{
    overlay_ranking, BoardCorner, BoardGrid, BoardViewConfig, ChangeDetector, ReplaySource, Square,
};
use board_vision_core::{frame_from_luma8, frame_to_luma8, FrameTransform, GrayFrame};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "board-vision")]
#[command(about = "Locate a chessboard from fiducial tags and rank changed cells between frames")]
#[command(version)]
struct Cli {
    /// Log at debug level instead of info.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file.
    CheckConfig {
        /// Path to the configuration JSON.
        #[arg(long)]
        config: PathBuf,
    },

    /// Build the 64-cell grid from located corner points and write it as JSON.
    Grid(GridArgs),

    /// Rank changed cells between two grayscale images of the board.
    Diff(DiffArgs),

    /// Run the live turn loop against a camera.
    #[cfg(feature = "live")]
    Watch(WatchArgs),
}

#[derive(Debug, Clone, Args)]
struct GridArgs {
    /// JSON file with the located board corners.
    #[arg(long)]
    corners: PathBuf,

    /// Path to write the grid (JSON).
    #[arg(long)]
    out: PathBuf,
}

#[derive(Debug, Clone, Args)]
struct DiffArgs {
    /// Reference image: the board before the move.
    #[arg(long)]
    before: PathBuf,

    /// Fresh image: the board after the move.
    #[arg(long)]
    after: PathBuf,

    /// JSON file with the located board corners.
    #[arg(long)]
    corners: PathBuf,

    /// SSIM window side (odd).
    #[arg(long, default_value = "7")]
    window: usize,

    /// How many cells to print, most-changed first.
    #[arg(long, default_value = "2")]
    top: usize,

    /// Optional path for the full JSON ranking.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Optional path for an overlay image with the top cells outlined.
    #[arg(long)]
    overlay: Option<PathBuf>,
}

#[cfg(feature = "live")]
#[derive(Debug, Clone, Args)]
struct WatchArgs {
    /// /dev/video index of the board camera.
    #[arg(long, default_value = "0")]
    device: usize,

    /// Configuration file; built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let _ = board_vision_core::init_with_level(level);

    match cli.command {
        Commands::CheckConfig { config } => run_check_config(&config),
        Commands::Grid(args) => run_grid(&args),
        Commands::Diff(args) => run_diff(&args),
        #[cfg(feature = "live")]
        Commands::Watch(args) => run_watch(&args),
    }
}

fn load_corners(path: &Path) -> CliResult<Vec<BoardCorner>> {
    let raw = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn load_gray(path: &Path) -> CliResult<GrayFrame> {
    let img = image::ImageReader::open(path)?.decode()?.to_luma8();
    Ok(frame_from_luma8(&img))
}

fn run_check_config(path: &Path) -> CliResult<()> {
    let config = BoardViewConfig::load_json(path)?;
    config.validate()?;
    println!("configuration is valid");
    for spec in &config.corners {
        println!("  {}: tag {} corner {}", spec.name, spec.tag_id, spec.corner_index);
    }
    println!(
        "  required tags: {}, rotation: {} deg, translation: ({}, {})",
        config.required_tags, config.rotation_deg, config.translation.0, config.translation.1
    );
    println!(
        "  flush: {} frames, locate attempts: {}, ssim window: {}",
        config.flush_frames, config.max_locate_attempts, config.ssim_window
    );
    Ok(())
}

fn run_grid(args: &GridArgs) -> CliResult<()> {
    let corners = load_corners(&args.corners)?;
    let grid = BoardGrid::build(&corners)?;
    fs::write(&args.out, serde_json::to_string_pretty(&grid)?)?;
    println!("wrote {}-cell grid to {}", grid.len(), args.out.display());
    Ok(())
}

fn run_diff(args: &DiffArgs) -> CliResult<()> {
    let corners = load_corners(&args.corners)?;
    let grid = BoardGrid::build(&corners)?;
    let before = load_gray(&args.before)?;
    let after = load_gray(&args.after)?;

    let mut source = ReplaySource::new([before, after.clone()]);
    let transform = FrameTransform::identity();
    let mut detector = ChangeDetector::new(0, args.window);
    detector.update_snapshot(&mut source, &transform)?;
    let ranking = detector.rank_changed_cells(&mut source, &transform, &grid)?;

    for cell in ranking.iter().take(args.top) {
        println!("{} {:.2}", cell.square, cell.score);
    }
    if let Some(out) = &args.out {
        fs::write(out, serde_json::to_string_pretty(&ranking)?)?;
        println!("wrote full ranking to {}", out.display());
    }
    if let Some(path) = &args.overlay {
        let top: Vec<Square> = ranking.iter().take(2).map(|c| c.square).collect();
        frame_to_luma8(&overlay_ranking(&after, &grid, &top)).save(path)?;
        println!("wrote overlay to {}", path.display());
    }
    Ok(())
}

#[cfg(feature = "live")]
fn run_watch(args: &WatchArgs) -> CliResult<()> {
    use board_vision::{AprilTagDetector, BoardSession, V4lSource};

    let config = match &args.config {
        Some(path) => BoardViewConfig::load_json(path)?,
        None => BoardViewConfig::default(),
    };
    let source = V4lSource::open(args.device)?;
    let detector = AprilTagDetector::new()?;
    let mut session = BoardSession::new(config, source, detector)?;

    session.locate_board()?;
    session.update_snapshot()?;
    println!("board located; Enter = rank cells, u = re-snapshot, r = re-locate, q = quit");

    for line in std::io::stdin().lines() {
        match line?.trim() {
            "q" => break,
            "r" => match session.locate_board() {
                Ok(grid) => println!("re-located: {} cells", grid.len()),
                Err(e) => eprintln!("localization failed: {e}"),
            },
            "u" => match session.update_snapshot() {
                Ok(()) => println!("snapshot updated"),
                Err(e) => eprintln!("snapshot failed: {e}"),
            },
            _ => match session.rank_cells() {
                Ok(ranking) => {
                    for cell in ranking.iter().take(2) {
                        println!("{} {:.2}", cell.square, cell.score);
                    }
                }
                Err(e) => eprintln!("ranking failed: {e}"),
            },
        }
    }
    Ok(())
}
