use std::{path::PathBuf, process::ExitCode};

use checkercal::{run_calibration, run_undistort_preview, CalibrationConfig, CalibrationRecord};
use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "checkercal",
    version,
    about = "One-shot checkerboard camera calibration",
    long_about = "Reads frames from a live camera until enough checkerboard views are \
                  collected, calibrates, and writes the optimal camera matrix, distortion \
                  coefficients and valid ROI to a YAML file. Without a subcommand it runs \
                  `calibrate` with the stock settings."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Log as JSON lines (needs the `tracing` feature).
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Capture checkerboard views from the camera and write the calibration file.
    Calibrate(CalibrateArgs),
    /// Show live undistorted and ROI-cropped frames for a calibration file.
    Undistort(UndistortArgs),
    /// Write the default run configuration as JSON.
    InitConfig {
        /// Destination of the JSON file.
        #[arg(default_value = "checkercal.json")]
        path: PathBuf,
    },
}

#[derive(Args, Debug, Default)]
struct CameraArgs {
    /// Camera device index.
    #[arg(long)]
    device: Option<i32>,
    /// Requested frame width.
    #[arg(long)]
    width: Option<i32>,
    /// Requested frame height.
    #[arg(long)]
    height: Option<i32>,
}

#[derive(Args, Debug, Default)]
struct CalibrateArgs {
    /// JSON run configuration; flags below override its fields.
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[command(flatten)]
    camera: CameraArgs,
    /// Inner corners per board row.
    #[arg(long)]
    cols: Option<u32>,
    /// Inner corners per board column.
    #[arg(long)]
    rows: Option<u32>,
    /// Side of one board square in world units.
    #[arg(long)]
    square_size: Option<f32>,
    /// Number of views to collect.
    #[arg(short, long)]
    target: Option<usize>,
    /// Give up after this many frames.
    #[arg(long)]
    max_frames: Option<usize>,
    /// Free scaling of the optimal camera matrix, in [0, 1].
    #[arg(long)]
    alpha: Option<f64>,
    /// Output YAML path.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Do not open a preview window.
    #[arg(long)]
    no_preview: bool,
    /// Milliseconds each accepted view stays on screen.
    #[arg(long)]
    delay_ms: Option<i32>,
}

#[derive(Args, Debug)]
struct UndistortArgs {
    /// Calibration file written by `calibrate`.
    #[arg(long, default_value = "calibration_matrix.yaml")]
    calibration: PathBuf,
    #[command(flatten)]
    camera: CameraArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    init_logging(&cli)?;

    match cli.command.unwrap_or(Command::Calibrate(CalibrateArgs::default())) {
        Command::Calibrate(args) => {
            let cfg = build_config(&args)?;
            cfg.validate()?;
            let outcome = run_calibration(&cfg)?;
            println!(
                "calibrated from {} views ({} frames), rms {:.4} px",
                outcome.stats.accepted, outcome.stats.frames, outcome.rms
            );
            println!("wrote {}", cfg.output_path.display());
        }
        Command::Undistort(args) => {
            let record = CalibrationRecord::load_yaml(&args.calibration)?;
            let mut camera = CalibrationConfig::default().camera;
            apply_camera_args(&mut camera, &args.camera);
            run_undistort_preview(&record, &camera)?;
        }
        Command::InitConfig { path } => {
            CalibrationConfig::default().write_json(&path)?;
            println!("wrote {}", path.display());
        }
    }

    Ok(())
}

fn log_level(quiet: bool, verbose: u8) -> log::LevelFilter {
    match (quiet, verbose) {
        (true, _) => log::LevelFilter::Warn,
        (false, 0) => log::LevelFilter::Info,
        (false, 1) => log::LevelFilter::Debug,
        (false, _) => log::LevelFilter::Trace,
    }
}

fn init_logging(cli: &Cli) -> Result<(), log::SetLoggerError> {
    let level = log_level(cli.quiet, cli.verbose);

    #[cfg(feature = "tracing")]
    {
        checkercal::core::init_tracing(cli.json_logs, level);
        Ok(())
    }

    #[cfg(not(feature = "tracing"))]
    {
        if cli.json_logs {
            eprintln!("--json-logs needs the `tracing` feature; using plain logs");
        }
        checkercal::core::init_with_level(level)
    }
}

fn build_config(args: &CalibrateArgs) -> Result<CalibrationConfig, Box<dyn std::error::Error>> {
    let mut cfg = match &args.config {
        Some(path) => CalibrationConfig::load_json(path)?,
        None => CalibrationConfig::default(),
    };

    apply_camera_args(&mut cfg.camera, &args.camera);
    if let Some(cols) = args.cols {
        cfg.board.inner_cols = cols;
    }
    if let Some(rows) = args.rows {
        cfg.board.inner_rows = rows;
    }
    if let Some(square_size) = args.square_size {
        cfg.board.square_size = square_size;
    }
    if let Some(target) = args.target {
        cfg.target_detections = target;
    }
    if args.max_frames.is_some() {
        cfg.max_frames = args.max_frames;
    }
    if let Some(alpha) = args.alpha {
        cfg.alpha = alpha;
    }
    if let Some(output) = &args.output {
        cfg.output_path = output.clone();
    }
    if args.no_preview {
        cfg.preview.enabled = false;
    }
    if let Some(delay_ms) = args.delay_ms {
        cfg.preview.delay_ms = delay_ms;
    }
    Ok(cfg)
}

fn apply_camera_args(camera: &mut checkercal::CameraConfig, args: &CameraArgs) {
    if let Some(device) = args.device {
        camera.device_index = device;
    }
    if let Some(width) = args.width {
        camera.width = width;
    }
    if let Some(height) = args.height {
        camera.height = height;
    }
}
