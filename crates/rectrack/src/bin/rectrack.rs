//! rectrack CLI: one-off rectification and scripted session replay.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rectrack::core::{
    FrameBuffer, ImageBufferError, ImageOrientation, Normalized, Origin, Point, Quad,
};
use rectrack::imaging::{load_frame, to_image};
use rectrack::rectify::{PerspectiveRectifier, RectifyError, RectifyParams};
use rectrack::{run_replay, write_json, RectrackIoError, ReplayConfig, SessionError};

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    Config(#[from] RectrackIoError),
    #[error(transparent)]
    Buffer(#[from] ImageBufferError),
    #[error(transparent)]
    Rectify(#[from] RectifyError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "rectrack")]
#[command(about = "Rectify quadrilaterals in images and replay scripted tracking sessions")]
#[command(version)]
struct Cli {
    /// Emit log events as JSON lines.
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Warp the region bounded by a quadrilateral into an upright image.
    Rectify(RectifyArgs),

    /// Run a tracking session over scripted detections and write a JSON report.
    Replay(ReplayArgs),
}

#[derive(Debug, Clone, Args)]
struct RectifyArgs {
    /// Path to the input image.
    #[arg(long)]
    image: PathBuf,

    /// Normalized corners `x,y` in order top-left, top-right, bottom-right, bottom-left.
    #[arg(long, num_args = 4, value_parser = parse_point, required = true, allow_hyphen_values = true)]
    quad: Vec<(f32, f32)>,

    /// Origin convention of the corner coordinates.
    #[arg(long, value_enum, default_value_t = OriginArg::TopLeft)]
    origin: OriginArg,

    /// Orientation applied to the rectified image.
    #[arg(long, value_enum, default_value_t = OrientationArg::Up)]
    orientation: OrientationArg,

    /// Upper bound on either output side in pixels.
    #[arg(long, default_value = "4096")]
    max_side: usize,

    /// Path to write the rectified image.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Debug, Clone, Args)]
struct ReplayArgs {
    /// Replay script (JSON).
    #[arg(long)]
    config: PathBuf,

    /// Report path, overrides `output_path` of the script.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OriginArg {
    TopLeft,
    BottomLeft,
}

impl From<OriginArg> for Origin {
    fn from(v: OriginArg) -> Self {
        match v {
            OriginArg::TopLeft => Origin::TopLeft,
            OriginArg::BottomLeft => Origin::BottomLeft,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrientationArg {
    Up,
    UpMirrored,
    Down,
    DownMirrored,
    Left,
    LeftMirrored,
    Right,
    RightMirrored,
}

impl From<OrientationArg> for ImageOrientation {
    fn from(v: OrientationArg) -> Self {
        match v {
            OrientationArg::Up => ImageOrientation::Up,
            OrientationArg::UpMirrored => ImageOrientation::UpMirrored,
            OrientationArg::Down => ImageOrientation::Down,
            OrientationArg::DownMirrored => ImageOrientation::DownMirrored,
            OrientationArg::Left => ImageOrientation::Left,
            OrientationArg::LeftMirrored => ImageOrientation::LeftMirrored,
            OrientationArg::Right => ImageOrientation::Right,
            OrientationArg::RightMirrored => ImageOrientation::RightMirrored,
        }
    }
}

fn parse_point(raw: &str) -> Result<(f32, f32), String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected x,y but got {raw:?}"))?;
    let x: f32 = x.trim().parse().map_err(|e| format!("bad x in {raw:?}: {e}"))?;
    let y: f32 = y.trim().parse().map_err(|e| format!("bad y in {raw:?}: {e}"))?;
    Ok((x, y))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match cli.command {
        Commands::Rectify(args) => run_rectify(&args),
        Commands::Replay(args) => run_replay_cmd(&args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(cli: &Cli) {
    #[cfg(feature = "tracing")]
    {
        rectrack::core::init_tracing(cli.log_json, log::LevelFilter::Info);
    }
    #[cfg(not(feature = "tracing"))]
    {
        let _ = cli;
        let _ = rectrack::core::init_from_env(log::LevelFilter::Info);
    }
}

fn open_frame(index: u64, path: &Path) -> CliResult<FrameBuffer> {
    load_frame(index, path).map_err(|source| CliError::Image {
        path: path.to_path_buf(),
        source,
    })
}

fn save_gray(img: &rectrack::core::GrayImage, path: &Path) -> CliResult<()> {
    to_image(img)?
        .save(path)
        .map_err(|source| CliError::Image {
            path: path.to_path_buf(),
            source,
        })
}

fn run_rectify(args: &RectifyArgs) -> CliResult<()> {
    let buf = open_frame(0, &args.image)?;
    log::info!(
        "loaded {} ({}x{})",
        args.image.display(),
        buf.image.width,
        buf.image.height
    );

    let c: Vec<Point<Normalized>> = args.quad.iter().map(|&(x, y)| Point::new(x, y)).collect();
    let quad = Quad::new(c[0], c[1], c[2], c[3], 1.0);

    let params = RectifyParams {
        origin: args.origin.into(),
        max_output_side: args.max_side,
        output_orientation: args.orientation.into(),
        ..RectifyParams::default()
    };
    let rectified = PerspectiveRectifier::new(params).rectify(&buf.as_frame(), &quad)?;

    save_gray(&rectified.image, &args.out)?;
    println!(
        "wrote {}x{} rectified image to {}",
        rectified.image.width,
        rectified.image.height,
        args.out.display()
    );
    Ok(())
}

fn run_replay_cmd(args: &ReplayArgs) -> CliResult<()> {
    let cfg = ReplayConfig::load_json(&args.config)?;
    let base = args.config.parent().unwrap_or_else(|| Path::new("."));

    let mut frames = Vec::with_capacity(cfg.frames.len());
    for (i, f) in cfg.frames.iter().enumerate() {
        let index = i as u64;
        let buf = match &f.image {
            Some(rel) => open_frame(index, &base.join(rel))?
                .with_orientation(cfg.session.capture_orientation),
            None => cfg.blank_frame(index),
        };
        frames.push(buf);
    }

    let report = run_replay(&cfg, frames)?;

    if let Some(dir) = cfg.preview_dir.as_ref().map(|d| base.join(d)) {
        std::fs::create_dir_all(&dir)?;
        for rec in &report.frames {
            if let Some(img) = &rec.preview {
                save_gray(img, &dir.join(format!("preview_{:04}.png", rec.index)))?;
            }
        }
    }

    let out = args.out.clone().unwrap_or_else(|| cfg.output_path());
    write_json(&report, &out)?;
    println!(
        "wrote replay report ({} frames, {} locked) to {}",
        report.frames.len(),
        report.locked_frames,
        out.display()
    );
    Ok(())
}
