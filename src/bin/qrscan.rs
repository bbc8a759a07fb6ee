use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rust_qr_scan::logging::init_logging;
use rust_qr_scan::source::still::load_frame;
use rust_qr_scan::{
    DecodeOptions, InversionMode, IntervalTicker, PixelFrame, RecordingNavigator, RouteDecision,
    ScanConfig, ScanSession, SessionState, TracingNotifier, decode,
};
use rust_qr_scan::source::ReplayCamera;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "gif", "webp", "tif", "tiff"];

#[derive(Parser)]
#[command(name = "qrscan", version, about = "Scan QR codes and route them to product pages")]
struct Cli {
    /// Path prefix a scanned URL must have (default from QR_SCAN_PRODUCT_PREFIX or /products/)
    #[arg(long, global = true)]
    prefix: Option<String>,
    /// Inversion attempts: dontInvert, onlyInvert, attemptBoth, invertFirst
    #[arg(long, global = true)]
    invert: Option<InversionMode>,
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the decoder engine on one image and print the raw outcome
    Probe {
        #[arg(long)]
        image: PathBuf,
    },
    /// Scan an uploaded image and print where it would navigate
    Decode {
        #[arg(long)]
        image: PathBuf,
    },
    /// Play a directory of images through a live scan session
    Replay {
        #[arg(long)]
        frames: PathBuf,
        /// Stop after this many ticks if nothing is found
        #[arg(long, default_value_t = 600)]
        max_ticks: usize,
        /// Ticks that report "no data yet" before the first frame
        #[arg(long, default_value_t = 0)]
        warmup: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let mut config = ScanConfig::from_env();
    if let Some(prefix) = cli.prefix {
        if !prefix.starts_with('/') {
            bail!("--prefix must start with '/', got {:?}", prefix);
        }
        config.product_prefix = prefix;
    }
    if let Some(invert) = cli.invert {
        config.inversion = invert;
    }

    match cli.command {
        Command::Probe { image } => probe_cmd(&config, &image),
        Command::Decode { image } => decode_cmd(config, &image),
        Command::Replay {
            frames,
            max_ticks,
            warmup,
        } => replay_cmd(config, &frames, max_ticks, warmup),
    }
}

fn load(config: &ScanConfig, image: &Path) -> Result<PixelFrame> {
    load_frame(image, config.max_still_dimension)
        .with_context(|| format!("Failed to load image {}", image.display()))
}

fn probe_cmd(config: &ScanConfig, image: &Path) -> Result<()> {
    let frame = load(config, image)?;
    let options = DecodeOptions {
        inversion: config.inversion,
        parallel_min_pixels: config.parallel_min_pixels,
    };
    let start = Instant::now();
    let outcome = decode(&frame, &options);
    println!(
        "Image: {} ({}x{})",
        image.display(),
        frame.width(),
        frame.height()
    );
    println!("Outcome: {:?} in {:.2?}", outcome, start.elapsed());
    Ok(())
}

fn decode_cmd(config: ScanConfig, image: &Path) -> Result<()> {
    let frame = load(&config, image)?;
    let nav = RecordingNavigator::new();
    let mut session = ScanSession::new(config, nav.clone(), TracingNotifier)?;
    let decision = session.scan_still(frame)?;
    print_decision(&decision);
    session.stop();
    Ok(())
}

fn replay_cmd(config: ScanConfig, dir: &Path, max_ticks: usize, warmup: usize) -> Result<()> {
    let paths = image_files(dir)?;
    if paths.is_empty() {
        bail!("No images found in {}", dir.display());
    }
    let frames = paths
        .iter()
        .map(|p| load(&config, p))
        .collect::<Result<Vec<_>>>()?;
    println!("Replaying {} frames from {}", frames.len(), dir.display());

    let mut camera = ReplayCamera::new(frames).with_warmup(warmup);
    let mut ticker = IntervalTicker::new(config.tick_interval);
    let nav = RecordingNavigator::new();
    let mut session = ScanSession::new(config, nav.clone(), TracingNotifier)?;

    if session.start(&mut camera) != SessionState::Active {
        bail!("Camera did not start: {:?}", session.state());
    }
    let ticks = session.run_until(&mut ticker, Some(max_ticks));
    session.settle(Duration::from_secs(2));

    let stats = session.stats();
    println!(
        "Ticks: {} captured={} submitted={} busy={} outcomes={}",
        ticks, stats.frames_captured, stats.frames_submitted, stats.busy_ticks, stats.outcomes
    );
    match nav.last() {
        Some(path) => println!("Navigated to {}", path),
        None => println!("No product code found (state {:?})", session.state()),
    }
    session.stop();
    Ok(())
}

fn print_decision(decision: &RouteDecision) {
    match decision {
        RouteDecision::Navigate(target) => {
            println!("Navigate: {}", target);
            if let Some(article) = target.article_no() {
                println!("Article: {}", article);
            }
        }
        RouteDecision::Retry(err) | RouteDecision::Report(err) => {
            let notice = err.notice();
            println!("{}: {} ({})", notice.title, notice.message, err);
        }
        RouteDecision::Silent => println!("No QR code found"),
    }
}

/// Image files in `dir`, sorted by name
fn image_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)
        .with_context(|| format!("Failed to read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}
