use clap::{Parser, Subcommand};
use qr_master::config::{DecoderConfig, EncoderConfig, ErrorCorrection, cache_dir};
use qr_master::debug::init_logging;
use qr_master::tools::{binarize_both, binary_stats, decode_file, grayscale_stats, load_frame};
use qr_master::{Decoder, EncodeRequest, Encoder, QrError, ScanSession, ScannerScreen, export_png};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "qrmaster", version, about = "Generate and scan QR codes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render text as a QR code PNG
    Generate {
        /// Text, URL or Wi-Fi string to encode
        text: String,
        /// Square edge in pixels
        #[arg(long)]
        size: Option<u32>,
        /// Error correction level (L, M, Q, H)
        #[arg(long)]
        ec: Option<ErrorCorrection>,
        /// Output file; defaults to the share path under the cache dir
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Decode the first QR code in an image
    Decode {
        #[arg(long)]
        image: PathBuf,
    },
    /// Feed images through a scan session as a frame stream
    Scan {
        /// Images to use as consecutive camera frames
        #[arg(required = true)]
        frames: Vec<PathBuf>,
        /// Delay between frames in milliseconds
        #[arg(long, default_value_t = 33)]
        interval_ms: u64,
    },
    /// Print luminance and binarization stats for an image
    Inspect {
        #[arg(long)]
        image: PathBuf,
    },
}

fn main() -> ExitCode {
    if let Err(err) = init_logging() {
        eprintln!("{}", err);
    }

    let cli = Cli::parse();

    let ok = match cli.command {
        Command::Generate { text, size, ec, out } => generate_cmd(text, size, ec, out.as_deref()),
        Command::Decode { image } => decode_cmd(&image),
        Command::Scan { frames, interval_ms } => scan_cmd(&frames, Duration::from_millis(interval_ms)),
        Command::Inspect { image } => inspect_cmd(&image),
    };

    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn generate_cmd(text: String, size: Option<u32>, ec: Option<ErrorCorrection>, out: Option<&Path>) -> bool {
    let mut config = EncoderConfig::from_env();
    if let Some(size) = size {
        config.size = size;
    }
    if let Some(ec) = ec {
        config.ec_level = ec;
    }

    let request = match EncodeRequest::new(text, config.size) {
        Ok(request) => request,
        Err(err) => {
            eprintln!("{}", err);
            return false;
        }
    };

    let img = match Encoder::new(config).try_encode(&request) {
        Ok(img) => img,
        Err(err) => {
            eprintln!("{}", err);
            return false;
        }
    };

    let written = match out {
        Some(path) => img.save(path).map(|_| path.to_path_buf()).map_err(QrError::from),
        None => export_png(&img, &cache_dir()).map(|handle| handle.path),
    };

    match written {
        Ok(path) => {
            println!("Wrote {}x{} QR code to {}", img.width(), img.height(), path.display());
            true
        }
        Err(err) => {
            eprintln!("Failed to write image: {}", err);
            false
        }
    }
}

fn decode_cmd(image: &Path) -> bool {
    let start = Instant::now();
    match decode_file(image) {
        Ok(Some(report)) => {
            println!("{}", report.text);
            println!("  stage={} ({:.2?})", report.stage, start.elapsed());
            true
        }
        Ok(None) => {
            println!("No QR code found in {} ({:.2?})", image.display(), start.elapsed());
            false
        }
        Err(err) => {
            eprintln!("Failed to load image {}: {}", image.display(), err);
            false
        }
    }
}

fn scan_cmd(frames: &[PathBuf], interval: Duration) -> bool {
    let (mut session, results) = match ScanSession::with_analyzer(Decoder::new(DecoderConfig::from_env())) {
        Ok(started) => started,
        Err(err) => {
            eprintln!("Failed to start scan session: {}", err);
            return false;
        }
    };
    let mut screen = ScannerScreen::new();

    for path in frames {
        let frame = match load_frame(path) {
            Ok(frame) => frame,
            Err(err) => {
                eprintln!("Skipping {}: {}", path.display(), err);
                continue;
            }
        };
        if session.offer(frame).is_err() {
            break;
        }
        std::thread::sleep(interval);
        for notification in screen.drain(&results) {
            println!("{}", notification);
        }
    }

    session.stop();
    for notification in screen.drain(&results) {
        println!("{}", notification);
    }

    let stats = session.stats();
    println!(
        "Frames: received={} analyzed={} dropped={} codes={}",
        stats.frames_received, stats.frames_analyzed, stats.frames_dropped, stats.codes_found
    );
    screen.current_result().is_some()
}

fn inspect_cmd(image: &Path) -> bool {
    let frame = match load_frame(image) {
        Ok(frame) => frame,
        Err(err) => {
            eprintln!("Failed to load image {}: {}", image.display(), err);
            return false;
        }
    };

    println!("Image: {} ({}x{})", image.display(), frame.width(), frame.height());

    let gray = grayscale_stats(frame.data());
    println!("Luminance range: {}-{}, average: {}", gray.min, gray.max, gray.avg);

    let Some((hybrid, global)) = binarize_both(&frame, DecoderConfig::from_env().min_dynamic_range) else {
        println!("Frame is empty");
        return false;
    };
    for (name, binary) in [("hybrid", &hybrid), ("global-histogram", &global)] {
        let stats = binary_stats(binary);
        println!(
            "{}: black_pixels={} total={} black_ratio={:.2}%",
            name,
            stats.black_pixels,
            stats.total_pixels,
            stats.black_ratio * 100.0
        );
    }
    true
}
