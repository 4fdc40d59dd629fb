use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use adaptive_watermark::{
    is_supported_video, Anchor, Compositor, PlacementOptions, RunResult, Task,
};

#[derive(Parser)]
#[command(
    name = "adaptive-watermark",
    about = "Batch-apply a light or dark watermark chosen by background luminance",
    version,
    after_help = "A directory input is walked recursively; every jpg/jpeg/png is stamped and\n\
                  written as PNG, mirroring the source tree (in-place without --output).\n\
                  A video input (mp4/avi/mov/mkv) is re-encoded frame by frame to\n\
                  <stem>_watermarked.mp4 and requires --output. Video runs need FFmpeg\n\
                  on the PATH."
)]
struct Cli {
    /// Source directory of images, or a single video file
    input: PathBuf,

    /// Watermark variant composited onto dark backgrounds
    light: PathBuf,

    /// Watermark variant composited onto light backgrounds
    dark: PathBuf,

    /// Output directory (default: write back into the source tree)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Position: center, top-left, top-right, bottom-left, bottom-right
    #[arg(short, long, default_value = "center")]
    anchor: String,

    /// Padding in pixels between the watermark and the canvas edge
    #[arg(short, long, default_value = "0")]
    margin: u32,

    /// Watermark width as a percentage of the shorter canvas dimension
    #[arg(short, long, default_value = "20")]
    scale: f32,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.scale <= 0.0 {
        eprintln!("Error: Scale must be greater than 0");
        process::exit(1);
    }

    if !cli.input.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input.display());
        process::exit(1);
    }

    for mark in [&cli.light, &cli.dark] {
        if !mark.is_file() {
            eprintln!("Error: Watermark file does not exist: {}", mark.display());
            process::exit(1);
        }
    }

    let options = PlacementOptions {
        anchor: Anchor::from_name(&cli.anchor),
        margin: cli.margin,
        scale_percent: cli.scale,
    };

    let compositor = match Compositor::load(&cli.light, &cli.dark, options) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Fatal: {e}");
            process::exit(1);
        }
    };

    if cli.input.is_dir() {
        run_batch(compositor, &cli);
    } else if is_supported_video(&cli.input) {
        run_video(compositor, &cli);
    } else {
        eprintln!(
            "Error: Input must be a directory of images or a video file (mp4/avi/mov/mkv)"
        );
        process::exit(1);
    }
}

fn run_batch(compositor: Compositor, cli: &Cli) {
    let source = cli.input.clone();
    let output = cli.output.clone();

    let task = Task::spawn(move |progress| {
        compositor.process_directory(&source, output.as_deref(), |pct| progress.send(pct))
    });
    let result = wait_with_progress(task, cli.quiet);

    print_run_result(&result, cli.quiet);

    if !cli.quiet {
        eprintln!(
            "[Summary] Written: {}, Failed: {} (Total: {})",
            result.outputs.len(),
            result.failures.len(),
            result.outputs.len() + result.failures.len()
        );
    }

    if !result.failures.is_empty() {
        process::exit(1);
    }
}

fn run_video(compositor: Compositor, cli: &Cli) {
    let Some(output_dir) = cli.output.clone() else {
        eprintln!("Error: Output directory is required for video runs");
        eprintln!("Usage: adaptive-watermark <video> <light> <dark> -o <output_dir>");
        process::exit(1);
    };
    let video = cli.input.clone();

    let task = Task::spawn(move |progress| {
        compositor.process_video(&video, &output_dir, |pct| progress.send(pct))
    });

    match wait_with_progress(task, cli.quiet) {
        Ok(path) => {
            if !cli.quiet {
                eprintln!("[OK] {}", path.display());
            }
        }
        Err(e) => {
            eprintln!("[FAIL] {}: {e}", cli.input.display());
            process::exit(1);
        }
    }
}

/// Poll the worker until it finishes, mirroring its progress into a bar.
fn wait_with_progress<T: Send + 'static>(task: Task<T>, quiet: bool) -> T {
    let bar = if quiet {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(100);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {percent}%")
                .unwrap()
                .progress_chars("=> "),
        );
        bar
    };

    while !task.is_finished() {
        if let Some(pct) = task.latest_progress() {
            bar.set_position(position_of(pct));
        }
        thread::sleep(Duration::from_millis(50));
    }
    if let Some(pct) = task.latest_progress() {
        bar.set_position(position_of(pct));
    }
    bar.finish_and_clear();

    task.join()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn position_of(pct: f32) -> u64 {
    pct.round().clamp(0.0, 100.0) as u64
}

fn print_run_result(result: &RunResult, quiet: bool) {
    if !quiet {
        for output in &result.outputs {
            eprintln!("[OK] {}", output.display());
        }
    }
    for failure in &result.failures {
        eprintln!("[FAIL] {}: {}", failure.path.display(), failure.reason);
    }
}
