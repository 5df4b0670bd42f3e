//! DrumToy CLI: headless playback and WAV export.
//!
//! Usage:
//!   dt-cli path/to/song.dt42
//!   dt-cli path/to/song.dt42 --wav output.wav --seconds 30

use clap::Parser;
use dt_master::Controller;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(version, about = "Play or render a DT-42 song", long_about = None)]
struct Cli {
    /// Song file to load
    song: PathBuf,

    /// Render to this WAV file instead of playing
    #[arg(long)]
    wav: Option<PathBuf>,

    /// How long to render or play. Live playback runs until interrupted
    /// if not given.
    #[arg(long)]
    seconds: Option<u32>,

    /// Loop playback over steps START..END
    #[arg(long = "loop", num_args = 2, value_names = ["START", "END"])]
    loop_window: Option<Vec<usize>>,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

/// Length of an offline render when `--seconds` is not given.
const DEFAULT_RENDER_SECONDS: u32 = 30;

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    let mut ctrl = Controller::new();
    if let Err(e) = ctrl.load_song(&cli.song) {
        eprintln!("Failed to load {}: {}", cli.song.display(), e);
        return ExitCode::FAILURE;
    }

    println!("Song:     {}", ctrl.tag("TITLE").unwrap_or("(untitled)"));
    println!("Author:   {}", ctrl.tag("AUTHOR").unwrap_or("Unknown"));
    println!("Length:   {} steps", ctrl.song_length());
    println!();

    if let Some(window) = cli.loop_window.as_deref() {
        if let [start, end] = *window {
            ctrl.set_loop(start, end);
        }
    }

    let result = match &cli.wav {
        Some(path) => render_to_wav(&mut ctrl, path, cli.seconds.unwrap_or(DEFAULT_RENDER_SECONDS)),
        None => play_audio(&mut ctrl, cli.seconds),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn play_audio(ctrl: &mut Controller, seconds: Option<u32>) -> Result<(), dt_master::ControllerError> {
    let mut scope = ctrl.scope(dt_ir::SAMPLE_RATE as usize / 10);
    ctrl.play()?;
    println!("Playing...");

    let deadline = seconds.map(|s| Instant::now() + Duration::from_secs(s as u64));
    let (mut left, mut right) = (0.0f32, 0.0f32);
    while deadline.map_or(true, |d| Instant::now() < d) {
        if let Some((l, r)) = scope.drain_peak() {
            // Meter falls back slowly between refreshes
            left = l.max(left * 0.8);
            right = r.max(right * 0.8);
        }
        print!(
            "\rStep: {:5} | Tempo: {:5.1} | L {:<10} R {:<10}",
            ctrl.position(),
            ctrl.tempo(),
            meter(left),
            meter(right)
        );
        let _ = std::io::stdout().flush();
        std::thread::sleep(Duration::from_millis(20));
    }

    ctrl.stop()?;
    println!("\rDone.{:60}", "");
    Ok(())
}

fn meter(level: f32) -> String {
    let bars = (level.clamp(0.0, 1.0) * 10.0).round() as usize;
    "#".repeat(bars)
}

fn render_to_wav(ctrl: &mut Controller, path: &Path, seconds: u32) -> Result<(), dt_master::ControllerError> {
    println!("Rendering {}s to {} at {} Hz...", seconds, path.display(), dt_ir::SAMPLE_RATE);

    let wav = ctrl.render_to_wav(seconds);
    std::fs::write(path, &wav)?;

    println!("Wrote {} bytes", wav.len());
    Ok(())
}
