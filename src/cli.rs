//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "xsheet", version, about = "Animation exposure-sheet editor")]
pub struct Args {
    /// Project file (.json) to open on startup
    pub project: Option<PathBuf>,

    /// WAV file to load into the waveform column
    #[arg(short, long)]
    pub audio: Option<PathBuf>,

    /// Frames per second
    #[arg(long)]
    pub fps: Option<f64>,

    /// Sheet length in frames
    #[arg(long)]
    pub frames: Option<usize>,
}
