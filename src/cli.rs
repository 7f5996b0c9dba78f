// cli.rs - Command-line interface configuration
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "parallax-hero")]
#[command(about = "Interactive parallax hero image", long_about = None)]
pub struct Cli {
    /// Color image (RGBA, PNG or any format with alpha support)
    #[arg(long)]
    pub color: PathBuf,

    /// Depth map (single channel, white = maximum displacement)
    #[arg(long)]
    pub depth: PathBuf,

    /// Dedicated alpha map; falls back to the color image's own alpha
    #[arg(long)]
    pub alpha: Option<PathBuf>,

    /// Effect settings JSON; built-in defaults when omitted
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Initial window width in pixels
    #[arg(long, default_value = "800")]
    pub width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value = "600")]
    pub height: u32,
}
