//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::config::PushMode;

/// Preview a markdown file in the browser, reloading on every save
#[derive(Parser, Debug, Clone)]
#[command(name = "mdview", version, about, long_about = None)]
pub struct Cli {
    /// Markdown file to preview
    #[arg(value_name = "FILE", value_hint = clap::ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Port to listen on (0 lets the OS choose)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<IpAddr>,

    /// Config file path
    #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// What to push to viewers on change
    #[arg(long, value_enum)]
    pub push: Option<PushMode>,

    /// Open the preview once the server is up
    #[arg(short, long)]
    pub open: bool,

    /// Print debug output
    #[arg(short, long)]
    pub verbose: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}

impl Cli {
    /// One-line usage string for error output.
    pub fn usage() -> String {
        use clap::CommandFactory;
        Self::command().render_usage().to_string()
    }
}
