use std::path::PathBuf;

use clap::Parser;

/// MemeTee API server
#[derive(Debug, Parser)]
#[command(name = "memetee", about = "AI meme generation API for the MemeTee landing page")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "memetee.toml", env = "MEMETEE_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "MEMETEE_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,
}
