//! icos-shell - CLI interface for ICOS

use clap::Parser;
use tracing_subscriber::EnvFilter;

use icos_shell::cli::{self, Args};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    if let Err(e) = cli::run(args).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
