//! partload - fetch partitioned datasets from S3
//!
//! Derives the `type=/date=/partition=` prefixes of an account's dataset
//! and lists or downloads them with short-lived credentials.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use partload::commands::{self, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // --verbose wins over RUST_LOG; otherwise only warnings are shown.
    let filter = if cli.verbose {
        EnvFilter::new("debug,aws_config=info,aws_smithy_runtime=info,hyper=info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let exit_code = commands::execute(cli).await;

    std::process::exit(exit_code.as_i32());
}
