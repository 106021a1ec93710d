//! The `docex` binary: extracts schema-validated JSON from documents.

mod cli;
mod commands;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Loaded before parsing so `.env` values feed the flags' env fallbacks.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries only JSON.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    commands::run(cli).await
}
