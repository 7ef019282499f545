// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use lancache_bootstrap::pipeline;
use lancache_bootstrap::settings::{Layout, Settings};

/// Generate configuration for the lancache-dns container.
///
/// Reads the cache-domains catalog, decides which services are enabled and
/// emits the authoritative cache zone, the RPZ rewrite zone and the
/// templated resolver configuration consumed by BIND9.
#[derive(Debug, Parser)]
#[command(name = "lancache-bootstrap", version)]
struct Cli {
    /// Filesystem root the generated configuration hangs off of
    #[arg(long, default_value = "/")]
    root: PathBuf,

    /// Skip updating the cache-domains checkout (same as NOFETCH=true)
    #[arg(long)]
    skip_fetch: bool,
}

fn main() -> ExitCode {
    // Initialize logging with custom format
    // Respects RUST_LOG environment variable if set, otherwise defaults to INFO level
    // Respects RUST_LOG_FORMAT environment variable for output format (json or text)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let log_format = std::env::var("RUST_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }

    let cli = Cli::parse();

    let mut settings = Settings::from_env(Layout::new(cli.root));
    settings.skip_fetch = settings.skip_fetch || cli.skip_fetch;

    info!("Starting lancache-dns bootstrap");

    if let Err(e) = pipeline::run(&settings) {
        error!(reason = e.reason(), "Bootstrap failed: {e}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
