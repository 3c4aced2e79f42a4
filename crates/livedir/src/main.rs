//! livedir CLI - live-reloading development file server.
//!
//! Serves the given directory (default: the current one) and reloads open
//! pages whenever a file under it changes.

mod commands;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use commands::ServeArgs;
use error::CliError;
use output::Output;

/// Log filter used when `RUST_LOG` isn't set.
const DEFAULT_FILTER: &str = "warn,livedir=info,livedir_server=info";

/// livedir - serve a directory with live reload.
#[derive(Parser)]
#[command(name = "livedir", version, about)]
struct Cli {
    #[command(flatten)]
    serve: ServeArgs,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO everywhere, otherwise RUST_LOG or the default filter
    let filter = if cli.serve.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Requests, socket events and watch events all share one thread
    let result = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::from)
        .and_then(|rt| rt.block_on(cli.serve.execute()));

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
