//! Geofilter CLI - Command-line interface
//!
//! Normalizes geometry filters, resolves spatial references and shows the
//! effective configuration.

mod cli;
mod commands;
mod config_loader;
mod output;

use clap::Parser;
use cli::Cli;
use output::OutputWriter;

fn main() {
    // Initialize tracing; stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = OutputWriter::new(cli.json);

    if let Err(e) = commands::execute(cli, &output) {
        output.error(format!("{:#}", e));
        std::process::exit(1);
    }
}
