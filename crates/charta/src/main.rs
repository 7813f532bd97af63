//! Charta CLI - diagram-block transformer for chat-transcript pages.
//!
//! Provides commands for:
//! - `transform`: Render diagram code blocks in a saved chat page
//! - `platforms`: List supported chat platforms and their strategies

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::TransformArgs;
use output::Output;

/// Charta - diagram-block transformer for chat-transcript pages.
#[derive(Parser)]
#[command(name = "charta", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform diagram code blocks in a chat page into rendered diagrams.
    Transform(TransformArgs),
    /// List supported chat platforms.
    Platforms,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // Check if verbose flag is set for the transform command
    let verbose = matches!(&cli.command, Commands::Transform(args) if args.verbose);

    // Initialize tracing with appropriate log level
    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Transform(args) => {
            // Current-thread runtime: the pipeline's document tree is
            // single-threaded by construction and runs under a LocalSet.
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to create tokio runtime");
            let local = tokio::task::LocalSet::new();
            rt.block_on(local.run_until(args.execute(&output)))
        }
        Commands::Platforms => commands::platforms(&output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
