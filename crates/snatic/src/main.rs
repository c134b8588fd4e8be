//! snatic CLI - static site generator.
//!
//! Provides commands for:
//! - `check`: Verify the PHP and Composer installation
//! - `serve`: Serve the built site with PHP's development server
//! - `build`: Build the site into `site/`
//! - `upload`: Mirror `site/` to the SFTP target in `data/upload.yaml`
//! - `deploy`: `build` then `upload`

mod commands;
mod error;
mod output;
mod php;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{BuildArgs, DeployArgs, ServeArgs};
use output::Output;

/// snatic - static site generator.
#[derive(Parser)]
#[command(name = "snatic", version, about)]
struct Cli {
    /// Project root (default: nearest directory with data/site.yaml).
    #[arg(long, global = true, env = "SNATIC_ROOT")]
    root: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that PHP and Composer are installed.
    Check,
    /// Serve the built site locally.
    Serve(ServeArgs),
    /// Build the site.
    Build(BuildArgs),
    /// Upload the built site.
    Upload,
    /// Build and upload the site.
    Deploy(DeployArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    let root = cli.root.as_deref();
    let result = match &cli.command {
        Commands::Check => commands::check::execute(),
        Commands::Serve(args) => args.execute(root),
        Commands::Build(args) => args.execute(root),
        Commands::Upload => commands::upload::execute(root),
        Commands::Deploy(args) => args.execute(root),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

/// `--verbose` enables INFO level, otherwise `RUST_LOG` or WARN.
fn log_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    }
}
