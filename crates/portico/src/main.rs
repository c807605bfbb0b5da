//! Portico CLI - build and preview a portfolio site.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "portico")]
#[command(about = "Build and preview a portfolio site from JSON data and Jinja templates")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to portico.toml config file
    #[arg(short, long, default_value = "portico.toml", global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a new site in the project directory
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Build the static site
    Build {
        /// Output directory (defaults to config or "dist")
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Preview an existing build
    Serve {
        /// Port to listen on (defaults to config or 8000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory to serve (defaults to the build output)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Open the site in a browser
        #[arg(long)]
        open: bool,
    },

    /// Build, then serve the output until interrupted
    Run {
        /// Port to listen on (defaults to config or 8000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Open the site in a browser
        #[arg(long)]
        open: bool,
    },

    /// Build, serve, and rebuild whenever sources change
    Dev {
        /// Port to listen on (defaults to config or 8000)
        #[arg(short, long)]
        port: Option<u16>,

        /// Open the site in a browser
        #[arg(long)]
        open: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    // Execute command
    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Build { output } => {
            commands::build::run(&cli.config, output).await?;
        }
        Commands::Serve { port, dir, open } => {
            commands::serve::run(&cli.config, port, dir, open).await?;
        }
        Commands::Run { port, open } => {
            commands::run::run(&cli.config, port, open).await?;
        }
        Commands::Dev { port, open } => {
            commands::dev::run(&cli.config, port, open).await?;
        }
    }

    Ok(())
}
