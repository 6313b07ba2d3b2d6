//! slate CLI - static blog generator.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "slate")]
#[command(about = "Static blog generator for Markdown posts")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Site root containing slate.toml
    #[arg(short, long, default_value = ".", global = true)]
    site: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a new site
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Build the static site
    Build {
        /// Output directory (defaults to config or "public")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip minification
        #[arg(long)]
        no_minify: bool,
    },

    /// Serve the site and rebuild on changes
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Open the site in a browser
        #[arg(long)]
        open: bool,
    },

    /// Create a new post
    New {
        /// Post title
        title: String,

        /// Comma-separated tags
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.site, yes).await?;
        }
        Commands::Build { output, no_minify } => {
            let minify = if no_minify { Some(false) } else { None };
            commands::build::run(&cli.site, output, minify).await?;
        }
        Commands::Serve { port, host, open } => {
            commands::serve::run(&cli.site, host, port, open).await?;
        }
        Commands::New { title, tags } => {
            commands::new::run(&cli.site, &title, tags).await?;
        }
    }

    Ok(())
}
