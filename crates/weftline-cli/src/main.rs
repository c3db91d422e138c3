//! Weftline CLI
//!
//! Developer tool for creating, checking and inspecting artifact declarations.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use weftline_core::SerializationFormat;

mod commands;

/// Weftline - declarative integration artifacts
#[derive(Parser)]
#[command(name = "weftline")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a sample artifact to a directory
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,

        /// Artifact name (defaults to directory name)
        #[arg(short, long)]
        name: Option<String>,

        /// Output format (json or yaml)
        #[arg(short, long, default_value = "json")]
        format: SerializationFormat,
    },

    /// Check that an artifact file is well formed and structurally valid
    Validate {
        /// Artifact file (.json, .yaml or .yml)
        file: String,
    },

    /// Print the declaration found at a location
    Locate {
        /// Artifact file (.json, .yaml or .yml)
        file: String,

        /// Location such as `bridge/processors/0`
        #[arg(required_unless_present = "list")]
        location: Option<String>,

        /// List every addressable location instead
        #[arg(long, conflicts_with = "location")]
        list: bool,
    },

    /// Re-serialize an artifact, optionally in another format
    Convert {
        /// Artifact file (.json, .yaml or .yml)
        file: String,

        /// Target format (defaults to the format of the output file, then JSON)
        #[arg(short, long)]
        to: Option<SerializationFormat>,

        /// Single-line JSON output
        #[arg(long)]
        compact: bool,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    // Logs go to stderr so that command output on stdout stays parseable
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Init { path, name, format } => {
            commands::init::run(&path, name.as_deref(), format).await?;
        }
        Commands::Validate { file } => {
            commands::validate::run(&file).await?;
        }
        Commands::Locate {
            file,
            location,
            list,
        } => {
            if list {
                commands::locate::list(&file).await?;
            } else if let Some(location) = location {
                commands::locate::run(&file, &location).await?;
            }
        }
        Commands::Convert {
            file,
            to,
            compact,
            output,
        } => {
            commands::convert::run(&file, to, compact, output.as_deref()).await?;
        }
    }

    Ok(())
}
