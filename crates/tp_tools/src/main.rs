//! Turning Point - Authoring Tools

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tp_core::config::DEFAULT_OUTPUT_DIR;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "tp-tools")]
#[command(about = "Validate and export Turning Point templates")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a roster file
    Validate {
        /// Path to the roster (.ron or .json)
        roster: PathBuf,
    },
    /// Export a roster into symbol.json, index.json and data.json
    Export {
        /// Path to the roster (.ron or .json)
        roster: PathBuf,
        /// Output directory, replaced on success
        #[arg(long, env = "OUTPUT_ASSET", default_value = DEFAULT_OUTPUT_DIR)]
        out: PathBuf,
        /// Extra symbol, written before the id symbols (repeatable)
        #[arg(long = "symbol")]
        symbols: Vec<String>,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { roster } => {
            tracing::info!("Validating roster: {}", roster.display());
            tp_tools::validate::validate_roster(&roster).map(|_| ())
        }
        Commands::Export { roster, out, symbols } => {
            tracing::info!("Exporting roster {} into {}", roster.display(), out.display());
            tp_tools::export::export_roster(&roster, &out, &symbols).map(|summary| {
                tracing::info!(
                    resources = summary.resources,
                    symbols = summary.symbols,
                    bytes = summary.bytes,
                    "Export finished"
                );
            })
        }
    };

    if let Err(e) = result {
        tracing::error!("Failed: {e}");
        std::process::exit(1);
    }
}
