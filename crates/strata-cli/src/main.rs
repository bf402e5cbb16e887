mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "strata",
    version,
    about = "Evaluation and clean-up of borehole stratigraphy extraction"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score extracted layers and metadata against hand-labelled ground truth
    Evaluate {
        /// Predictions JSON, keyed by file name
        predictions: PathBuf,

        /// Ground truth JSON, keyed by file name
        ground_truth: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,

        /// Write the evaluated predictions (with correctness flags) to a JSON file
        #[arg(short = 'O', long = "out", value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Remove layers that a page repeats from the page before
    Dedup {
        /// The borehole profile PDF
        pdf_file: PathBuf,

        /// JSON array with the extracted layers of each page
        layers_file: PathBuf,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
}

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            error!(cause = %cause, "caused by");
            source = cause.source();
        }
        std::process::exit(1);
    }
}

fn run() -> Result<(), strata_core::error::StrataError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            predictions,
            ground_truth,
            output,
            out,
        } => commands::evaluate::run(&predictions, &ground_truth, &output, out),
        Commands::Dedup {
            pdf_file,
            layers_file,
            output,
        } => commands::dedup::run(&pdf_file, &layers_file, &output),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
