use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use strata_core::error::StrataError;
use strata_core::evaluation::ground_truth::GroundTruth;
use strata_core::predictions::load_predictions;

use crate::output;

pub fn run(
    predictions_file: &Path,
    ground_truth_file: &Path,
    output_format: &str,
    output_file: Option<PathBuf>,
) -> Result<(), StrataError> {
    let mut predictions = load_predictions(predictions_file)?;
    let ground_truth = GroundTruth::load(ground_truth_file)?;
    tracing::info!(
        files = predictions.len(),
        labelled = ground_truth.len(),
        "loaded predictions and ground truth"
    );

    let corpus = strata_core::evaluate_corpus(&mut predictions, &ground_truth);

    match output_format {
        "json" => output::json::print(&serde_json::json!({
            "summary": corpus.to_json(),
            "documents": corpus.document_level_metrics(),
            "skipped_files": corpus.skipped_files,
        }))?,
        _ => output::table::print_evaluation(&corpus),
    }

    if let Some(path) = output_file {
        // Same layout as the input: one entry per file name.
        let evaluated: BTreeMap<&str, _> = predictions
            .iter()
            .map(|p| (p.file_name.as_str(), p))
            .collect();
        let json = serde_json::to_string_pretty(&evaluated)?;
        std::fs::write(&path, json)?;
        eprintln!(
            "Evaluated {} file(s), written to {}",
            predictions.len(),
            path.display()
        );
    }

    Ok(())
}
