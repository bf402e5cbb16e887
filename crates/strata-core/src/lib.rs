pub mod duplicates;
pub mod error;
pub mod evaluation;
pub mod geometry;
pub mod line_index;
pub mod metadata;
pub mod model;
pub mod predictions;
pub mod render;
pub mod text;

use duplicates::DuplicateDetectionOptions;
use error::StrataError;
use evaluation::ground_truth::GroundTruth;
use evaluation::CorpusEvaluation;
use model::LayerPrediction;
use predictions::FilePredictions;
use render::PageRenderer;

/// Main API entry point: evaluate the predictions of a corpus against its
/// ground truth.
///
/// Every file is updated in place with its correctness flags. Files without
/// ground truth are skipped and listed in the result.
pub fn evaluate_corpus(
    predictions: &mut [FilePredictions],
    ground_truth: &GroundTruth,
) -> CorpusEvaluation {
    let mut corpus = CorpusEvaluation::default();

    for file in predictions.iter_mut() {
        let Some(file_ground_truth) = ground_truth.for_file(&file.file_name) else {
            tracing::warn!(file = %file.file_name, "no ground truth for file, skipping");
            corpus.skipped_files.push(file.file_name.clone());
            continue;
        };
        let evaluation = file.evaluate(file_ground_truth);
        tracing::debug!(
            file = %file.file_name,
            layer_f1 = evaluation.layers.f1(),
            depth_interval_f1 = evaluation.depth_interval.f1(),
            "evaluated file"
        );
        corpus.push(evaluation);
    }

    tracing::info!(
        files = corpus.files_evaluated(),
        skipped = corpus.skipped_files.len(),
        layer_f1 = corpus.layers.f1(),
        depth_interval_f1 = corpus.depth_interval.f1(),
        "corpus evaluation finished"
    );
    corpus
}

/// Render a PDF and remove the layers each page repeats from the page
/// before.
///
/// `layers_per_page[i]` holds the layers extracted from page `i`.
pub fn deduplicate_pdf(
    pdf_bytes: &[u8],
    renderer: &dyn PageRenderer,
    layers_per_page: Vec<Vec<LayerPrediction>>,
    options: &DuplicateDetectionOptions,
) -> Result<Vec<LayerPrediction>, StrataError> {
    // Single page documents cannot contain repeats.
    if layers_per_page.len() < 2 {
        return Ok(layers_per_page.into_iter().flatten().collect());
    }

    let pages = renderer.render_pages(pdf_bytes, options.scale_factor)?;
    tracing::debug!(
        backend = renderer.backend_name(),
        pages = pages.len(),
        "rendered pages for duplicate detection"
    );
    if pages.len() != layers_per_page.len() {
        tracing::warn!(
            rendered = pages.len(),
            expected = layers_per_page.len(),
            "page count differs from layer pages"
        );
    }

    Ok(duplicates::remove_duplicates_across_pages(
        &pages,
        layers_per_page,
        options,
    ))
}
