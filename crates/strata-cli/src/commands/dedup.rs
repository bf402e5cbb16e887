use std::path::Path;

use strata_core::duplicates::DuplicateDetectionOptions;
use strata_core::error::StrataError;
use strata_core::model::LayerPrediction;
use strata_core::render::pdftoppm::PdftoppmRenderer;

use crate::output;

pub fn run(pdf_file: &Path, layers_file: &Path, output_format: &str) -> Result<(), StrataError> {
    let pdf_bytes = std::fs::read(pdf_file)?;
    let layers_json = std::fs::read(layers_file)?;
    let layers_per_page: Vec<Vec<LayerPrediction>> = serde_json::from_slice(&layers_json)
        .map_err(|e| StrataError::ParseError(format!("{}: {}", layers_file.display(), e)))?;
    let total: usize = layers_per_page.iter().map(Vec::len).sum();

    let renderer = PdftoppmRenderer::new();
    let layers = strata_core::deduplicate_pdf(
        &pdf_bytes,
        &renderer,
        layers_per_page,
        &DuplicateDetectionOptions::default(),
    )?;

    match output_format {
        "json" => output::json::print(&layers)?,
        _ => output::table::print_layers(&layers, total),
    }

    Ok(())
}
