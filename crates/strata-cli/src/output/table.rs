use strata_core::evaluation::metrics::Metrics;
use strata_core::evaluation::CorpusEvaluation;
use strata_core::model::LayerPrediction;

pub fn print_evaluation(corpus: &CorpusEvaluation) {
    println!(
        "=== Corpus ({} file(s) evaluated) ===\n",
        corpus.files_evaluated()
    );

    let cumulated = corpus.metadata.cumulated();
    let rows = [
        ("Layers", corpus.layers),
        ("Depth intervals", corpus.depth_interval),
        ("Coordinates", cumulated.coordinates_metrics),
        ("Elevation", cumulated.elevation_metrics),
    ];
    println!(
        "  {:<16} {:>9} {:>9} {:>9} {:>5} {:>5} {:>5}",
        "Feature", "Precision", "Recall", "F1", "TP", "FP", "FN"
    );
    for (name, metrics) in &rows {
        print_metrics_row(name, metrics);
    }
    println!();

    let table = corpus.document_level_metrics();
    if !table.is_empty() {
        let width = table
            .iter()
            .map(|r| r.document_name.len())
            .max()
            .unwrap_or(8)
            .max(8);
        println!("  {:<width$}  {:>9}  {:>9}", "Document", "Elevation", "Coordinate");
        for row in table.iter() {
            println!(
                "  {:<width$}  {:>9.3}  {:>9.3}",
                row.document_name, row.elevation_f1, row.coordinate_f1
            );
        }
        println!();
    }

    if !corpus.skipped_files.is_empty() {
        println!(
            "  Skipped (no ground truth): {}",
            corpus.skipped_files.join(", ")
        );
    }
}

fn print_metrics_row(name: &str, metrics: &Metrics) {
    println!(
        "  {:<16} {:>9.3} {:>9.3} {:>9.3} {:>5} {:>5} {:>5}",
        name,
        metrics.precision(),
        metrics.recall(),
        metrics.f1(),
        metrics.tp,
        metrics.fp,
        metrics.fn_
    );
}

pub fn print_layers(layers: &[LayerPrediction], total: usize) {
    println!("Kept {} of {} layer(s)\n", layers.len(), total);
    for layer in layers {
        println!("  {layer}");
    }
}
