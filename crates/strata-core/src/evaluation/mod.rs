pub mod ground_truth;
pub mod layers;
pub mod metadata;
pub mod metrics;

use serde::Serialize;
use std::collections::BTreeMap;

use metrics::{FileBoreholeMetadataMetrics, Metrics, MetricsTable, OverallBoreholeMetadataMetrics};

/// Scores of one evaluated file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileEvaluation {
    pub layers: Metrics,
    pub depth_interval: Metrics,
    pub metadata: FileBoreholeMetadataMetrics,
}

/// Scores of a whole corpus, summed over its files.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CorpusEvaluation {
    pub layers: Metrics,
    pub depth_interval: Metrics,
    pub metadata: OverallBoreholeMetadataMetrics,
    /// Files with predictions but no ground truth.
    pub skipped_files: Vec<String>,
}

impl CorpusEvaluation {
    pub fn push(&mut self, file: FileEvaluation) {
        self.layers += file.layers;
        self.depth_interval += file.depth_interval;
        self.metadata.push(file.metadata);
    }

    pub fn files_evaluated(&self) -> usize {
        self.metadata.len()
    }

    /// Corpus scores as one flat object: layer, depth interval, elevation and
    /// coordinate precision/recall/F1.
    pub fn to_json(&self) -> BTreeMap<String, f64> {
        let mut json = self.layers.to_json("layer");
        json.extend(self.depth_interval.to_json("depth_interval"));
        json.extend(self.metadata.get_cumulated_metrics());
        json
    }

    pub fn document_level_metrics(&self) -> MetricsTable {
        self.metadata.get_document_level_metrics()
    }
}
