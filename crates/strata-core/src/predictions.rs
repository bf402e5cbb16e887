use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::StrataError;
use crate::evaluation::ground_truth::{
    FileGroundTruth, GroundTruth, GroundTruthCoordinates, GroundTruthInterval, GroundTruthLayer,
    GroundTruthMetadata,
};
use crate::evaluation::metrics::{BoreholeMetadataMetrics, FileBoreholeMetadataMetrics, Metrics};
use crate::evaluation::FileEvaluation;
use crate::metadata::BoreholeMetaData;
use crate::model::{LayerPrediction, PageSize};

/// Everything extracted from one borehole document.
///
/// Built once from the extraction output, then updated in place by
/// [`FilePredictions::evaluate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilePredictions {
    #[serde(skip)]
    pub file_name: String,
    pub language: String,
    pub metadata: BoreholeMetaData,
    pub layers: Vec<LayerPrediction>,
    /// Correctness per metadata field; `None` when it could not be decided.
    #[serde(default)]
    pub metadata_is_correct: BTreeMap<String, Option<bool>>,
    #[serde(default)]
    pub depths_materials_column_pairs: Vec<serde_json::Value>,
    #[serde(rename = "page_dimensions")]
    pub page_sizes: Vec<PageSize>,
}

impl FilePredictions {
    pub fn new(
        file_name: impl Into<String>,
        language: impl Into<String>,
        metadata: BoreholeMetaData,
        layers: Vec<LayerPrediction>,
    ) -> Self {
        FilePredictions {
            file_name: file_name.into(),
            language: language.into(),
            metadata,
            layers,
            metadata_is_correct: BTreeMap::new(),
            depths_materials_column_pairs: Vec::new(),
            page_sizes: Vec::new(),
        }
    }

    /// Build the predictions of one file from its entry in a predictions
    /// document.
    pub fn from_json(value: serde_json::Value, file_name: &str) -> Result<Self, StrataError> {
        let mut predictions: FilePredictions = serde_json::from_value(value)
            .map_err(|e| StrataError::ParseError(format!("{}: {}", file_name, e)))?;
        predictions.file_name = file_name.to_string();
        Ok(predictions)
    }

    /// Evaluate layers, then metadata, against the labels of this file.
    pub fn evaluate(&mut self, ground_truth: &FileGroundTruth) -> FileEvaluation {
        self.evaluate_layers(&ground_truth.layers);
        self.evaluate_metadata(ground_truth.metadata.as_ref());

        FileEvaluation {
            layers: self.layer_metrics(ground_truth.layers.len()),
            depth_interval: self.depth_interval_metrics(ground_truth.layers.len()),
            metadata: self.metadata_metrics(ground_truth.metadata.as_ref()),
        }
    }

    /// Layer counts after [`FilePredictions::evaluate_layers`]: a layer is a
    /// true positive when its material matched.
    pub fn layer_metrics(&self, ground_truth_layers: usize) -> Metrics {
        let tp = self
            .layers
            .iter()
            .filter(|l| l.material_is_correct == Some(true))
            .count();
        Metrics::new(
            tp,
            self.layers.len() - tp,
            ground_truth_layers.saturating_sub(tp),
        )
    }

    /// Only matched layers take part: a wrong interval on a matched layer is
    /// a false positive.
    pub fn depth_interval_metrics(&self, ground_truth_layers: usize) -> Metrics {
        let count = |flag: bool| {
            self.layers
                .iter()
                .filter(|l| l.depth_interval_is_correct == Some(flag))
                .count()
        };
        let tp = count(true);
        Metrics::new(tp, count(false), ground_truth_layers.saturating_sub(tp))
    }

    pub fn metadata_metrics(
        &self,
        ground_truth: Option<&GroundTruthMetadata>,
    ) -> FileBoreholeMetadataMetrics {
        use crate::evaluation::metadata::{COORDINATES_KEY, ELEVATION_KEY};

        let elevation_metrics = field_metrics(
            self.metadata_is_correct.get(ELEVATION_KEY).copied().flatten(),
            self.metadata.elevation.is_some(),
            ground_truth.is_some_and(|gt| gt.reference_elevation.is_some()),
        );
        let coordinates_metrics = field_metrics(
            self.metadata_is_correct.get(COORDINATES_KEY).copied().flatten(),
            self.metadata.coordinates.is_some(),
            ground_truth.is_some_and(|gt| gt.coordinates.is_some()),
        );
        FileBoreholeMetadataMetrics::new(
            self.file_name.clone(),
            BoreholeMetadataMetrics {
                elevation_metrics,
                coordinates_metrics,
            },
        )
    }

    /// Express these predictions in the ground truth format, e.g. to seed a
    /// new labelling round.
    pub fn convert_to_ground_truth(&self) -> GroundTruth {
        let layers = self
            .layers
            .iter()
            .map(|layer| GroundTruthLayer {
                material_description: layer.material_description.text(),
                depth_interval: layer.depth_interval.as_ref().map(|interval| {
                    GroundTruthInterval {
                        start: interval.start_value(),
                        end: interval.end_value(),
                    }
                }),
            })
            .collect();

        let metadata = GroundTruthMetadata {
            coordinates: self
                .metadata
                .coordinates
                .as_ref()
                .map(|c| GroundTruthCoordinates {
                    east: c.east.coordinate_value,
                    north: c.north.coordinate_value,
                }),
            reference_elevation: self.metadata.elevation.as_ref().map(|e| e.elevation),
            groundwater: self
                .metadata
                .groundwater_information
                .clone()
                .map(|gw| vec![gw]),
        };

        let mut ground_truth = GroundTruth::default();
        ground_truth.files.insert(
            self.file_name.clone(),
            FileGroundTruth {
                metadata: Some(metadata),
                layers,
            },
        );
        ground_truth
    }
}

/// Confusion counts of a single metadata field.
fn field_metrics(is_correct: Option<bool>, predicted: bool, labelled: bool) -> Metrics {
    match (is_correct, predicted, labelled) {
        (Some(true), _, _) => Metrics::new(1, 0, 0),
        (Some(false), _, _) => Metrics::new(0, 1, 1),
        (None, true, false) => Metrics::new(0, 1, 0),
        (None, false, true) => Metrics::new(0, 0, 1),
        (None, _, _) => Metrics::default(),
    }
}

/// Parse a predictions document: a JSON object keyed by file name. Files are
/// returned sorted by name.
pub fn parse_predictions(json: &str) -> Result<Vec<FilePredictions>, StrataError> {
    let files: BTreeMap<String, serde_json::Value> = serde_json::from_str(json)?;
    files
        .into_iter()
        .map(|(file_name, value)| FilePredictions::from_json(value, &file_name))
        .collect()
}

/// Load a predictions document from disk.
pub fn load_predictions(path: &Path) -> Result<Vec<FilePredictions>, StrataError> {
    let content = std::fs::read_to_string(path).map_err(|e| StrataError::PredictionsLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_predictions(&content).map_err(|e| StrataError::PredictionsLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}
