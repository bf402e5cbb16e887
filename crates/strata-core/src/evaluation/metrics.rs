use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Confusion counts of one extracted feature.
///
/// Corpus scores are always derived from summed counts, never by averaging
/// per-file scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    pub tp: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
}

impl Metrics {
    pub fn new(tp: usize, fp: usize, fn_: usize) -> Self {
        Metrics { tp, fp, fn_ }
    }

    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    pub fn f1(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        }
    }

    /// `{<feature>_precision, <feature>_recall, <feature>_f1}`.
    pub fn to_json(&self, feature: &str) -> BTreeMap<String, f64> {
        BTreeMap::from([
            (format!("{feature}_precision"), self.precision()),
            (format!("{feature}_recall"), self.recall()),
            (format!("{feature}_f1"), self.f1()),
        ])
    }

    pub fn from_metric_list<'a, I>(metrics: I) -> Metrics
    where
        I: IntoIterator<Item = &'a Metrics>,
    {
        metrics.into_iter().copied().sum()
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl Add for Metrics {
    type Output = Metrics;

    fn add(self, other: Metrics) -> Metrics {
        Metrics::new(self.tp + other.tp, self.fp + other.fp, self.fn_ + other.fn_)
    }
}

impl AddAssign for Metrics {
    fn add_assign(&mut self, other: Metrics) {
        *self = *self + other;
    }
}

impl Sum for Metrics {
    fn sum<I: Iterator<Item = Metrics>>(iter: I) -> Metrics {
        iter.fold(Metrics::default(), Add::add)
    }
}

/// Metadata scores of one borehole profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoreholeMetadataMetrics {
    pub elevation_metrics: Metrics,
    pub coordinates_metrics: Metrics,
}

impl BoreholeMetadataMetrics {
    pub fn to_json(&self) -> BTreeMap<String, f64> {
        let mut json = self.elevation_metrics.to_json("elevation");
        json.extend(self.coordinates_metrics.to_json("coordinate"));
        json
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileBoreholeMetadataMetrics {
    pub filename: String,
    #[serde(flatten)]
    pub metrics: BoreholeMetadataMetrics,
}

impl FileBoreholeMetadataMetrics {
    pub fn new(filename: impl Into<String>, metrics: BoreholeMetadataMetrics) -> Self {
        FileBoreholeMetadataMetrics {
            filename: filename.into(),
            metrics,
        }
    }

    /// Single-row table for this file.
    pub fn get_document_level_metrics(&self) -> MetricsTable {
        MetricsTable {
            rows: vec![DocumentMetricsRow {
                document_name: self.filename.clone(),
                elevation_f1: self.metrics.elevation_metrics.f1(),
                coordinate_f1: self.metrics.coordinates_metrics.f1(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetricsRow {
    pub document_name: String,
    pub elevation_f1: f64,
    pub coordinate_f1: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricsTable {
    pub rows: Vec<DocumentMetricsRow>,
}

impl MetricsTable {
    /// Append the rows of all tables, in order.
    pub fn concat(tables: impl IntoIterator<Item = MetricsTable>) -> MetricsTable {
        MetricsTable {
            rows: tables.into_iter().flat_map(|t| t.rows).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DocumentMetricsRow> {
        self.rows.iter()
    }
}

/// Metadata metrics of a whole corpus, in the order files were added.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallBoreholeMetadataMetrics {
    pub borehole_metadata_metrics: Vec<FileBoreholeMetadataMetrics>,
}

impl OverallBoreholeMetadataMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, metrics: FileBoreholeMetadataMetrics) {
        self.borehole_metadata_metrics.push(metrics);
    }

    pub fn len(&self) -> usize {
        self.borehole_metadata_metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.borehole_metadata_metrics.is_empty()
    }

    /// Summed elevation and coordinate counts over all files.
    pub fn cumulated(&self) -> BoreholeMetadataMetrics {
        let files = &self.borehole_metadata_metrics;
        BoreholeMetadataMetrics {
            elevation_metrics: Metrics::from_metric_list(
                files.iter().map(|f| &f.metrics.elevation_metrics),
            ),
            coordinates_metrics: Metrics::from_metric_list(
                files.iter().map(|f| &f.metrics.coordinates_metrics),
            ),
        }
    }

    pub fn get_cumulated_metrics(&self) -> BTreeMap<String, f64> {
        self.cumulated().to_json()
    }

    pub fn get_document_level_metrics(&self) -> MetricsTable {
        MetricsTable::concat(
            self.borehole_metadata_metrics
                .iter()
                .map(FileBoreholeMetadataMetrics::get_document_level_metrics),
        )
    }
}
