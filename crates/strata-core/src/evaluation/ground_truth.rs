use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use crate::error::StrataError;
use crate::metadata::GroundwaterInformation;

/// Hand-labelled ground truth, keyed by file name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroundTruth {
    pub files: BTreeMap<String, FileGroundTruth>,
}

impl GroundTruth {
    /// Load ground truth from a JSON file.
    pub fn load(path: &Path) -> Result<GroundTruth, StrataError> {
        let content = std::fs::read_to_string(path).map_err(|e| StrataError::GroundTruthLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| StrataError::GroundTruthLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    pub fn for_file(&self, file_name: &str) -> Option<&FileGroundTruth> {
        self.files.get(file_name)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl FromStr for GroundTruth {
    type Err = StrataError;

    /// Parse ground truth from a JSON string (no file path context).
    fn from_str(json: &str) -> Result<Self, Self::Err> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileGroundTruth {
    #[serde(default)]
    pub metadata: Option<GroundTruthMetadata>,
    #[serde(default)]
    pub layers: Vec<GroundTruthLayer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthLayer {
    pub material_description: String,
    #[serde(default)]
    pub depth_interval: Option<GroundTruthInterval>,
}

impl GroundTruthLayer {
    pub fn start(&self) -> Option<Decimal> {
        self.depth_interval.as_ref().and_then(|d| d.start)
    }

    pub fn end(&self) -> Option<Decimal> {
        self.depth_interval.as_ref().and_then(|d| d.end)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthInterval {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub start: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub end: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthCoordinates {
    #[serde(rename = "E")]
    pub east: f64,
    #[serde(rename = "N")]
    pub north: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthMetadata {
    #[serde(default)]
    pub coordinates: Option<GroundTruthCoordinates>,
    #[serde(default)]
    pub reference_elevation: Option<f64>,
    #[serde(default)]
    pub groundwater: Option<Vec<GroundwaterInformation>>,
}
