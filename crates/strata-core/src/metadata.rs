use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::Rect;

/// East values above this threshold are LV95, below it LV03.
pub const LV95_EAST_THRESHOLD: f64 = 2_000_000.0;

/// Swiss coordinate reference frames. LV95 = LV03 + (2'000'000, 1'000'000).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CoordinateSystem {
    LV95,
    LV03,
}

impl CoordinateSystem {
    pub fn from_east(east: f64) -> Self {
        if east > LV95_EAST_THRESHOLD {
            CoordinateSystem::LV95
        } else {
            CoordinateSystem::LV03
        }
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoordinateSystem::LV95 => write!(f, "LV95"),
            CoordinateSystem::LV03 => write!(f, "LV03"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateEntry {
    pub coordinate_value: f64,
    pub system: CoordinateSystem,
}

/// Extracted borehole location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "CoordinateJson", into = "CoordinateJson")]
pub struct Coordinate {
    pub east: CoordinateEntry,
    pub north: CoordinateEntry,
    pub rect: Option<Rect>,
    pub page: Option<usize>,
}

impl Coordinate {
    pub fn new(east: f64, north: f64) -> Self {
        let system = CoordinateSystem::from_east(east);
        Coordinate {
            east: CoordinateEntry {
                coordinate_value: east,
                system,
            },
            north: CoordinateEntry {
                coordinate_value: north,
                system,
            },
            rect: None,
            page: None,
        }
    }

    pub fn system(&self) -> CoordinateSystem {
        self.east.system
    }

    pub fn is_lv95(&self) -> bool {
        self.system() == CoordinateSystem::LV95
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CoordinateJson {
    #[serde(rename = "E")]
    east: f64,
    #[serde(rename = "N")]
    north: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rect: Option<Rect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    page: Option<usize>,
}

impl From<CoordinateJson> for Coordinate {
    fn from(json: CoordinateJson) -> Self {
        let mut coordinate = Coordinate::new(json.east, json.north);
        coordinate.rect = json.rect;
        coordinate.page = json.page;
        coordinate
    }
}

impl From<Coordinate> for CoordinateJson {
    fn from(c: Coordinate) -> Self {
        CoordinateJson {
            east: c.east.coordinate_value,
            north: c.north.coordinate_value,
            rect: c.rect,
            page: c.page,
        }
    }
}

/// Reference elevation of the borehole (metres above sea level).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Elevation {
    pub elevation: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rect: Option<Rect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
}

/// A groundwater measurement. The same record type holds both extracted
/// values and ground truth entries; the ground truth side owns the
/// comparison logic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundwaterInformation {
    #[serde(default)]
    pub depth: Option<f64>,
    #[serde(default)]
    pub elevation: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
}

// Two-digit years are tried first: `%Y` would also accept "16" as year 16.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%y", "%d.%m.%Y"];

impl GroundwaterInformation {
    /// All three fields match.
    pub fn is_extracted_information_correct(&self, extracted: &GroundwaterInformation) -> bool {
        self.is_extracted_depth_correct(extracted.depth)
            && self.is_extracted_elevation_correct(extracted.elevation)
            && self.is_extracted_date_correct(extracted.date.as_deref())
    }

    pub fn is_extracted_depth_correct(&self, depth: Option<f64>) -> bool {
        same_measurement(self.depth, depth)
    }

    pub fn is_extracted_elevation_correct(&self, elevation: Option<f64>) -> bool {
        same_measurement(self.elevation, elevation)
    }

    pub fn is_extracted_date_correct(&self, date: Option<&str>) -> bool {
        match (self.date.as_deref(), date) {
            (None, None) => true,
            (Some(expected), Some(actual)) => match (parse_date(expected), parse_date(actual)) {
                (Some(a), Some(b)) => a == b,
                _ => expected.trim() == actual.trim(),
            },
            _ => false,
        }
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Values are compared at centimetre precision.
fn same_measurement(expected: Option<f64>, actual: Option<f64>) -> bool {
    match (expected, actual) {
        (None, None) => true,
        (Some(a), Some(b)) => (a * 100.0).round() == (b * 100.0).round(),
        _ => false,
    }
}

/// Metadata extracted for one borehole profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoreholeMetaData {
    #[serde(default)]
    pub coordinates: Option<Coordinate>,
    #[serde(default)]
    pub elevation: Option<Elevation>,
    #[serde(default)]
    pub groundwater_information: Option<GroundwaterInformation>,
}
