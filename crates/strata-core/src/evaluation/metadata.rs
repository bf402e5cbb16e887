use super::ground_truth::{GroundTruthCoordinates, GroundTruthMetadata};
use crate::metadata::{Coordinate, LV95_EAST_THRESHOLD};
use crate::predictions::FilePredictions;

pub const COORDINATES_KEY: &str = "coordinates";
pub const ELEVATION_KEY: &str = "elevation";
pub const GROUNDWATER_KEY: &str = "groundwater_information";
pub const GROUNDWATER_DEPTH_KEY: &str = "groundwater_information_depth";
pub const GROUNDWATER_ELEVATION_KEY: &str = "groundwater_information_elevation";
pub const GROUNDWATER_DATE_KEY: &str = "groundwater_information_date";

/// Maximum difference, in whole units, between extracted and labelled
/// coordinates.
pub const COORDINATE_TOLERANCE: i64 = 2;
/// LV95 = LV03 + (2'000'000, 1'000'000).
pub const LV95_EAST_OFFSET: i64 = 2_000_000;
pub const LV95_NORTH_OFFSET: i64 = 1_000_000;

/// Maximum difference between extracted and labelled elevation, in
/// centimetres.
const ELEVATION_TOLERANCE_CM: f64 = 10.0;

impl FilePredictions {
    /// Compare the extracted metadata with the labels and record the result
    /// in `metadata_is_correct`. A field missing on either side is recorded
    /// as `None`.
    pub fn evaluate_metadata(&mut self, ground_truth: Option<&GroundTruthMetadata>) {
        let coordinates = match (
            &self.metadata.coordinates,
            ground_truth.and_then(|gt| gt.coordinates.as_ref()),
        ) {
            (Some(extracted), Some(labelled)) => Some(coordinates_match(extracted, labelled)),
            _ => None,
        };
        self.metadata_is_correct
            .insert(COORDINATES_KEY.to_string(), coordinates);

        let elevation = match (
            &self.metadata.elevation,
            ground_truth.and_then(|gt| gt.reference_elevation),
        ) {
            (Some(extracted), Some(labelled)) => {
                let difference_cm = ((extracted.elevation - labelled) * 100.0).abs().round();
                Some(difference_cm <= ELEVATION_TOLERANCE_CM)
            }
            _ => None,
        };
        self.metadata_is_correct
            .insert(ELEVATION_KEY.to_string(), elevation);

        self.evaluate_groundwater(ground_truth);
    }

    fn evaluate_groundwater(&mut self, ground_truth: Option<&GroundTruthMetadata>) {
        let labelled = ground_truth
            .and_then(|gt| gt.groundwater.as_deref())
            .filter(|entries| !entries.is_empty());

        let flags = match (&self.metadata.groundwater_information, labelled) {
            (Some(extracted), Some(entries)) => {
                if entries.len() > 1 {
                    tracing::warn!(
                        file = %self.file_name,
                        entries = entries.len(),
                        "multiple groundwater entries in the ground truth, only the first is evaluated"
                    );
                }
                let expected = &entries[0];
                [
                    Some(expected.is_extracted_information_correct(extracted)),
                    Some(expected.is_extracted_depth_correct(extracted.depth)),
                    Some(expected.is_extracted_elevation_correct(extracted.elevation)),
                    Some(expected.is_extracted_date_correct(extracted.date.as_deref())),
                ]
            }
            _ => [None; 4],
        };

        let keys = [
            GROUNDWATER_KEY,
            GROUNDWATER_DEPTH_KEY,
            GROUNDWATER_ELEVATION_KEY,
            GROUNDWATER_DATE_KEY,
        ];
        for (key, flag) in keys.into_iter().zip(flags) {
            self.metadata_is_correct.insert(key.to_string(), flag);
        }
    }
}

/// Compare in whole units, after moving the labelled location into the
/// reference frame of the extracted one.
fn coordinates_match(extracted: &Coordinate, labelled: &GroundTruthCoordinates) -> bool {
    let extracted_east = extracted.east.coordinate_value;
    let (east_shift, north_shift) =
        if extracted_east > LV95_EAST_THRESHOLD && labelled.east < LV95_EAST_THRESHOLD {
            (LV95_EAST_OFFSET, LV95_NORTH_OFFSET)
        } else if extracted_east < LV95_EAST_THRESHOLD && labelled.east > LV95_EAST_THRESHOLD {
            (-LV95_EAST_OFFSET, -LV95_NORTH_OFFSET)
        } else {
            (0, 0)
        };

    let labelled_east = labelled.east.trunc() as i64 + east_shift;
    let labelled_north = labelled.north.trunc() as i64 + north_shift;
    let east = extracted_east.trunc() as i64;
    let north = extracted.north.coordinate_value.trunc() as i64;

    (east - labelled_east).abs() <= COORDINATE_TOLERANCE
        && (north - labelled_north).abs() <= COORDINATE_TOLERANCE
}
