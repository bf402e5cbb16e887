//! Integration tests for the public entry points: corpus evaluation from
//! JSON documents and PDF de-duplication.
//!
//! De-duplication uses a MockRenderer that returns pre-built bitmaps, so
//! these tests run without poppler-utils.

use image::{GrayImage, Luma};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use strata_core::duplicates::DuplicateDetectionOptions;
use strata_core::error::StrataError;
use strata_core::evaluation::ground_truth::GroundTruth;
use strata_core::evaluation::metadata::{COORDINATES_KEY, ELEVATION_KEY, GROUNDWATER_KEY};
use strata_core::evaluation::metrics::Metrics;
use strata_core::geometry::Rect;
use strata_core::model::{LayerPrediction, MaterialDescription};
use strata_core::predictions::parse_predictions;
use strata_core::render::{PageBitmap, PageRenderer};
use strata_core::{deduplicate_pdf, evaluate_corpus};

const PREDICTIONS: &str = r#"{
    "BH-1.pdf": {
        "language": "de",
        "metadata": {
            "coordinates": {"E": 2600000.5, "N": 1200000.2},
            "elevation": {"elevation": 428.55},
            "groundwater_information": {"depth": 3.2, "date": "18.04.2016"}
        },
        "layers": [
            {
                "material_description": {"lines": [{"text": "Humus", "rect": [50, 100, 90, 110], "page": 1}]},
                "depth_interval": {
                    "start": null,
                    "end": {"value": 0.3, "rect": [10, 110, 20, 116], "page": 1}
                }
            },
            {
                "material_description": {"lines": [
                    {"text": "Kies,", "rect": [50, 120, 80, 130], "page": 1},
                    {"text": "sandig", "rect": [50, 132, 85, 142], "page": 1}
                ]},
                "depth_interval": {
                    "start": {"value": 0.3, "rect": [10, 110, 20, 116], "page": 1},
                    "end": {"value": 2.0, "rect": [10, 140, 20, 146], "page": 1}
                }
            },
            {
                "material_description": {"lines": [{"text": "Beton", "rect": [50, 150, 80, 160], "page": 1}]}
            }
        ],
        "page_dimensions": [{"width": 595, "height": 842}]
    },
    "BH-2.pdf": {
        "language": "fr",
        "metadata": {},
        "layers": [
            {
                "material_description": {"text": "Sable", "rect": [50, 100, 90, 110]},
                "depth_interval": {"start": 0, "end": 1}
            }
        ],
        "page_dimensions": [{"width": 595, "height": 842}]
    },
    "BH-3.pdf": {
        "language": "de",
        "metadata": {},
        "layers": [],
        "page_dimensions": []
    }
}"#;

const GROUND_TRUTH: &str = r#"{
    "BH-1.pdf": {
        "metadata": {
            "coordinates": {"E": 600000, "N": 200000},
            "reference_elevation": 428.5,
            "groundwater": [{"depth": 3.2, "date": "2016-04-18"}]
        },
        "layers": [
            {"material_description": "Humus", "depth_interval": {"start": 0, "end": 0.3}},
            {"material_description": "Kies, sandig", "depth_interval": {"start": 0.3, "end": 2.5}},
            {"material_description": "Lehm", "depth_interval": {"start": 2.5, "end": 4}}
        ]
    },
    "BH-2.pdf": {
        "metadata": {"coordinates": {"E": 600000, "N": 200000}},
        "layers": [
            {"material_description": "Sable", "depth_interval": {"start": 0, "end": 1}},
            {"material_description": "Limon", "depth_interval": {"start": 1, "end": 2}}
        ]
    }
}"#;

// ---------------------------------------------------------------------------
// Corpus evaluation
// ---------------------------------------------------------------------------
#[test]
fn corpus_evaluation_end_to_end() {
    let mut files = parse_predictions(PREDICTIONS).unwrap();
    let ground_truth: GroundTruth = GROUND_TRUTH.parse().unwrap();

    let corpus = evaluate_corpus(&mut files, &ground_truth);

    assert_eq!(corpus.files_evaluated(), 2);
    assert_eq!(corpus.skipped_files, vec!["BH-3.pdf"]);

    // BH-1: Humus exact (open start), Kies material only, Beton unmatched.
    let flags: Vec<_> = files[0]
        .layers
        .iter()
        .map(|l| (l.material_is_correct, l.depth_interval_is_correct))
        .collect();
    assert_eq!(
        flags,
        vec![
            (Some(true), Some(true)),
            (Some(true), Some(false)),
            (Some(false), None),
        ]
    );
    assert_eq!(files[1].layers[0].depth_interval_is_correct, Some(true));
    assert!(files[2].layers.is_empty());
    assert!(files[2].metadata_is_correct.is_empty());

    assert_eq!(files[0].metadata_is_correct[COORDINATES_KEY], Some(true));
    assert_eq!(files[0].metadata_is_correct[ELEVATION_KEY], Some(true));
    assert_eq!(files[0].metadata_is_correct[GROUNDWATER_KEY], Some(true));
    assert_eq!(files[1].metadata_is_correct[COORDINATES_KEY], None);

    assert_eq!(corpus.layers, Metrics::new(3, 1, 2));
    assert_eq!(corpus.depth_interval, Metrics::new(2, 1, 3));

    let metadata = corpus.metadata.cumulated();
    assert_eq!(metadata.coordinates_metrics, Metrics::new(1, 0, 1));
    assert_eq!(metadata.elevation_metrics, Metrics::new(1, 0, 0));

    let summary = corpus.to_json();
    assert_eq!(summary["layer_precision"], 0.75);
    assert_eq!(summary["coordinate_recall"], 0.5);
    assert_eq!(summary["elevation_f1"], 1.0);

    let table = corpus.document_level_metrics();
    let rows: Vec<_> = table
        .iter()
        .map(|r| (r.document_name.as_str(), r.elevation_f1, r.coordinate_f1))
        .collect();
    assert_eq!(rows, vec![("BH-1.pdf", 1.0, 1.0), ("BH-2.pdf", 0.0, 0.0)]);
}

#[test]
fn evaluated_predictions_serialize_flags() {
    let mut files = parse_predictions(PREDICTIONS).unwrap();
    let ground_truth: GroundTruth = GROUND_TRUTH.parse().unwrap();
    evaluate_corpus(&mut files, &ground_truth);

    let value = serde_json::to_value(&files[0]).unwrap();
    assert_eq!(value["layers"][0]["material_is_correct"], true);
    assert_eq!(value["layers"][2]["depth_interval_is_correct"], serde_json::Value::Null);
    assert_eq!(value["metadata_is_correct"]["coordinates"], true);
    assert_eq!(value["page_dimensions"][0]["width"], 595.0);
}

#[test]
fn evaluating_twice_gives_the_same_result() {
    let mut files = parse_predictions(PREDICTIONS).unwrap();
    let ground_truth: GroundTruth = GROUND_TRUTH.parse().unwrap();
    let first = evaluate_corpus(&mut files, &ground_truth);
    let second = evaluate_corpus(&mut files, &ground_truth);
    assert_eq!(first, second);
}

#[test]
fn predictions_round_trip_through_ground_truth() {
    let files = parse_predictions(PREDICTIONS).unwrap();
    let mut generated = GroundTruth::default();
    for file in &files {
        generated.files.extend(file.convert_to_ground_truth().files);
    }

    // Every material matches itself. Open or missing intervals never count
    // as correct against themselves.
    let mut files = files;
    let corpus = evaluate_corpus(&mut files, &generated);
    assert_eq!(corpus.layers, Metrics::new(4, 0, 0));
    assert_eq!(corpus.depth_interval, Metrics::new(2, 2, 2));
    assert!(corpus.skipped_files.is_empty());
}

#[test]
fn malformed_predictions_are_rejected() {
    let err = parse_predictions(r#"{"x.pdf": {"language": "de"}}"#).unwrap_err();
    assert!(matches!(err, StrataError::ParseError(_)));
}

// ---------------------------------------------------------------------------
// PDF de-duplication
// ---------------------------------------------------------------------------
struct MockRenderer {
    pages: Vec<PageBitmap>,
}

impl PageRenderer for MockRenderer {
    fn render_pages(
        &self,
        _pdf_bytes: &[u8],
        _scale_factor: f64,
    ) -> Result<Vec<PageBitmap>, StrataError> {
        Ok(self.pages.clone())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

struct MissingRenderer;

impl PageRenderer for MissingRenderer {
    fn render_pages(
        &self,
        _pdf_bytes: &[u8],
        _scale_factor: f64,
    ) -> Result<Vec<PageBitmap>, StrataError> {
        Err(StrataError::PdftoppmNotFound)
    }

    fn backend_name(&self) -> &str {
        "missing"
    }
}

fn noise(seed: u64) -> GrayImage {
    let mut rng = StdRng::seed_from_u64(seed);
    GrayImage::from_fn(300, 360, |_, _| Luma([rng.gen::<u8>()]))
}

fn layer(text: &str, y0: f64, y1: f64) -> LayerPrediction {
    LayerPrediction::new(
        MaterialDescription::Annotated {
            text: text.into(),
            rect: Rect::new(25.0, y0, 75.0, y1),
        },
        None,
    )
}

#[test]
fn deduplicate_pdf_drops_repeated_rows() {
    let first = noise(21);
    let other = noise(22);
    // The second page repeats the first 30 units of the first page.
    let second = GrayImage::from_fn(300, 360, |x, y| {
        if y < 90 {
            *first.get_pixel(x, y)
        } else {
            *other.get_pixel(x, y)
        }
    });
    let renderer = MockRenderer {
        pages: vec![
            PageBitmap::from_image(first, 3.0),
            PageBitmap::from_image(second, 3.0),
        ],
    };

    let layers_per_page = vec![
        vec![layer("p1-a", 5.0, 15.0), layer("p1-b", 12.0, 22.0)],
        vec![
            layer("new", 50.0, 60.0),
            layer("repeat-1", 5.0, 15.0),
            layer("repeat-2", 12.0, 22.0),
        ],
    ];

    let layers = deduplicate_pdf(
        b"%PDF",
        &renderer,
        layers_per_page,
        &DuplicateDetectionOptions::default(),
    )
    .unwrap();

    let texts: Vec<_> = layers
        .iter()
        .map(|l| l.material_description.text())
        .collect();
    // Everything before the last repeated row is dropped.
    assert_eq!(texts, vec!["p1-a", "p1-b", "repeat-2", "new"]);
}

#[test]
fn deduplicate_single_page_skips_rendering() {
    let layers = deduplicate_pdf(
        b"%PDF",
        &MissingRenderer,
        vec![vec![layer("only", 5.0, 15.0)]],
        &DuplicateDetectionOptions::default(),
    )
    .unwrap();
    assert_eq!(layers.len(), 1);
}

#[test]
fn deduplicate_propagates_render_errors() {
    let err = deduplicate_pdf(
        b"%PDF",
        &MissingRenderer,
        vec![vec![], vec![layer("a", 5.0, 15.0)]],
        &DuplicateDetectionOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, StrataError::PdftoppmNotFound));
}
