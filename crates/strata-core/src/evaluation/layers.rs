use rust_decimal::Decimal;

use super::ground_truth::GroundTruthLayer;
use crate::model::LayerPrediction;
use crate::predictions::FilePredictions;
use crate::text::{parse_text, similarity_ratio};

/// Minimum similarity ratio for a material description to match a label.
pub const MATERIAL_MATCH_THRESHOLD: f64 = 0.9;

/// A ground truth layer that has not been claimed by a prediction yet.
struct UnmatchedLayer {
    text: String,
    start: Option<Decimal>,
    end: Option<Decimal>,
}

impl FilePredictions {
    /// Match every predicted layer against the labelled layers and set its
    /// correctness flags.
    ///
    /// Layers are matched greedily in prediction order; each labelled layer
    /// can be claimed once.
    pub fn evaluate_layers(&mut self, ground_truth_layers: &[GroundTruthLayer]) {
        let mut unmatched: Vec<UnmatchedLayer> = ground_truth_layers
            .iter()
            .map(|gt| UnmatchedLayer {
                text: parse_text(&gt.material_description),
                start: gt.start(),
                end: gt.end(),
            })
            .collect();

        for layer in &mut self.layers {
            match find_matching_layer(layer, &mut unmatched) {
                Some(depth_interval_is_correct) => {
                    layer.material_is_correct = Some(true);
                    layer.depth_interval_is_correct = Some(depth_interval_is_correct);
                }
                None => {
                    layer.material_is_correct = Some(false);
                    layer.depth_interval_is_correct = None;
                }
            }
        }
    }
}

/// Claim the label matching `layer` and tell whether the depth interval is
/// also correct. `None` when no label is similar enough.
fn find_matching_layer(
    layer: &LayerPrediction,
    unmatched: &mut Vec<UnmatchedLayer>,
) -> Option<bool> {
    let text = parse_text(&layer.material_description.text());
    let candidates: Vec<(usize, f64)> = unmatched
        .iter()
        .enumerate()
        .filter_map(|(index, gt)| {
            let ratio = similarity_ratio(&text, &gt.text);
            (ratio > MATERIAL_MATCH_THRESHOLD).then_some((index, ratio))
        })
        .collect();

    let (first, rest) = candidates.split_first()?;

    if let Some(interval) = &layer.depth_interval {
        let predicted = (interval.start_value(), interval.end_value());
        let exact = candidates.iter().find(|(index, _)| {
            let gt = &unmatched[*index];
            match predicted {
                // An open start means the layer starts at the surface.
                (None, Some(end)) => gt.start == Some(Decimal::ZERO) && gt.end == Some(end),
                (Some(start), Some(end)) => gt.start == Some(start) && gt.end == Some(end),
                _ => false,
            }
        });
        if let Some(&(index, _)) = exact {
            unmatched.remove(index);
            return Some(true);
        }
    }

    // Highest ratio wins, the earliest label on ties.
    let mut best = *first;
    for &candidate in rest {
        if candidate.1 > best.1 {
            best = candidate;
        }
    }
    unmatched.remove(best.0);
    Some(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::ground_truth::GroundTruthInterval;
    use crate::geometry::Rect;
    use crate::metadata::BoreholeMetaData;
    use crate::model::{
        AnnotatedInterval, BoundaryInterval, DepthColumnEntry, DepthInterval, MaterialDescription,
    };
    use rust_decimal_macros::dec;

    fn entry(value: Decimal) -> DepthColumnEntry {
        DepthColumnEntry {
            value,
            rect: Rect::new(0.0, 0.0, 5.0, 5.0),
            page_number: 1,
        }
    }

    fn predicted(text: &str, start: Option<Decimal>, end: Option<Decimal>) -> LayerPrediction {
        LayerPrediction::new(
            MaterialDescription::Annotated {
                text: text.into(),
                rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            },
            Some(DepthInterval::Boundary(BoundaryInterval {
                start: start.map(entry),
                end: end.map(entry),
            })),
        )
    }

    fn labelled(text: &str, start: Option<Decimal>, end: Option<Decimal>) -> GroundTruthLayer {
        GroundTruthLayer {
            material_description: text.into(),
            depth_interval: Some(GroundTruthInterval { start, end }),
        }
    }

    fn evaluate(
        layers: Vec<LayerPrediction>,
        gt: &[GroundTruthLayer],
    ) -> Vec<(Option<bool>, Option<bool>)> {
        let mut predictions =
            FilePredictions::new("f.pdf", "de", BoreholeMetaData::default(), layers);
        predictions.evaluate_layers(gt);
        predictions
            .layers
            .iter()
            .map(|l| (l.material_is_correct, l.depth_interval_is_correct))
            .collect()
    }

    #[test]
    fn test_open_start_matches_surface_layer() {
        let result = evaluate(
            vec![predicted("Clay, brown", None, Some(dec!(2.0)))],
            &[labelled("Clay, brown", Some(dec!(0)), Some(dec!(2.0)))],
        );
        assert_eq!(result, vec![(Some(true), Some(true))]);
    }

    #[test]
    fn test_open_start_does_not_match_deeper_layer() {
        let result = evaluate(
            vec![predicted("Clay, brown", None, Some(dec!(2.0)))],
            &[labelled("Clay, brown", Some(dec!(1)), Some(dec!(2.0)))],
        );
        assert_eq!(result, vec![(Some(true), Some(false))]);
    }

    #[test]
    fn test_explicit_interval_match() {
        let result = evaluate(
            vec![predicted("Sand, fine", Some(dec!(2)), Some(dec!(4.5)))],
            &[labelled("Sand, fine", Some(dec!(2.0)), Some(dec!(4.50)))],
        );
        assert_eq!(result, vec![(Some(true), Some(true))]);
    }

    #[test]
    fn test_material_match_with_wrong_interval() {
        let result = evaluate(
            vec![predicted("Sand, fine", Some(dec!(2)), Some(dec!(4)))],
            &[labelled("Sand, fine", Some(dec!(2)), Some(dec!(5)))],
        );
        assert_eq!(result, vec![(Some(true), Some(false))]);
    }

    #[test]
    fn test_no_candidate() {
        let result = evaluate(
            vec![predicted("Gravel", Some(dec!(0)), Some(dec!(1)))],
            &[labelled("Clay, brown", Some(dec!(0)), Some(dec!(1)))],
        );
        assert_eq!(result, vec![(Some(false), None)]);
    }

    #[test]
    fn test_layer_without_interval_takes_best_ratio() {
        let mut layer = predicted("Silt, clayey, grey", None, None);
        layer.depth_interval = None;
        let gt = [
            labelled("Silt, clayey, gray", Some(dec!(0)), Some(dec!(1))),
            labelled("Silt, clayey, grey", Some(dec!(1)), Some(dec!(2))),
        ];
        let mut predictions =
            FilePredictions::new("f.pdf", "de", BoreholeMetaData::default(), vec![layer]);
        predictions.evaluate_layers(&gt);
        assert_eq!(predictions.layers[0].material_is_correct, Some(true));
        assert_eq!(predictions.layers[0].depth_interval_is_correct, Some(false));

        // The exact text was claimed, the near match is still available.
        let second = predicted("Silt, clayey, grey", Some(dec!(0)), Some(dec!(1)));
        let result = evaluate(vec![predicted("Silt, clayey, grey", None, None), second], &gt);
        assert_eq!(result[1], (Some(true), Some(true)));
    }

    #[test]
    fn test_ground_truth_consumed_once() {
        let result = evaluate(
            vec![
                predicted("Clay, brown", Some(dec!(0)), Some(dec!(2))),
                predicted("Clay, brown", Some(dec!(0)), Some(dec!(2))),
            ],
            &[labelled("Clay, brown", Some(dec!(0)), Some(dec!(2)))],
        );
        assert_eq!(result, vec![(Some(true), Some(true)), (Some(false), None)]);
    }

    #[test]
    fn test_exact_interval_preferred_over_better_text() {
        // Both labels qualify; the second carries the predicted interval.
        let result = evaluate(
            vec![predicted("Silt, clayey, grey", Some(dec!(3)), Some(dec!(4)))],
            &[
                labelled("Silt, clayey, grey", Some(dec!(0)), Some(dec!(1))),
                labelled("Silt, clayey, gray", Some(dec!(3)), Some(dec!(4))),
            ],
        );
        assert_eq!(result, vec![(Some(true), Some(true))]);
    }

    #[test]
    fn test_greedy_order_is_preserved() {
        // The first prediction claims the only label even though the second
        // would have matched its interval exactly.
        let result = evaluate(
            vec![
                predicted("Clay, brown", Some(dec!(5)), Some(dec!(6))),
                predicted("Clay, brown", Some(dec!(0)), Some(dec!(2))),
            ],
            &[labelled("Clay, brown", Some(dec!(0)), Some(dec!(2)))],
        );
        assert_eq!(result, vec![(Some(true), Some(false)), (Some(false), None)]);
    }

    #[test]
    fn test_label_without_interval() {
        let gt = [GroundTruthLayer {
            material_description: "Fill".into(),
            depth_interval: None,
        }];
        let result = evaluate(vec![predicted("Fill", Some(dec!(0)), Some(dec!(1)))], &gt);
        assert_eq!(result, vec![(Some(true), Some(false))]);
    }

    #[test]
    fn test_annotated_interval() {
        let layer = LayerPrediction::new(
            MaterialDescription::Annotated {
                text: "Moraine".into(),
                rect: Rect::default(),
            },
            Some(DepthInterval::Annotated(AnnotatedInterval {
                start: Some(dec!(1.2)),
                end: Some(dec!(7)),
                background_rect: None,
            })),
        );
        let gt = [labelled("moraine", Some(dec!(1.2)), Some(dec!(7)))];
        let result = evaluate(vec![layer], &gt);
        assert_eq!(result, vec![(Some(true), Some(true))]);
    }
}
