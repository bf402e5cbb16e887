pub mod correlation;
mod fft;

use image::imageops;

use crate::model::LayerPrediction;
use crate::render::PageBitmap;
use correlation::TemplateMatcher;

/// Tunables of the duplicate detection. The defaults were calibrated on the
/// labelled borehole dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateDetectionOptions {
    /// Pixels per page unit of the rendered bitmaps.
    pub scale_factor: f64,
    /// A layer is a duplicate when its best correlation exceeds this value.
    pub correlation_threshold: f64,
    /// Stop after this many consecutive non-duplicate layers.
    pub max_consecutive_non_duplicates: usize,
    /// Added below the description and kept free at the bottom of the pages.
    pub padding: f64,
    /// The patch always spans at least this horizontal band of the page.
    pub min_left_fraction: f64,
    pub min_right_fraction: f64,
}

impl Default for DuplicateDetectionOptions {
    fn default() -> Self {
        DuplicateDetectionOptions {
            scale_factor: 3.0,
            correlation_threshold: 0.62,
            max_consecutive_non_duplicates: 3,
            padding: 5.0,
            min_left_fraction: 0.2,
            min_right_fraction: 0.8,
        }
    }
}

/// Remove layers from the current page that repeat the end of the previous
/// page.
///
/// Multi-page tables often start a page with the last row(s) of the page
/// before. Page coordinates restart on every page, so the repeat can only be
/// recognised visually: each layer's description is cut out of the current
/// page bitmap and searched for in the previous page by template matching.
/// Everything before the last layer found on the previous page is dropped.
/// Once a run of layers is not found there, the overlap is over and the scan
/// stops.
///
/// The returned layers are sorted top to bottom.
pub fn remove_duplicate_layers(
    previous_page: &PageBitmap,
    current_page: &PageBitmap,
    mut layers: Vec<LayerPrediction>,
    options: &DuplicateDetectionOptions,
) -> Vec<LayerPrediction> {
    layers.sort_by(|a, b| {
        let a_top = a.material_description.rect().y0;
        let b_top = b.material_description.rect().y0;
        a_top.total_cmp(&b_top)
    });

    let matcher = TemplateMatcher::new(&previous_page.image);
    let mut duplicated_layer_index = 0;
    let mut consecutive_non_duplicates = 0;

    for (layer_index, layer) in layers.iter().enumerate() {
        if consecutive_non_duplicates >= options.max_consecutive_non_duplicates {
            tracing::debug!(layer_index, "no further page overlap, stopping");
            break;
        }

        let score = match layer_patch(previous_page, current_page, layer, options) {
            Some((x, y, w, h)) => {
                let patch = imageops::crop_imm(&current_page.image, x, y, w, h).to_image();
                matcher.max_correlation(&patch).unwrap_or_else(|e| {
                    tracing::debug!(layer_index, error = %e, "template matching failed");
                    0.0
                })
            }
            None => 0.0,
        };
        tracing::debug!(layer_index, score, "duplicate layer score");

        if score > options.correlation_threshold {
            duplicated_layer_index = layer_index;
            consecutive_non_duplicates = 0;
        } else {
            consecutive_non_duplicates += 1;
        }
    }

    layers.split_off(duplicated_layer_index)
}

/// Pixel rectangle `(x, y, width, height)` of the current page used as the
/// template for one layer, or `None` when it is empty.
fn layer_patch(
    previous_page: &PageBitmap,
    current_page: &PageBitmap,
    layer: &LayerPrediction,
    options: &DuplicateDetectionOptions,
) -> Option<(u32, u32, u32, u32)> {
    let rect = layer.material_description.rect();
    let scale = options.scale_factor;

    let x_start = scale * rect.x0.min(current_page.width * options.min_left_fraction);
    let x_end = scale
        * rect
            .x1
            .max(current_page.width * options.min_right_fraction)
            .min(previous_page.width - 1.0);
    // Never start above the description, otherwise too many layers are removed.
    let y_start = scale * rect.y0.max(0.0);
    // Keep the template smaller than both pages.
    let y_end = scale
        * (rect.y1 + options.padding)
            .min(previous_page.height - options.padding)
            .min(current_page.height - options.padding);

    // Truncate towards zero and clip to the current bitmap.
    let (img_w, img_h) = current_page.image.dimensions();
    let x0 = (x_start.max(0.0) as u32).min(img_w);
    let x1 = (x_end.max(0.0) as u32).min(img_w);
    let y0 = (y_start as u32).min(img_h);
    let y1 = (y_end.max(0.0) as u32).min(img_h);

    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some((x0, y0, x1 - x0, y1 - y0))
}

/// De-duplicate the layers of a whole document, page by page.
///
/// `layers_per_page[i]` holds the layers found on page `i`; `pages[i]` is
/// its bitmap. The first page is kept as is, every later page is compared
/// with its predecessor. Pages without a bitmap are kept unchanged.
pub fn remove_duplicates_across_pages(
    pages: &[PageBitmap],
    layers_per_page: Vec<Vec<LayerPrediction>>,
    options: &DuplicateDetectionOptions,
) -> Vec<LayerPrediction> {
    let mut result = Vec::new();
    for (page_index, layers) in layers_per_page.into_iter().enumerate() {
        if page_index == 0 || layers.is_empty() {
            result.extend(layers);
            continue;
        }
        match (pages.get(page_index - 1), pages.get(page_index)) {
            (Some(previous), Some(current)) => {
                let before = layers.len();
                let kept = remove_duplicate_layers(previous, current, layers, options);
                if kept.len() < before {
                    tracing::info!(
                        page = page_index + 1,
                        removed = before - kept.len(),
                        "removed layers repeated from previous page"
                    );
                }
                result.extend(kept);
            }
            _ => {
                tracing::warn!(page = page_index + 1, "no bitmap for page, keeping its layers");
                result.extend(layers);
            }
        }
    }
    result
}
