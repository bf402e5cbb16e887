use image::GrayImage;

use super::fft::{fft2d, Complex};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CorrelationError {
    #[error("template is empty")]
    EmptyTemplate,

    #[error("template {template_w}x{template_h} does not fit into image {image_w}x{image_h}")]
    TemplateTooLarge {
        template_w: u32,
        template_h: u32,
        image_w: u32,
        image_h: u32,
    },

    #[error("correlation produced a non-finite score")]
    NonFinite,
}

/// Normalized cross-correlation (correlation coefficient) of templates
/// against one search image.
///
/// The spectrum and the integral images of the search image are computed
/// once, so matching many templates against the same page only pays for the
/// template transforms.
///
/// Both transforms live on the page padded to the next power of two per
/// axis. An A4 page rendered at scale 3 (1785x2526 pixels) gives a
/// 2048x4096 grid of 16-byte complex values, 128 MiB per buffer, and one
/// match holds two of them.
pub struct TemplateMatcher {
    width: usize,
    height: usize,
    fft_rows: usize,
    fft_cols: usize,
    spectrum: Vec<Complex>,
    // (height + 1) x (width + 1) prefix sums of pixel values and squares.
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

impl TemplateMatcher {
    pub fn new(image: &GrayImage) -> Self {
        let width = image.width() as usize;
        let height = image.height() as usize;
        let fft_rows = height.max(1).next_power_of_two();
        let fft_cols = width.max(1).next_power_of_two();

        let mut spectrum = vec![Complex::default(); fft_rows * fft_cols];
        let stride = width + 1;
        let mut sum = vec![0.0; (height + 1) * stride];
        let mut sum_sq = vec![0.0; (height + 1) * stride];

        for y in 0..height {
            let mut row_sum = 0.0;
            let mut row_sum_sq = 0.0;
            for x in 0..width {
                let v = f64::from(image.get_pixel(x as u32, y as u32).0[0]);
                spectrum[y * fft_cols + x] = Complex::new(v, 0.0);
                row_sum += v;
                row_sum_sq += v * v;
                sum[(y + 1) * stride + x + 1] = sum[y * stride + x + 1] + row_sum;
                sum_sq[(y + 1) * stride + x + 1] = sum_sq[y * stride + x + 1] + row_sum_sq;
            }
        }
        fft2d(&mut spectrum, fft_rows, fft_cols, false);

        TemplateMatcher {
            width,
            height,
            fft_rows,
            fft_cols,
            spectrum,
            sum,
            sum_sq,
        }
    }

    /// Best correlation coefficient of `template` over all positions where it
    /// fits completely inside the search image. Ranges from -1 to 1.
    pub fn max_correlation(&self, template: &GrayImage) -> Result<f64, CorrelationError> {
        let tw = template.width() as usize;
        let th = template.height() as usize;
        if tw == 0 || th == 0 {
            return Err(CorrelationError::EmptyTemplate);
        }
        if tw > self.width || th > self.height {
            return Err(CorrelationError::TemplateTooLarge {
                template_w: template.width(),
                template_h: template.height(),
                image_w: self.width as u32,
                image_h: self.height as u32,
            });
        }

        let area = (tw * th) as f64;
        let mean = template.pixels().map(|p| f64::from(p.0[0])).sum::<f64>() / area;

        let mut product = vec![Complex::default(); self.fft_rows * self.fft_cols];
        let mut template_norm_sq = 0.0;
        for (x, y, p) in template.enumerate_pixels() {
            let centered = f64::from(p.0[0]) - mean;
            template_norm_sq += centered * centered;
            product[y as usize * self.fft_cols + x as usize] = Complex::new(centered, 0.0);
        }
        fft2d(&mut product, self.fft_rows, self.fft_cols, false);
        for (p, s) in product.iter_mut().zip(&self.spectrum) {
            *p = *s * p.conj();
        }
        fft2d(&mut product, self.fft_rows, self.fft_cols, true);

        let template_norm = template_norm_sq.sqrt();
        let stride = self.width + 1;
        let mut best = f64::NEG_INFINITY;
        for y in 0..=(self.height - th) {
            for x in 0..=(self.width - tw) {
                let window = |table: &[f64]| {
                    table[(y + th) * stride + x + tw] - table[y * stride + x + tw]
                        - table[(y + th) * stride + x]
                        + table[y * stride + x]
                };
                let s = window(&self.sum);
                let s2 = window(&self.sum_sq);
                let window_norm = (s2 - s * s / area).max(0.0).sqrt();

                // The template is zero-mean, so correlating it with the raw
                // window equals correlating it with the centered window.
                let numerator = product[y * self.fft_cols + x].re;
                let score = coefficient(numerator, window_norm * template_norm);
                if score > best {
                    best = score;
                }
            }
        }

        if best.is_finite() {
            Ok(best)
        } else {
            Err(CorrelationError::NonFinite)
        }
    }
}

/// Correlation coefficient from numerator and norm product. Flat windows
/// make the denominator vanish; those positions score 0.
fn coefficient(numerator: f64, denominator: f64) -> f64 {
    if numerator.abs() < denominator {
        numerator / denominator
    } else if numerator.abs() < denominator * 1.125 {
        numerator.signum()
    } else {
        0.0
    }
}
