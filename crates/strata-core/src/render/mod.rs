pub mod pdftoppm;

use image::GrayImage;

use crate::error::StrataError;

/// A grayscale rendering of one page together with the page size in page
/// units (the bitmap is `scale_factor` times larger).
#[derive(Debug, Clone)]
pub struct PageBitmap {
    pub image: GrayImage,
    pub width: f64,
    pub height: f64,
}

impl PageBitmap {
    pub fn new(image: GrayImage, width: f64, height: f64) -> Self {
        PageBitmap {
            image,
            width,
            height,
        }
    }

    /// Derive the page size from a bitmap rendered at `scale_factor`.
    pub fn from_image(image: GrayImage, scale_factor: f64) -> Self {
        let width = f64::from(image.width()) / scale_factor;
        let height = f64::from(image.height()) / scale_factor;
        PageBitmap {
            image,
            width,
            height,
        }
    }
}

/// Trait for PDF page rendering backends.
pub trait PageRenderer: Send + Sync {
    /// Render every page of the PDF to grayscale, in page order.
    fn render_pages(
        &self,
        pdf_bytes: &[u8],
        scale_factor: f64,
    ) -> Result<Vec<PageBitmap>, StrataError>;

    /// Name of this rendering backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
