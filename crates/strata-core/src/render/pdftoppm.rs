use crate::error::StrataError;
use crate::render::{PageBitmap, PageRenderer};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Resolution of one page unit (1/72 inch) at scale factor 1.
const POINTS_PER_INCH: f64 = 72.0;

const OUTPUT_PREFIX: &str = "page";

/// Page rendering backend using pdftoppm (from poppler-utils).
///
/// Renders grayscale PNGs at `72 * scale_factor` dpi so that one page unit
/// maps to `scale_factor` pixels.
pub struct PdftoppmRenderer;

impl PdftoppmRenderer {
    pub fn new() -> Self {
        PdftoppmRenderer
    }

    /// Check if pdftoppm is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftoppm")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftoppmRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageRenderer for PdftoppmRenderer {
    fn render_pages(
        &self,
        pdf_bytes: &[u8],
        scale_factor: f64,
    ) -> Result<Vec<PageBitmap>, StrataError> {
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| StrataError::Render(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| StrataError::Render(e.to_string()))?;
        let out_dir = tempfile::tempdir().map_err(|e| StrataError::Render(e.to_string()))?;

        let dpi = (POINTS_PER_INCH * scale_factor).round() as u32;
        let output = Command::new("pdftoppm")
            .arg("-gray")
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg(tmpfile.path())
            .arg(out_dir.path().join(OUTPUT_PREFIX))
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    StrataError::PdftoppmNotFound
                } else {
                    StrataError::Render(format!("pdftoppm failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(StrataError::PdftoppmFailed { code, stderr });
        }

        let files = collect_page_files(out_dir.path())?;
        tracing::debug!(pages = files.len(), dpi, "rendered pdf pages");

        files
            .into_iter()
            .map(|path| -> Result<PageBitmap, StrataError> {
                let image = image::open(&path)?.to_luma8();
                Ok(PageBitmap::from_image(image, scale_factor))
            })
            .collect()
    }

    fn backend_name(&self) -> &str {
        "pdftoppm"
    }
}

/// List rendered page files sorted by page number.
fn collect_page_files(dir: &Path) -> Result<Vec<PathBuf>, StrataError> {
    let mut numbered = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if let Some(number) = page_number_from_file_name(name) {
            numbered.push((number, path));
        }
    }
    numbered.sort_by_key(|(number, _)| *number);
    Ok(numbered.into_iter().map(|(_, path)| path).collect())
}

/// pdftoppm names pages `<prefix>-<n>.png`, zero-padding `n` to the width of
/// the page count (e.g. `page-07.png` in a 12 page document).
fn page_number_from_file_name(name: &str) -> Option<usize> {
    let stem = name.strip_suffix(".png")?;
    let rest = stem.strip_prefix(OUTPUT_PREFIX)?.strip_prefix('-')?;
    rest.parse().ok()
}
