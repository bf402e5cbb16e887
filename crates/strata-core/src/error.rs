use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StrataError {
    #[error("page rendering failed: {0}")]
    Render(String),

    #[error("pdftoppm not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftoppmNotFound,

    #[error("pdftoppm failed with exit code {code}: {stderr}")]
    PdftoppmFailed { code: i32, stderr: String },

    #[error("failed to decode page image: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to parse predictions: {0}")]
    ParseError(String),

    #[error("failed to load ground truth from {path}: {reason}")]
    GroundTruthLoad { path: PathBuf, reason: String },

    #[error("failed to load predictions from {path}: {reason}")]
    PredictionsLoad { path: PathBuf, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
