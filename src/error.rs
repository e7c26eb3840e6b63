//! Error types for the bake/export pipeline.

use thiserror::Error;

/// Result type alias using ExporterError.
pub type Result<T> = std::result::Result<T, ExporterError>;

/// Main error type for bake and export operations.
#[derive(Error, Debug)]
pub enum ExporterError {
    /// Failed to read or parse a ZIP archive.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Failed to parse or write JSON data.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to read, resize or encode an image.
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Asset not present in the store.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// Asset data is structurally invalid (bad slot index, malformed file, ...).
    #[error("Invalid asset {path}: {reason}")]
    InvalidAsset { path: String, reason: String },

    /// Export settings rejected before any mutation.
    #[error("Invalid export settings: {0}")]
    InvalidSettings(String),

    /// Nothing selected for export.
    #[error("No static meshes selected for export")]
    EmptySelection,

    /// The baking capability failed for a mesh.
    #[error("Bake failed for {mesh}: {reason}")]
    Bake { mesh: String, reason: String },

    /// Failed to export a mesh or texture.
    #[error("Export error: {0}")]
    Export(String),
}

impl ExporterError {
    pub(crate) fn invalid_asset(path: impl ToString, reason: impl Into<String>) -> Self {
        ExporterError::InvalidAsset {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}
