//! Error types for the crop session, image store, and settings file.

use std::path::PathBuf;
use thiserror::Error;

/// Conditions raised by the crop-box geometry and the session controller.
///
/// Everything except [`CropError::NoSelection`] is recovered locally by the
/// caller (the operation is a no-op); `NoSelection` is shown to the user.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropError {
    /// A geometry query was made before any image finished loading.
    #[error("no image is loaded")]
    NoActiveImage,

    /// Target width/height is missing, zero, or not a number.
    #[error("target width and height must be positive integers")]
    UndefinedRatio,

    /// The resize step would shrink the box below the minimum content size.
    #[error("crop box would fall below the minimum size")]
    ResizeRejected,

    /// Save was requested without an image or without a crop box.
    #[error("nothing is selected to crop")]
    NoSelection,
}

/// Errors from listing, reading, and writing image files.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("folder not found: {path:?}")]
    FolderNotFound { path: PathBuf },

    #[error("image not found: {path:?}")]
    ImageNotFound { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Errors from loading or saving the settings file.
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("could not determine a configuration directory")]
    NoConfigDir,
}
