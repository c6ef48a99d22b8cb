use thiserror::Error;

/// Failure of one pass through the inference pipeline.
///
/// Only [`InvalidImage`](Self::InvalidImage) is the caller's fault; the other
/// variants are server-side conditions.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The upload could not be decoded as a supported raster image.
    #[error("Invalid image format. Supported formats: JPG, PNG, WEBP, PPM, BMP, TIFF.")]
    InvalidImage(#[source] image::ImageError),

    /// No scoring model was loaded at startup.
    #[error("Model not loaded")]
    ModelUnavailable,

    /// The model ran but failed or produced an unusable score vector.
    #[error(transparent)]
    Scoring(anyhow::Error),
}

impl InferenceError {
    /// Whether the error was caused by the submitted input.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidImage(_))
    }
}
