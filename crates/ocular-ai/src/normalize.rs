//! Decode an uploaded image and turn it into the classifier's input tensor.
//!
//! The output layout is NHWC `(1, 224, 224, 3)`, RGB, `f32` in `[0, 1]`.
//! Resampling uses bicubic (Catmull-Rom) interpolation and ignores the
//! source aspect ratio.

use image::RgbImage;
use image::imageops::{self, FilterType};
use tracing::debug;

use crate::error::InferenceError;

/// Side length of the square model input.
pub const INPUT_SIZE: u32 = 224;

/// RGB.
pub const INPUT_CHANNELS: usize = 3;

/// Interpolation used when resizing to the model input size.
pub const RESIZE_FILTER: FilterType = FilterType::CatmullRom;

/// Model input tensor, shape `(1, 224, 224, 3)`.
///
/// Only [`normalize`] and [`NormalizedTensor::from_rgb`] build one, so a
/// tensor handed to a classifier always has the expected shape and range.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor {
    data: Vec<f32>,
}

impl NormalizedTensor {
    pub const SHAPE: [usize; 4] = [1, INPUT_SIZE as usize, INPUT_SIZE as usize, INPUT_CHANNELS];

    /// Scale an RGB image into a tensor, resizing it first if needed.
    pub fn from_rgb(image: &RgbImage) -> Self {
        let data = if image.dimensions() == (INPUT_SIZE, INPUT_SIZE) {
            scale(image)
        } else {
            scale(&imageops::resize(image, INPUT_SIZE, INPUT_SIZE, RESIZE_FILTER))
        };
        Self { data }
    }

    pub fn shape(&self) -> [usize; 4] {
        Self::SHAPE
    }

    /// Flat NHWC data, `224 * 224 * 3` values.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// RGB values at row `y`, column `x`.
    pub fn pixel(&self, y: usize, x: usize) -> [f32; 3] {
        let offset = (y * INPUT_SIZE as usize + x) * INPUT_CHANNELS;
        [
            self.data[offset],
            self.data[offset + 1],
            self.data[offset + 2],
        ]
    }
}

/// Decode `bytes` (any supported format) into a normalized model input.
///
/// Alpha is dropped and grayscale/palette images are expanded to RGB before
/// resizing.
pub fn normalize(bytes: &[u8]) -> Result<NormalizedTensor, InferenceError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| {
        debug!(error = %e, len = bytes.len(), "image decode failed");
        InferenceError::InvalidImage(e)
    })?;

    debug!(
        width = decoded.width(),
        height = decoded.height(),
        color = ?decoded.color(),
        "decoded upload"
    );

    Ok(NormalizedTensor::from_rgb(&decoded.to_rgb8()))
}

fn scale(image: &RgbImage) -> Vec<f32> {
    // RgbImage is row-major with interleaved channels, i.e. already HWC.
    image.as_raw().iter().map(|&v| f32::from(v) / 255.0).collect()
}
