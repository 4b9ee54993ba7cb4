//! One-time smoothing of a freshly loaded image.
//!
//! A Gaussian low-pass removes fine sensor grain and a median (rank) filter
//! removes isolated outlier pixels. Neither pass alone handles both kinds of
//! noise. The smoothed color image doubles as a preview that makes blemishes
//! easier to spot; its grayscale version is the substrate for all edge
//! analysis. Edits are always applied to the unblurred image.

use image::{GrayImage, Luma, RgbImage};

use crate::config::RemovalConfig;

/// Output of [`preprocess`].
#[derive(Debug, Clone)]
pub struct Preprocessed {
    /// Smoothed color image, for display only.
    pub preview: RgbImage,
    /// Grayscale of the smoothed image, used for detection and patch search.
    pub analysis: GrayImage,
}

/// Smooth `image` and derive the grayscale analysis image.
#[must_use = "returns the preview and analysis images"]
pub fn preprocess(image: &RgbImage, config: &RemovalConfig) -> Preprocessed {
    let blurred = imageproc::filter::gaussian_blur_f32(image, config.blur_sigma);
    let preview =
        imageproc::filter::median_filter(&blurred, config.median_radius, config.median_radius);
    let analysis = to_grayscale(&preview);
    Preprocessed { preview, analysis }
}

/// Convert to grayscale with the luminance formula `0.299*R + 0.587*G + 0.114*B`.
#[must_use = "returns the grayscale image"]
pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let px = image.get_pixel(x, y);
        let lum = 0.299 * f32::from(px[0]) + 0.587 * f32::from(px[1]) + 0.114 * f32::from(px[2]);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let value = lum.round().clamp(0.0, 255.0) as u8;
        Luma([value])
    })
}
