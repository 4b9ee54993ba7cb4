//! Core blemish removal engine and file helpers.

use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use tracing::debug;

use crate::blending::{self, BlendStats};
use crate::border::BorderedView;
use crate::config::RemovalConfig;
use crate::edges;
use crate::error::{Error, Result};
use crate::mask::BlemishMasks;
use crate::region::{self, box_origin};
use crate::search::{self, PatchChoice};
use crate::shape::{self, BlemishShape};
use crate::types::Point;

/// What the pipeline decided for one click.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovalReport {
    /// Click in original-image coordinates.
    pub click: Point,
    /// Click in padded coordinates; every other position here uses this space.
    pub padded_click: Point,
    /// Detected blemish, in box coordinates.
    pub shape: BlemishShape,
    /// Surround mean and scored candidates.
    pub patch: PatchChoice,
    /// Solver summary.
    pub blend: BlendStats,
}

/// A successful edit.
#[derive(Debug, Clone)]
pub struct Removal {
    /// Edited image, same dimensions as the input.
    pub image: RgbImage,
    /// How it was produced.
    pub report: RemovalReport,
}

/// Result of processing one click.
#[derive(Debug, Clone)]
pub enum ClickOutcome {
    /// The blemish was replaced.
    Edited(Box<Removal>),
    /// No boundary was found around the click; nothing changed.
    NoBlemish,
}

impl ClickOutcome {
    /// Whether the click produced an edit.
    #[must_use]
    pub fn is_edited(&self) -> bool {
        matches!(self, Self::Edited(_))
    }
}

/// Runs the per-click pipeline with a fixed, validated configuration.
///
/// Create once with [`BlemishRemover::new()`] and reuse for every click.
#[derive(Debug, Clone)]
pub struct BlemishRemover {
    config: RemovalConfig,
}

impl BlemishRemover {
    /// Create a remover after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for degenerate settings.
    pub fn new(config: RemovalConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    #[must_use]
    pub fn config(&self) -> &RemovalConfig {
        &self.config
    }

    /// Remove the blemish under `click`.
    ///
    /// `color` is the current working image and `gray` the analysis image
    /// produced once by [`preprocess`](crate::preprocess). Neither is
    /// modified; an edited copy is returned inside the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PointOutsideImage`] for clicks outside `color`, and
    /// [`Error::RegionOutOfBounds`] if an internal bounds invariant breaks.
    pub fn remove_at(
        &self,
        color: &RgbImage,
        gray: &GrayImage,
        click: Point,
    ) -> Result<ClickOutcome> {
        let config = &self.config;
        let size = config.box_size;

        let view = BorderedView::build(color, gray, click, config)?;
        let region = region::extract_box(&view.gray, view.point, size)?;

        let edge_mask = edges::edge_mask(&region, config.gradient_threshold);
        let Some(shape) = shape::locate_blemish(&edge_mask) else {
            debug!(x = click.x, y = click.y, "no blemish boundary near click");
            return Ok(ClickOutcome::NoBlemish);
        };

        let masks = BlemishMasks::build(&shape.circle, size);
        let patch = search::search_patch(&view.gray, &region, view.point, &masks.tight, config)?;
        let donor = search::donor_patch(&view.color, &patch.best, size)?;

        let mut padded = view.color;
        let blend = blending::seamless_clone(
            &mut padded,
            &donor,
            &masks.blend,
            box_origin(view.point, size),
            config.blend_iterations,
            config.blend_tolerance,
        )?;

        Ok(ClickOutcome::Edited(Box::new(Removal {
            image: view.transform.strip(&padded),
            report: RemovalReport {
                click,
                padded_click: view.point,
                shape,
                patch,
                blend,
            },
        })))
    }
}

/// Check if a file has a supported image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp"
        ),
        None => false,
    }
}

/// Decode an image file into an RGB raster.
///
/// # Errors
///
/// Returns [`Error::Image`] if the file is missing or cannot be decoded.
pub fn load_image(path: &Path) -> Result<RgbImage> {
    Ok(image::open(path)?.to_rgb8())
}

/// Save an RGB image with format-specific quality settings.
///
/// # Errors
///
/// Returns an error if the format is unsupported or writing fails.
pub fn save_image(img: &RgbImage, path: &Path) -> Result<()> {
    let format =
        ImageFormat::from_path(path).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

    match format {
        ImageFormat::Jpeg => {
            let file = std::fs::File::create(path)?;
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(file, 100);
            encoder.encode_image(&DynamicImage::ImageRgb8(img.clone()))?;
        }
        ImageFormat::Png | ImageFormat::WebP | ImageFormat::Bmp => {
            img.save_with_format(path, format)?;
        }
        _ => {
            return Err(Error::UnsupportedFormat(format!("{format:?}")));
        }
    }

    Ok(())
}

/// Generate a default output path from an input path.
///
/// Example: `"photo.jpg"` becomes `"photo_cleaned.jpg"`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let ext = input.extension().unwrap_or_default().to_string_lossy();
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_cleaned.{ext}"))
}
