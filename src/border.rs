//! Reflective padding and the original-to-padded coordinate transform.
//!
//! Every click is analysed on padded copies of the color and grayscale
//! images so that a box, and the whole patch-search grid around it, has a
//! complete neighbourhood even at the image corners. Reflection instead of
//! a constant fill keeps the border free of artificial edges.
//!
//! All stages after [`BorderedView::build`] work in padded coordinates.

use image::{GrayImage, ImageBuffer, Pixel, RgbImage};

use crate::config::{BorderMode, RemovalConfig};
use crate::error::{Error, Result};
use crate::types::Point;

/// Map a possibly out-of-range index into `0..len` by mirroring without
/// repeating the edge sample (`BORDER_REFLECT_101`).
///
/// Handles offsets larger than `len` by reflecting repeatedly.
#[must_use]
pub fn reflect_101(index: i64, len: u32) -> u32 {
    let len = i64::from(len);
    if len <= 1 {
        return 0;
    }
    let period = 2 * (len - 1);
    let mut i = index.rem_euclid(period);
    if i >= len {
        i = period - i;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let mapped = i as u32;
    mapped
}

/// Pad `image` by `pad` pixels on every side using `mode`.
#[must_use = "returns the padded image"]
pub fn pad_image<P>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    pad: u32,
    mode: BorderMode,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel,
{
    let (w, h) = image.dimensions();
    match mode {
        BorderMode::Reflect101 => ImageBuffer::from_fn(w + 2 * pad, h + 2 * pad, |x, y| {
            let sx = reflect_101(i64::from(x) - i64::from(pad), w);
            let sy = reflect_101(i64::from(y) - i64::from(pad), h);
            *image.get_pixel(sx, sy)
        }),
    }
}

/// Explicit translation between original-image and padded-image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadTransform {
    pad: u32,
    width: u32,
    height: u32,
}

impl PadTransform {
    /// Transform for an original image of `width x height` padded by `pad`.
    #[must_use]
    pub const fn new(pad: u32, width: u32, height: u32) -> Self {
        Self { pad, width, height }
    }

    /// Padding on each side.
    #[must_use]
    pub const fn pad(&self) -> u32 {
        self.pad
    }

    /// Move a point from original into padded coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PointOutsideImage`] if `point` is not inside the
    /// original image.
    pub fn to_padded(&self, point: Point) -> Result<Point> {
        let inside = point.x >= 0
            && point.y >= 0
            && i64::from(point.x) < i64::from(self.width)
            && i64::from(point.y) < i64::from(self.height);
        if !inside {
            return Err(Error::PointOutsideImage {
                x: i64::from(point.x),
                y: i64::from(point.y),
                width: self.width,
                height: self.height,
            });
        }
        #[allow(clippy::cast_possible_wrap)]
        let pad = self.pad as i32;
        Ok(point.offset(pad, pad))
    }

    /// Strip the padding, returning an image of the original dimensions.
    #[must_use = "returns the cropped image"]
    pub fn strip<P>(
        &self,
        padded: &ImageBuffer<P, Vec<P::Subpixel>>,
    ) -> ImageBuffer<P, Vec<P::Subpixel>>
    where
        P: Pixel + 'static,
    {
        image::imageops::crop_imm(padded, self.pad, self.pad, self.width, self.height).to_image()
    }
}

/// Padded color and grayscale views for a single click.
#[derive(Debug, Clone)]
pub struct BorderedView {
    /// Padded working color image.
    pub color: RgbImage,
    /// Padded grayscale analysis image.
    pub gray: GrayImage,
    /// Click location in padded coordinates.
    pub point: Point,
    /// The translation that produced `point`.
    pub transform: PadTransform,
}

impl BorderedView {
    /// Pad both images by `S + H` and translate `click` into padded space.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PointOutsideImage`] if `click` is outside `color`.
    pub fn build(
        color: &RgbImage,
        gray: &GrayImage,
        click: Point,
        config: &RemovalConfig,
    ) -> Result<Self> {
        let pad = config.pad_width();
        let transform = PadTransform::new(pad, color.width(), color.height());
        let point = transform.to_padded(click)?;
        Ok(Self {
            color: pad_image(color, pad, config.border),
            gray: pad_image(gray, pad, config.border),
            point,
            transform,
        })
    }
}
