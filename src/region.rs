//! Square crops from padded images.

use image::{ImageBuffer, Pixel};

use crate::error::{Error, Result};
use crate::types::Point;

/// Crop a `size x size` square whose top-left corner is `top_left`.
///
/// # Errors
///
/// Returns [`Error::RegionOutOfBounds`] if any part of the square falls
/// outside `image`.
pub fn crop_square<P>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    top_left: Point,
    size: u32,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>>
where
    P: Pixel + 'static,
{
    let (x, y) = checked_origin(top_left, size, image.width(), image.height())?;
    Ok(image::imageops::crop_imm(image, x, y, size, size).to_image())
}

/// Crop the `size x size` box centered on `center` (the RegionExtractor step).
///
/// `size` must be odd so the box has a center pixel.
///
/// # Errors
///
/// Returns [`Error::RegionOutOfBounds`] if the box leaves `image`; given
/// the padding contract this indicates a broken invariant.
pub fn extract_box<P>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    center: Point,
    size: u32,
) -> Result<ImageBuffer<P, Vec<P::Subpixel>>>
where
    P: Pixel + 'static,
{
    crop_square(image, box_origin(center, size), size)
}

/// Top-left corner of the odd-sized box centered on `center`.
#[must_use]
pub fn box_origin(center: Point, size: u32) -> Point {
    #[allow(clippy::cast_possible_wrap)]
    let half = ((size - 1) / 2) as i32;
    center.offset(-half, -half)
}

/// Verify that a square fits inside `width x height` and return its origin.
///
/// # Errors
///
/// Returns [`Error::RegionOutOfBounds`] when it does not.
pub fn checked_origin(top_left: Point, size: u32, width: u32, height: u32) -> Result<(u32, u32)> {
    let x = i64::from(top_left.x);
    let y = i64::from(top_left.y);
    let fits = x >= 0
        && y >= 0
        && x + i64::from(size) <= i64::from(width)
        && y + i64::from(size) <= i64::from(height);
    if !fits {
        return Err(Error::RegionOutOfBounds {
            x,
            y,
            size,
            width,
            height,
        });
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let origin = (x as u32, y as u32);
    Ok(origin)
}
