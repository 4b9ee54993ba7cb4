//! Circular masks derived from the fitted blemish circle.
//!
//! Two masks coexist per click and are never interchanged:
//! the *tight* mask follows the detected circle and restricts mean
//! computations, the *blend* mask has the fixed radius `H` and bounds the
//! seamless clone so that blending always covers the whole blemish
//! regardless of detection noise.

use image::{GrayImage, Luma};
use imageproc::drawing::draw_filled_circle_mut;

use crate::types::Circle;

/// Value of pixels inside a mask.
pub const INSIDE: u8 = 255;

/// An immutable binary mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask(GrayImage);

impl Mask {
    /// Solid disc of `radius` at `center` on an all-zero `width x height` mask.
    ///
    /// The center and radius are truncated to whole pixels.
    #[must_use]
    pub fn disc(width: u32, height: u32, circle: &Circle) -> Self {
        let (center, radius) = circle.to_pixels();
        let mut image = GrayImage::new(width, height);
        draw_filled_circle_mut(&mut image, (center.x, center.y), radius, Luma([INSIDE]));
        Self(image)
    }

    /// Whether `(x, y)` is inside the mask. Out-of-range coordinates are outside.
    #[must_use]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.0.width() && y < self.0.height() && self.0.get_pixel(x, y)[0] != 0
    }

    /// Number of pixels inside the mask.
    #[must_use]
    pub fn area(&self) -> usize {
        self.0.pixels().filter(|p| p[0] != 0).count()
    }

    /// Mask width.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    /// Mask height.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// Borrow the underlying image.
    #[must_use]
    pub fn as_image(&self) -> &GrayImage {
        &self.0
    }
}

impl From<GrayImage> for Mask {
    /// Wrap a binary image; any non-zero pixel is inside.
    fn from(image: GrayImage) -> Self {
        Self(image)
    }
}

/// The pair of masks built for one click (the MaskBuilder step).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlemishMasks {
    /// Disc of the fitted radius; restricts mean computations.
    pub tight: Mask,
    /// Disc of radius `H` at the same center; bounds blending.
    pub blend: Mask,
}

impl BlemishMasks {
    /// Build both masks for a `box_size x box_size` box.
    #[must_use]
    pub fn build(circle: &Circle, box_size: u32) -> Self {
        let half = f64::from((box_size - 1) / 2);
        let blend_circle = Circle::new(circle.cx, circle.cy, half);
        Self {
            tight: Mask::disc(box_size, box_size, circle),
            blend: Mask::disc(box_size, box_size, &blend_circle),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disc_marks_center_and_excludes_corners() {
        let mask = Mask::disc(11, 11, &Circle::new(5.0, 5.0, 3.0));
        assert!(mask.contains(5, 5));
        assert!(mask.contains(8, 5));
        assert!(!mask.contains(9, 5));
        assert!(!mask.contains(0, 0));
        assert!(!mask.contains(40, 40));
    }

    #[test]
    fn wrapped_image_treats_nonzero_as_inside() {
        let mut img = GrayImage::new(4, 4);
        img.put_pixel(1, 2, Luma([1]));
        let mask = Mask::from(img);
        assert!(mask.contains(1, 2));
        assert_eq!(mask.area(), 1);
    }

    #[test]
    fn masks_share_center_but_not_radius() {
        let circle = Circle::new(17.4, 16.8, 5.9);
        let masks = BlemishMasks::build(&circle, 35);
        assert_eq!(masks.tight.width(), 35);
        assert_eq!(masks.blend.height(), 35);
        assert!(masks.tight.contains(17, 16));
        assert!(masks.blend.contains(17, 16));
        assert!(!masks.tight.contains(17, 30));
        assert!(masks.blend.contains(17, 30));
        assert!(masks.blend.area() > masks.tight.area());
    }

    #[test]
    fn tight_mask_is_subset_of_blend_mask() {
        let masks = BlemishMasks::build(&Circle::new(12.0, 20.0, 9.5), 35);
        for y in 0..35 {
            for x in 0..35 {
                if masks.tight.contains(x, y) {
                    assert!(masks.blend.contains(x, y), "({x}, {y}) only in tight mask");
                }
            }
        }
    }
}
