//! Donor patch search.
//!
//! The texture around the blemish is summarised by one number: the mean of
//! the box outside the tight mask. Every cell of a `k x k` grid around the
//! click (the center cell excepted) is scored by how far the tight-masked
//! mean of its own square lies from that number. The lowest score wins;
//! ties go to the first cell in row-major order.

use image::{GrayImage, RgbImage};
use tracing::debug;

use crate::config::RemovalConfig;
use crate::error::{Error, Result};
use crate::mask::Mask;
use crate::region::{box_origin, checked_origin, crop_square};
use crate::types::Point;

/// Largest possible 8-bit pixel value, the worst possible score.
pub const MAX_PIXEL_VALUE: f64 = 255.0;

/// A scored candidate square, in padded coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Row-major index in the grid, counting the skipped center cell.
    pub cell: u32,
    /// Center of the square.
    pub center: Point,
    /// Top-left corner of the square.
    pub top_left: Point,
    /// Absolute difference between the candidate mean and the surround mean.
    pub score: f64,
}

/// Outcome of [`search_patch`].
#[derive(Debug, Clone, PartialEq)]
pub struct PatchChoice {
    /// Mean of the box outside the tight mask.
    pub surround_mean: f64,
    /// The winning candidate.
    pub best: Candidate,
    /// Every scored candidate in row-major order.
    pub candidates: Vec<Candidate>,
}

/// Mean of `image` over pixels where `mask` is set (or unset, if `outside`).
///
/// The mask is laid over `image` with its origin at `origin`. Returns 0 when
/// no pixel qualifies.
#[must_use]
pub fn masked_mean(image: &GrayImage, origin: (u32, u32), mask: &Mask, outside: bool) -> f64 {
    let mut sum = 0u64;
    let mut count = 0u64;
    for y in 0..mask.height() {
        for x in 0..mask.width() {
            if mask.contains(x, y) != outside {
                sum += u64::from(image.get_pixel(origin.0 + x, origin.1 + y)[0]);
                count += 1;
            }
        }
    }
    if count == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let mean = sum as f64 / count as f64;
    mean
}

/// Candidate centers around `click` in row-major order, center cell excluded.
///
/// Offsets are `(i - k/2) * S / (k/2)` on each axis, so the outermost ring
/// sits exactly one box width from the click.
#[must_use]
pub fn grid_centers(click: Point, config: &RemovalConfig) -> Vec<(u32, Point)> {
    let k = config.grid_size;
    #[allow(clippy::cast_possible_wrap)]
    let (half, size) = (config.grid_half() as i32, config.box_size as i32);
    let offset = |i: u32| {
        #[allow(clippy::cast_possible_wrap)]
        let i = i as i32;
        (i - half) * size / half
    };

    let mut centers = Vec::new();
    for row in 0..k {
        for col in 0..k {
            if row == k / 2 && col == k / 2 {
                continue;
            }
            centers.push((row * k + col, click.offset(offset(col), offset(row))));
        }
    }
    centers
}

/// Find the donor patch for a click (the PatchSearch step).
///
/// `gray` is the padded analysis image, `region` the box cropped around
/// `click` from it, `tight` the tight mask in box coordinates.
///
/// # Errors
///
/// Returns [`Error::RegionOutOfBounds`] if a candidate square would leave
/// `gray`, and [`Error::InvalidConfig`] if the grid has no cells.
pub fn search_patch(
    gray: &GrayImage,
    region: &GrayImage,
    click: Point,
    tight: &Mask,
    config: &RemovalConfig,
) -> Result<PatchChoice> {
    let size = config.box_size;
    let surround_mean = masked_mean(region, (0, 0), tight, true);

    let score = |&(cell, center): &(u32, Point)| -> Result<Candidate> {
        let top_left = box_origin(center, size);
        let origin = checked_origin(top_left, size, gray.width(), gray.height())?;
        let mean = masked_mean(gray, origin, tight, false);
        Ok(Candidate {
            cell,
            center,
            top_left,
            score: (mean - surround_mean).abs().min(MAX_PIXEL_VALUE),
        })
    };

    let centers = grid_centers(click, config);

    #[cfg(feature = "parallel")]
    let candidates: Vec<Candidate> = {
        use rayon::prelude::*;
        centers.par_iter().map(score).collect::<Result<_>>()?
    };

    #[cfg(not(feature = "parallel"))]
    let candidates: Vec<Candidate> = centers.iter().map(score).collect::<Result<_>>()?;

    // Strict comparison keeps the earliest of equal scores.
    let best = candidates
        .iter()
        .copied()
        .reduce(|best, c| if c.score < best.score { c } else { best })
        .ok_or_else(|| Error::InvalidConfig {
            field: "grid_size",
            reason: format!("grid of {} has no candidate cells", config.grid_size),
        })?;

    debug!(
        surround_mean,
        cell = best.cell,
        x = best.top_left.x,
        y = best.top_left.y,
        score = best.score,
        "donor patch chosen"
    );

    Ok(PatchChoice {
        surround_mean,
        best,
        candidates,
    })
}

/// Cut the donor patch for `candidate` out of the padded color image.
///
/// # Errors
///
/// Returns [`Error::RegionOutOfBounds`] if the square leaves `color`.
pub fn donor_patch(color: &RgbImage, candidate: &Candidate, size: u32) -> Result<RgbImage> {
    crop_square(color, candidate.top_left, size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Circle;
    use image::Luma;

    #[test]
    fn grid_skips_center_and_spans_one_box_width() {
        let config = RemovalConfig::default();
        let centers = grid_centers(Point::new(100, 100), &config);
        assert_eq!(centers.len(), 24);
        assert!(centers.iter().all(|&(_, c)| c != Point::new(100, 100)));
        assert_eq!(centers[0], (0, Point::new(65, 65)));
        assert_eq!(centers[1], (1, Point::new(83, 65)));
        assert_eq!(centers[23], (24, Point::new(135, 135)));
        // Cell 12 is the skipped center.
        assert_eq!(centers[11].0, 11);
        assert_eq!(centers[12].0, 13);
    }

    #[test]
    fn three_by_three_grid_has_eight_cells() {
        let config = RemovalConfig {
            grid_size: 3,
            box_size: 7,
            ..RemovalConfig::default()
        };
        let offsets: Vec<Point> = grid_centers(Point::new(0, 0), &config)
            .into_iter()
            .map(|(_, c)| c)
            .collect();
        assert_eq!(offsets.len(), 8);
        assert_eq!(offsets[0], Point::new(-7, -7));
        assert_eq!(offsets[3], Point::new(-7, 0));
        assert_eq!(offsets[4], Point::new(7, 0));
    }

    #[test]
    fn masked_mean_inside_and_outside() {
        let img = GrayImage::from_fn(5, 5, |x, _| Luma([if x == 2 { 200 } else { 100 }]));
        let mut center = GrayImage::new(5, 5);
        center.put_pixel(2, 2, Luma([255]));
        let mask = Mask::from(center);
        assert!((masked_mean(&img, (0, 0), &mask, false) - 200.0).abs() < 1e-9);
        let outside = masked_mean(&img, (0, 0), &mask, true);
        let expected = f64::from(4 * 200 + 20 * 100) / 24.0;
        assert!((outside - expected).abs() < 1e-9);
    }

    #[test]
    fn full_mask_leaves_empty_surround() {
        let img = GrayImage::from_pixel(5, 5, Luma([70]));
        let mask = Mask::disc(5, 5, &Circle::new(2.0, 2.0, 10.0));
        assert!(masked_mean(&img, (0, 0), &mask, true).abs() < 1e-12);
    }

    #[test]
    fn candidate_leaving_image_is_an_error() {
        let config = RemovalConfig {
            box_size: 5,
            grid_size: 3,
            ..RemovalConfig::default()
        };
        let gray = GrayImage::from_pixel(12, 12, Luma([50]));
        let region = GrayImage::from_pixel(5, 5, Luma([50]));
        let tight = Mask::disc(5, 5, &Circle::new(2.0, 2.0, 1.0));
        let err = search_patch(&gray, &region, Point::new(6, 6), &tight, &config).unwrap_err();
        assert!(matches!(err, Error::RegionOutOfBounds { .. }));
    }
}
