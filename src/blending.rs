//! Gradient-domain (Poisson) compositing.
//!
//! Inside the mask the result `f` satisfies `Δf = Δg`, where `g` is the donor
//! patch, and on the mask boundary `f` equals the destination. The donor's
//! texture (its gradients) is therefore kept while its overall level is
//! pulled to meet the destination continuously at the seam.
//!
//! The linear system is small (one unknown per masked pixel and channel) and
//! is solved with successive over-relaxation.

use image::RgbImage;
use tracing::debug;

use crate::error::Result;
use crate::mask::Mask;
use crate::region::checked_origin;
use crate::types::Point;

/// Over-relaxation factor for the Gauss-Seidel sweeps.
const SOR_OMEGA: f32 = 1.8;

const NEIGHBOURS: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// Convergence summary of a [`seamless_clone`] call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendStats {
    /// Number of pixels solved for.
    pub unknowns: usize,
    /// Sweeps performed.
    pub iterations: u32,
    /// Whether the largest update fell below the tolerance.
    pub converged: bool,
}

/// Seamlessly clone `patch` into `dst` with its top-left corner at `top_left`.
///
/// Only pixels inside `mask` (laid over `patch`) change. The outermost ring
/// of the patch is always treated as boundary, so every changed pixel has
/// four neighbours within the patch.
///
/// # Errors
///
/// Returns [`Error::RegionOutOfBounds`](crate::Error::RegionOutOfBounds) if
/// the patch does not fit inside `dst`.
pub fn seamless_clone(
    dst: &mut RgbImage,
    patch: &RgbImage,
    mask: &Mask,
    top_left: Point,
    max_iterations: u32,
    tolerance: f32,
) -> Result<BlendStats> {
    let (pw, ph) = patch.dimensions();
    let (ox, oy) = checked_origin(top_left, pw.max(ph), dst.width(), dst.height())?;
    let (w, h) = (pw as usize, ph as usize);

    // Unknown index for every interior masked pixel.
    let mut index = vec![None; w * h];
    let mut pixels = Vec::new();
    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            #[allow(clippy::cast_possible_truncation)]
            let inside = mask.contains(x as u32, y as u32);
            if inside {
                index[y * w + x] = Some(pixels.len());
                pixels.push((x, y));
            }
        }
    }

    let src = |x: usize, y: usize| -> [f32; 3] {
        #[allow(clippy::cast_possible_truncation)]
        let px = patch.get_pixel(x as u32, y as u32);
        [f32::from(px[0]), f32::from(px[1]), f32::from(px[2])]
    };
    let dst_at = |dst: &RgbImage, x: usize, y: usize| -> [f32; 3] {
        #[allow(clippy::cast_possible_truncation)]
        let px = dst.get_pixel(ox + x as u32, oy + y as u32);
        [f32::from(px[0]), f32::from(px[1]), f32::from(px[2])]
    };

    // Right-hand side: guidance Laplacian plus fixed boundary values, and
    // the unknown neighbours each equation couples to.
    let mut rhs = Vec::with_capacity(pixels.len());
    let mut links = Vec::with_capacity(pixels.len());
    for &(x, y) in &pixels {
        let centre = src(x, y);
        let mut b = [0.0_f32; 3];
        let mut coupled = Vec::with_capacity(4);
        for (dx, dy) in NEIGHBOURS {
            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                clippy::cast_possible_wrap
            )]
            let (nx, ny) = ((x as i64 + dx) as usize, (y as i64 + dy) as usize);
            let neighbour = src(nx, ny);
            let fixed = match index[ny * w + nx] {
                Some(j) => {
                    coupled.push(j);
                    [0.0; 3]
                }
                None => dst_at(dst, nx, ny),
            };
            for (ch, acc) in b.iter_mut().enumerate() {
                *acc += centre[ch] - neighbour[ch] + fixed[ch];
            }
        }
        rhs.push(b);
        links.push(coupled);
    }

    let mut f: Vec<[f32; 3]> = pixels.iter().map(|&(x, y)| src(x, y)).collect();
    let mut iterations = 0;
    let mut converged = pixels.is_empty();
    while !converged && iterations < max_iterations {
        iterations += 1;
        let mut max_delta = 0.0_f32;
        for (i, (coupled, b)) in links.iter().zip(&rhs).enumerate() {
            for (ch, &bc) in b.iter().enumerate() {
                let sum: f32 = coupled.iter().map(|&j| f[j][ch]).sum();
                let target = (bc + sum) / 4.0;
                let delta = SOR_OMEGA * (target - f[i][ch]);
                f[i][ch] += delta;
                max_delta = max_delta.max(delta.abs());
            }
        }
        converged = max_delta < tolerance;
    }

    for (&(x, y), value) in pixels.iter().zip(&f) {
        #[allow(clippy::cast_possible_truncation)]
        let px = dst.get_pixel_mut(ox + x as u32, oy + y as u32);
        for (channel, v) in px.0.iter_mut().zip(value) {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let rounded = v.round().clamp(0.0, 255.0) as u8;
            *channel = rounded;
        }
    }

    debug!(
        unknowns = pixels.len(),
        iterations, converged, "seamless clone finished"
    );
    Ok(BlendStats {
        unknowns: pixels.len(),
        iterations,
        converged,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Circle;
    use image::Rgb;

    fn solve(dst: &mut RgbImage, patch: &RgbImage, mask: &Mask, at: Point) -> BlendStats {
        seamless_clone(dst, patch, mask, at, 5000, 0.001).unwrap()
    }

    #[test]
    fn flat_patch_takes_destination_level() {
        let mut dst = RgbImage::from_pixel(40, 40, Rgb([180, 120, 60]));
        let patch = RgbImage::from_pixel(15, 15, Rgb([20, 240, 100]));
        let mask = Mask::disc(15, 15, &Circle::new(7.0, 7.0, 7.0));
        let stats = solve(&mut dst, &patch, &mask, Point::new(10, 12));
        assert!(stats.converged);
        assert!(stats.unknowns > 100);
        for px in dst.pixels() {
            for (ch, expected) in [180u8, 120, 60].into_iter().enumerate() {
                let diff = (i32::from(px[ch]) - i32::from(expected)).abs();
                assert!(diff <= 1, "flat donor should vanish, channel {ch} off by {diff}");
            }
        }
    }

    #[test]
    fn donor_texture_is_preserved() {
        let mut dst = RgbImage::from_pixel(30, 30, Rgb([100, 100, 100]));
        let patch = RgbImage::from_fn(15, 15, |x, _| {
            let v = if x == 7 { 160 } else { 40 };
            Rgb([v, v, v])
        });
        let mask = Mask::disc(15, 15, &Circle::new(7.0, 7.0, 7.0));
        solve(&mut dst, &patch, &mask, Point::new(5, 5));
        let ridge = i32::from(dst.get_pixel(12, 12)[0]);
        let beside = i32::from(dst.get_pixel(10, 12)[0]);
        assert!(
            ridge - beside > 60,
            "ridge contrast should survive, got {ridge} vs {beside}"
        );
    }

    #[test]
    fn pixels_outside_mask_are_untouched() {
        let mut dst = RgbImage::from_fn(30, 30, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            let px = Rgb([(x * 8) as u8, (y * 8) as u8, 77]);
            px
        });
        let before = dst.clone();
        let patch = RgbImage::from_pixel(11, 11, Rgb([0, 0, 0]));
        let mask = Mask::disc(11, 11, &Circle::new(5.0, 5.0, 3.0));
        solve(&mut dst, &patch, &mask, Point::new(9, 9));
        for y in 0..30 {
            for x in 0..30 {
                let inside = (9..20).contains(&x)
                    && (9..20).contains(&y)
                    && mask.contains(x - 9, y - 9);
                if !inside {
                    assert_eq!(dst.get_pixel(x, y), before.get_pixel(x, y));
                }
            }
        }
    }

    #[test]
    fn patch_outside_destination_is_rejected() {
        let mut dst = RgbImage::new(10, 10);
        let patch = RgbImage::new(5, 5);
        let mask = Mask::disc(5, 5, &Circle::new(2.0, 2.0, 2.0));
        assert!(seamless_clone(&mut dst, &patch, &mask, Point::new(7, 0), 10, 0.1).is_err());
    }

    #[test]
    fn empty_mask_is_a_no_op() {
        let mut dst = RgbImage::from_pixel(10, 10, Rgb([9, 9, 9]));
        let before = dst.clone();
        let patch = RgbImage::from_pixel(5, 5, Rgb([200, 200, 200]));
        let mask = Mask::from(image::GrayImage::new(5, 5));
        let stats = solve(&mut dst, &patch, &mask, Point::new(2, 2));
        assert_eq!(stats.unknowns, 0);
        assert!(stats.converged);
        assert_eq!(dst, before);
    }
}
