//! Blemish localisation: boundary extraction and circle fitting.
//!
//! Only outermost boundaries are considered, so a blemish with internal
//! structure is never split into pieces. The largest one by enclosed area
//! wins and its minimal enclosing circle is the estimated blemish extent.

use image::GrayImage;
use imageproc::contours::{find_contours, BorderType, Contour};
use tracing::debug;

use crate::types::Circle;

/// The selected boundary curve and its minimal enclosing circle, in box
/// coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct BlemishShape {
    /// Points of the selected outer boundary.
    pub boundary: Vec<(i32, i32)>,
    /// Area enclosed by `boundary`.
    pub area: f64,
    /// Smallest circle containing every boundary point. Radius is positive.
    pub circle: Circle,
}

/// Outermost boundary curves of `mask`, in the order they are found.
#[must_use]
pub fn external_boundaries(mask: &GrayImage) -> Vec<Vec<(i32, i32)>> {
    let contours: Vec<Contour<i32>> = find_contours(mask);
    contours
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| c.points.into_iter().map(|p| (p.x, p.y)).collect())
        .collect()
}

/// Enclosed area of a closed polygon (shoelace formula).
#[must_use]
pub fn polygon_area(points: &[(i32, i32)]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let twice: i64 = points
        .iter()
        .zip(points.iter().cycle().skip(1))
        .map(|(&(x0, y0), &(x1, y1))| i64::from(x0) * i64::from(y1) - i64::from(x1) * i64::from(y0))
        .sum();
    #[allow(clippy::cast_precision_loss)]
    let area = twice.abs() as f64 / 2.0;
    area
}

/// Locate the blemish in a binary edge mask (the ShapeLocator step).
///
/// Returns `None` when the mask has no boundary at all, or when the chosen
/// boundary collapses to a single point. Equal areas keep the boundary found
/// first.
#[must_use]
pub fn locate_blemish(mask: &GrayImage) -> Option<BlemishShape> {
    let boundaries = external_boundaries(mask);
    debug!(count = boundaries.len(), "external boundaries found");

    let mut best: Option<(Vec<(i32, i32)>, f64)> = None;
    for boundary in boundaries {
        let area = polygon_area(&boundary);
        if best.as_ref().is_none_or(|(_, best_area)| area > *best_area) {
            best = Some((boundary, area));
        }
    }
    let (boundary, area) = best?;

    let points: Vec<(f64, f64)> = boundary
        .iter()
        .map(|&(x, y)| (f64::from(x), f64::from(y)))
        .collect();
    let circle = min_enclosing_circle(&points)?;
    if circle.radius <= 0.0 {
        debug!(area, "boundary collapsed to a point");
        return None;
    }
    debug!(
        area,
        cx = circle.cx,
        cy = circle.cy,
        radius = circle.radius,
        "blemish located"
    );
    Some(BlemishShape {
        boundary,
        area,
        circle,
    })
}

/// Smallest circle containing every point (Welzl, iterative form).
///
/// Points are visited in the given order, so the result is deterministic.
/// Returns `None` for an empty slice.
#[must_use]
pub fn min_enclosing_circle(points: &[(f64, f64)]) -> Option<Circle> {
    let (&first, rest) = points.split_first()?;
    let mut circle = Circle::new(first.0, first.1, 0.0);

    for (i, &p) in rest.iter().enumerate() {
        if circle.contains(p.0, p.1) {
            continue;
        }
        circle = Circle::new(p.0, p.1, 0.0);
        let before_i = &points[..=i];
        for (j, &q) in before_i.iter().enumerate() {
            if circle.contains(q.0, q.1) {
                continue;
            }
            circle = circle_from_two(p, q);
            for &r in &before_i[..j] {
                if !circle.contains(r.0, r.1) {
                    circle = circle_from_three(p, q, r);
                }
            }
        }
    }
    Some(circle)
}

fn circle_from_two(a: (f64, f64), b: (f64, f64)) -> Circle {
    let cx = (a.0 + b.0) / 2.0;
    let cy = (a.1 + b.1) / 2.0;
    Circle::new(cx, cy, (a.0 - cx).hypot(a.1 - cy))
}

fn circle_from_three(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Circle {
    let bx = b.0 - a.0;
    let by = b.1 - a.1;
    let cx = c.0 - a.0;
    let cy = c.1 - a.1;
    let d = 2.0 * (bx * cy - by * cx);

    if d.abs() < 1e-12 {
        // Collinear: the widest pair spans the other point.
        return [circle_from_two(a, b), circle_from_two(a, c), circle_from_two(b, c)]
            .into_iter()
            .fold(Circle::new(a.0, a.1, 0.0), |widest, circle| {
                if circle.radius > widest.radius {
                    circle
                } else {
                    widest
                }
            });
    }

    let b2 = bx * bx + by * by;
    let c2 = cx * cx + cy * cy;
    let ux = (cy * b2 - by * c2) / d;
    let uy = (bx * c2 - cx * b2) / d;
    Circle::new(a.0 + ux, a.1 + uy, ux.hypot(uy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
    use imageproc::rect::Rect;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected} +/- {tol}, got {actual}"
        );
    }

    #[test]
    fn circle_of_single_point_has_zero_radius() {
        let c = min_enclosing_circle(&[(3.0, 4.0)]).unwrap();
        assert_eq!(c, Circle::new(3.0, 4.0, 0.0));
        assert!(min_enclosing_circle(&[]).is_none());
    }

    #[test]
    fn circle_of_square_corners_is_circumscribed() {
        let pts = [(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)];
        let c = min_enclosing_circle(&pts).unwrap();
        assert_close(c.cx, 2.0, 1e-9);
        assert_close(c.cy, 2.0, 1e-9);
        assert_close(c.radius, 8.0_f64.sqrt(), 1e-9);
    }

    #[test]
    fn circle_ignores_interior_points_and_contains_all() {
        let pts = [
            (1.0, 1.0),
            (-3.0, 0.0),
            (0.5, -0.5),
            (3.0, 0.0),
            (0.0, 2.0),
            (0.0, -1.0),
        ];
        let c = min_enclosing_circle(&pts).unwrap();
        assert_close(c.cx, 0.0, 1e-9);
        assert_close(c.cy, 0.0, 1e-9);
        assert_close(c.radius, 3.0, 1e-9);
        for &(x, y) in &pts {
            assert!(c.contains(x, y));
        }
    }

    #[test]
    fn collinear_points_use_widest_pair() {
        let pts = [(0.0, 0.0), (2.0, 0.0), (10.0, 0.0), (5.0, 0.0)];
        let c = min_enclosing_circle(&pts).unwrap();
        assert_close(c.cx, 5.0, 1e-9);
        assert_close(c.radius, 5.0, 1e-9);
    }

    #[test]
    fn polygon_area_of_rectangle() {
        let rect = [(0, 0), (5, 0), (5, 3), (0, 3)];
        assert_close(polygon_area(&rect), 15.0, 1e-12);
        assert_close(polygon_area(&[(0, 0), (1, 1)]), 0.0, 1e-12);
    }

    #[test]
    fn empty_mask_has_no_blemish() {
        let mask = GrayImage::new(35, 35);
        assert!(locate_blemish(&mask).is_none());
    }

    #[test]
    fn single_pixel_is_not_a_blemish() {
        let mut mask = GrayImage::new(35, 35);
        mask.put_pixel(17, 17, Luma([255]));
        assert!(locate_blemish(&mask).is_none());
    }

    #[test]
    fn largest_outer_boundary_wins() {
        let mut mask = GrayImage::new(35, 35);
        draw_filled_rect_mut(&mut mask, Rect::at(1, 1).of_size(4, 4), Luma([255]));
        draw_filled_circle_mut(&mut mask, (22, 20), 8, Luma([255]));
        let shape = locate_blemish(&mask).unwrap();
        assert_close(shape.circle.cx, 22.0, 1.0);
        assert_close(shape.circle.cy, 20.0, 1.0);
        assert_close(shape.circle.radius, 8.0, 1.0);
    }

    #[test]
    fn holes_are_ignored() {
        // A ring: the hole border must not be selected or fitted.
        let mut mask = GrayImage::new(35, 35);
        draw_filled_circle_mut(&mut mask, (17, 17), 12, Luma([255]));
        draw_filled_circle_mut(&mut mask, (17, 17), 8, Luma([0]));
        let boundaries = external_boundaries(&mask);
        assert_eq!(boundaries.len(), 1);
        let shape = locate_blemish(&mask).unwrap();
        assert_close(shape.circle.radius, 12.0, 1.0);
    }

    #[test]
    fn equal_areas_keep_first_found() {
        let mut mask = GrayImage::new(35, 35);
        draw_filled_rect_mut(&mut mask, Rect::at(2, 2).of_size(6, 6), Luma([255]));
        draw_filled_rect_mut(&mut mask, Rect::at(20, 20).of_size(6, 6), Luma([255]));
        let first = external_boundaries(&mask)
            .into_iter()
            .next()
            .unwrap();
        let shape = locate_blemish(&mask).unwrap();
        assert_eq!(shape.boundary, first);
    }
}
