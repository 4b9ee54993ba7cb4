//! Small value types shared by the pipeline stages.

/// Integer pixel coordinate, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Point {
    /// Create a point.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Translate by `(dx, dy)`.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// A circle with floating-point center and radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    /// Center column.
    pub cx: f64,
    /// Center row.
    pub cy: f64,
    /// Radius in pixels.
    pub radius: f64,
}

impl Circle {
    /// Create a circle.
    #[must_use]
    pub const fn new(cx: f64, cy: f64, radius: f64) -> Self {
        Self { cx, cy, radius }
    }

    /// Whether `(x, y)` lies inside or on the circle, with a small tolerance.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let dx = x - self.cx;
        let dy = y - self.cy;
        (dx * dx + dy * dy).sqrt() <= self.radius + 1e-7
    }

    /// Center and radius truncated to whole pixels, as used for rasterising.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_pixels(&self) -> (Point, i32) {
        (
            Point::new(self.cx as i32, self.cy as i32),
            self.radius as i32,
        )
    }
}
