use crate::math::Point2;

/// Fixed-point units per pixel.
pub const SCALE: i64 = 1000;

/// A 2D point on the fixed-point integer grid.
///
/// One pixel spans [`SCALE`] units, so every traced coordinate keeps three
/// decimal places and compares exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IntPoint {
    pub x: i64,
    pub y: i64,
}

impl IntPoint {
    /// Creates a point from raw fixed-point coordinates.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Quantizes a position given in pixels onto the fixed-point grid.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn from_pixels(x: f64, y: f64) -> Self {
        let s = SCALE as f64;
        Self {
            x: (x * s).round() as i64,
            y: (y * s).round() as i64,
        }
    }

    /// Converts back to working units, `pixel_size` units per pixel.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_units(self, pixel_size: f64) -> Point2 {
        let k = pixel_size / SCALE as f64;
        Point2::new(self.x as f64 * k, self.y as f64 * k)
    }

    /// Squared distance, exact.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> i128 {
        let dx = i128::from(other.x - self.x);
        let dy = i128::from(other.y - self.y);
        dx * dx + dy * dy
    }

    /// Returns the point with both coordinates multiplied by `k`.
    #[must_use]
    pub const fn scaled(self, k: i64) -> Self {
        Self {
            x: self.x * k,
            y: self.y * k,
        }
    }
}

/// Cross product of `a - o` and `b - o`, exact.
///
/// Positive when `o -> a -> b` turns counter-clockwise.
#[must_use]
pub fn cross(o: IntPoint, a: IntPoint, b: IntPoint) -> i128 {
    let ax = i128::from(a.x - o.x);
    let ay = i128::from(a.y - o.y);
    let bx = i128::from(b.x - o.x);
    let by = i128::from(b.y - o.y);
    ax * by - ay * bx
}

/// Returns `true` if `p` lies on the closed segment `a`-`b`.
#[must_use]
pub fn on_segment(a: IntPoint, b: IntPoint, p: IntPoint) -> bool {
    cross(a, b, p) == 0
        && p.x >= a.x.min(b.x)
        && p.x <= a.x.max(b.x)
        && p.y >= a.y.min(b.y)
        && p.y <= a.y.max(b.y)
}

/// Returns `true` if segments `a1`-`a2` and `b1`-`b2` share any point.
#[must_use]
pub fn segments_intersect(a1: IntPoint, a2: IntPoint, b1: IntPoint, b2: IntPoint) -> bool {
    let d1 = cross(b1, b2, a1).signum();
    let d2 = cross(b1, b2, a2).signum();
    let d3 = cross(a1, a2, b1).signum();
    let d4 = cross(a1, a2, b2).signum();

    if d1 * d2 < 0 && d3 * d4 < 0 {
        return true;
    }
    (d1 == 0 && on_segment(b1, b2, a1))
        || (d2 == 0 && on_segment(b1, b2, a2))
        || (d3 == 0 && on_segment(a1, a2, b1))
        || (d4 == 0 && on_segment(a1, a2, b2))
}
