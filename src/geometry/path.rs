use super::int_point::{cross, on_segment, IntPoint, SCALE};
use crate::math::Point2;

/// An unordered collection of closed paths describing one area.
pub type PolygonSet = Vec<Path>;

/// Where a point lies relative to a closed path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointLocation {
    Inside,
    Outside,
    OnBoundary,
}

/// A closed polygon on the fixed-point grid.
///
/// The first point is not repeated at the end. Counter-clockwise paths
/// (positive area) bound solid regions; clockwise paths bound holes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path {
    points: Vec<IntPoint>,
}

impl Path {
    /// Creates a path from its vertices, dropping an explicit closing point.
    #[must_use]
    pub fn new(mut points: Vec<IntPoint>) -> Self {
        if points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        Self { points }
    }

    /// Returns the vertices in order.
    #[must_use]
    pub fn points(&self) -> &[IntPoint] {
        &self.points
    }

    /// Returns the number of vertices.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the path has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Iterates over the closed edge list, including the last-to-first edge.
    pub fn edges(&self) -> impl Iterator<Item = (IntPoint, IntPoint)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Twice the signed area, exact.
    #[must_use]
    pub fn area2(&self) -> i128 {
        if self.points.len() < 3 {
            return 0;
        }
        self.edges()
            .map(|(a, b)| i128::from(a.x) * i128::from(b.y) - i128::from(b.x) * i128::from(a.y))
            .sum()
    }

    /// Signed area in square pixels.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn area(&self) -> f64 {
        let s = SCALE as f64;
        self.area2() as f64 / (2.0 * s * s)
    }

    /// Returns `true` for counter-clockwise orientation.
    #[must_use]
    pub fn is_ccw(&self) -> bool {
        self.area2() > 0
    }

    /// Returns the path with its vertex order reversed.
    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.points.reverse();
        self
    }

    /// Returns the path oriented counter-clockwise when `ccw` is set,
    /// clockwise otherwise.
    #[must_use]
    pub fn oriented(self, ccw: bool) -> Self {
        if self.is_ccw() == ccw {
            self
        } else {
            self.reversed()
        }
    }

    /// Minimum and maximum corners, or `None` for an empty path.
    #[must_use]
    pub fn bounds(&self) -> Option<(IntPoint, IntPoint)> {
        let first = *self.points.first()?;
        Some(self.points.iter().fold((first, first), |(lo, hi), p| {
            (
                IntPoint::new(lo.x.min(p.x), lo.y.min(p.y)),
                IntPoint::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        }))
    }

    /// Locates `p` with an exact crossing-number test.
    #[must_use]
    pub fn locate(&self, p: IntPoint) -> PointLocation {
        locate_scaled(&self.points, p, 1)
    }

    /// Locates `p` against this path with every vertex multiplied by `k`.
    ///
    /// With `k = 2` this places edge midpoints exactly on the grid.
    #[must_use]
    pub fn locate_scaled(&self, p: IntPoint, k: i64) -> PointLocation {
        locate_scaled(&self.points, p, k)
    }

    /// Returns `true` if `other` lies inside this path.
    ///
    /// Paths are assumed not to cross. Vertices of `other` that sit on this
    /// boundary are inconclusive, so edge midpoints are tried after them.
    #[must_use]
    pub fn contains_path(&self, other: &Path) -> bool {
        let (Some((lo, hi)), Some((other_lo, other_hi))) = (self.bounds(), other.bounds()) else {
            return false;
        };
        if other_lo.x < lo.x || other_lo.y < lo.y || other_hi.x > hi.x || other_hi.y > hi.y {
            return false;
        }
        for &v in &other.points {
            match self.locate(v) {
                PointLocation::Inside => return true,
                PointLocation::Outside => return false,
                PointLocation::OnBoundary => {}
            }
        }
        for (a, b) in other.edges() {
            let mid = IntPoint::new(a.x + b.x, a.y + b.y);
            match locate_scaled(&self.points, mid, 2) {
                PointLocation::Inside => return true,
                PointLocation::Outside => return false,
                PointLocation::OnBoundary => {}
            }
        }
        false
    }

    /// Removes repeated vertices, collinear vertices and zero-width spikes.
    #[must_use]
    pub fn cleaned(self) -> Self {
        let mut pts = self.points;
        loop {
            pts.dedup();
            while pts.len() > 1 && pts.first() == pts.last() {
                pts.pop();
            }
            let n = pts.len();
            if n < 3 {
                return Self { points: pts };
            }
            let kept: Vec<IntPoint> = (0..n)
                .filter(|&i| cross(pts[(i + n - 1) % n], pts[i], pts[(i + 1) % n]) != 0)
                .map(|i| pts[i])
                .collect();
            if kept.len() == n {
                return Self { points: kept };
            }
            pts = kept;
        }
    }

    /// Converts the vertices to working units.
    #[must_use]
    pub fn to_units(&self, pixel_size: f64) -> Vec<Point2> {
        self.points.iter().map(|p| p.to_units(pixel_size)).collect()
    }
}

/// Locates `p` against the polygon `points` scaled by `k`.
fn locate_scaled(points: &[IntPoint], p: IntPoint, k: i64) -> PointLocation {
    let n = points.len();
    if n < 3 {
        return PointLocation::Outside;
    }
    let mut inside = false;
    for i in 0..n {
        let a = points[i].scaled(k);
        let b = points[(i + 1) % n].scaled(k);
        if on_segment(a, b, p) {
            return PointLocation::OnBoundary;
        }
        if (a.y > p.y) != (b.y > p.y) && (cross(a, b, p) > 0) == (b.y > a.y) {
            inside = !inside;
        }
    }
    if inside {
        PointLocation::Inside
    } else {
        PointLocation::Outside
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x0: i64, y0: i64, x1: i64, y1: i64) -> Path {
        Path::new(vec![
            IntPoint::new(x0, y0),
            IntPoint::new(x1, y0),
            IntPoint::new(x1, y1),
            IntPoint::new(x0, y1),
        ])
    }

    #[test]
    fn closing_point_is_dropped() {
        let p = Path::new(vec![
            IntPoint::new(0, 0),
            IntPoint::new(1, 0),
            IntPoint::new(0, 1),
            IntPoint::new(0, 0),
        ]);
        assert_eq!(p.len(), 3);
    }

    #[test]
    fn area_and_orientation() {
        let p = rect(0, 0, 2000, 1000);
        assert_eq!(p.area2(), 4_000_000);
        assert!((p.area() - 2.0).abs() < 1e-12);
        assert!(p.is_ccw());
        let cw = p.reversed();
        assert!(!cw.is_ccw());
        assert!(cw.oriented(true).is_ccw());
    }

    #[test]
    fn locate_inside_outside_boundary() {
        let p = rect(0, 0, 10, 10);
        assert_eq!(p.locate(IntPoint::new(5, 5)), PointLocation::Inside);
        assert_eq!(p.locate(IntPoint::new(15, 5)), PointLocation::Outside);
        assert_eq!(p.locate(IntPoint::new(10, 3)), PointLocation::OnBoundary);
        assert_eq!(p.locate(IntPoint::new(0, 0)), PointLocation::OnBoundary);
    }

    #[test]
    fn locate_works_for_clockwise_paths() {
        let p = rect(0, 0, 10, 10).reversed();
        assert_eq!(p.locate(IntPoint::new(5, 5)), PointLocation::Inside);
        assert_eq!(p.locate(IntPoint::new(-1, 5)), PointLocation::Outside);
    }

    #[test]
    fn contains_nested_path() {
        let outer = rect(0, 0, 100, 100);
        let inner = rect(10, 10, 20, 20);
        assert!(outer.contains_path(&inner));
        assert!(!inner.contains_path(&outer));
    }

    #[test]
    fn contains_path_sharing_vertices_uses_midpoints() {
        let outer = Path::new(vec![
            IntPoint::new(0, 0),
            IntPoint::new(10, 0),
            IntPoint::new(10, 10),
            IntPoint::new(0, 10),
        ]);
        // Triangle whose vertices all sit on the outer boundary.
        let inner = Path::new(vec![
            IntPoint::new(0, 0),
            IntPoint::new(10, 0),
            IntPoint::new(0, 10),
        ]);
        assert!(outer.contains_path(&inner));
    }

    #[test]
    fn cleaned_removes_collinear_and_spikes() {
        let p = Path::new(vec![
            IntPoint::new(0, 0),
            IntPoint::new(5, 0),
            IntPoint::new(10, 0),
            IntPoint::new(10, 10),
            IntPoint::new(10, 15),
            IntPoint::new(10, 10),
            IntPoint::new(0, 10),
            IntPoint::new(0, 10),
        ])
        .cleaned();
        assert_eq!(
            p.points(),
            &[
                IntPoint::new(0, 0),
                IntPoint::new(10, 0),
                IntPoint::new(10, 10),
                IntPoint::new(0, 10),
            ]
        );
    }

    #[test]
    fn cleaned_degenerate_collapses() {
        let p = Path::new(vec![
            IntPoint::new(0, 0),
            IntPoint::new(5, 0),
            IntPoint::new(10, 0),
        ])
        .cleaned();
        assert!(p.len() < 3);
        assert_eq!(p.area2(), 0);
    }

    #[test]
    fn bounds_cover_all_points() {
        let (lo, hi) = rect(-3, 2, 7, 9).bounds().unwrap_or_default();
        assert_eq!(lo, IntPoint::new(-3, 2));
        assert_eq!(hi, IntPoint::new(7, 9));
        assert!(Path::default().bounds().is_none());
    }
}
