use crate::geometry::Path;
use crate::math::polygon_2d::centroid_2d;
use crate::math::Point2;

/// One printable region: an outer boundary plus the holes directly inside it.
///
/// Islands inside a hole are never part of this shape; they form shapes of
/// their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscreteShape {
    /// Counter-clockwise outer boundary.
    pub outer: Path,
    /// Clockwise hole boundaries, each strictly inside `outer`.
    pub holes: Vec<Path>,
}

impl DiscreteShape {
    /// Creates a shape from an outer boundary and its holes.
    #[must_use]
    pub fn new(outer: Path, holes: Vec<Path>) -> Self {
        Self { outer, holes }
    }

    /// Number of boundaries, outer included.
    #[must_use]
    pub fn polygon_count(&self) -> usize {
        1 + self.holes.len()
    }

    /// Iterates over every boundary, outer first.
    pub fn polygons(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(&self.outer).chain(&self.holes)
    }

    /// Filled area in square pixels: outer area minus hole areas.
    #[must_use]
    pub fn area(&self) -> f64 {
        self.outer.area().abs() - self.holes.iter().map(|h| h.area().abs()).sum::<f64>()
    }

    /// Centroid of the outer boundary in working units.
    #[must_use]
    pub fn outer_centroid(&self, pixel_size: f64) -> Option<Point2> {
        centroid_2d(&self.outer.to_units(pixel_size))
    }
}
