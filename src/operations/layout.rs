use tracing::{debug, warn};

use crate::config::LayoutParams;
use crate::error::Result;
use crate::math::{Point2, Vector2, Vector3};
use crate::operations::query::BoundingBox;
use crate::pipeline::OutlineSolid;

/// An XY footprint on the plate.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Footprint {
    min: Point2,
    max: Point2,
}

impl Footprint {
    fn shifted(&self, offset: Vector2) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    fn overlaps(&self, other: &Footprint, gap: f64) -> bool {
        self.min.x < other.max.x + gap
            && other.min.x < self.max.x + gap
            && self.min.y < other.max.y + gap
            && other.min.y < self.max.y + gap
    }

    fn within(&self, half: Vector2) -> bool {
        self.min.x >= -half.x && self.min.y >= -half.y && self.max.x <= half.x && self.max.y <= half.y
    }
}

/// Places solids on a plate centered at the origin so their footprints keep
/// at least `spacing` between each other.
///
/// This is footprint collision testing, not packing: each solid takes the
/// first free candidate position and is never moved again.
pub struct ArrangeOnPlate {
    solids: Vec<OutlineSolid>,
    params: LayoutParams,
}

impl ArrangeOnPlate {
    /// Creates a new `ArrangeOnPlate` operation.
    #[must_use]
    pub fn new(solids: Vec<OutlineSolid>, params: LayoutParams) -> Self {
        Self { solids, params }
    }

    /// Executes the placement, returning the translated solids in input order.
    ///
    /// Each solid first tries its origin hint (or its current position),
    /// then candidates on square rings around the plate center, nearest
    /// first. A solid that fits nowhere is put beside everything placed so
    /// far, outside the plate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`](crate::error::ConfigError::InvalidParameter)
    /// if the layout parameters are invalid.
    pub fn execute(self) -> Result<Vec<OutlineSolid>> {
        self.params.validate()?;
        let half = Vector2::new(self.params.plate_size[0], self.params.plate_size[1]) / 2.0;
        let gap = self.params.spacing;

        let mut placed: Vec<Footprint> = Vec::with_capacity(self.solids.len());
        let mut solids = self.solids;

        for solid in &mut solids {
            let Some(bounds) = BoundingBox::new(&solid.mesh).execute() else {
                continue;
            };
            let footprint = Footprint {
                min: bounds.min.xy(),
                max: bounds.max.xy(),
            };
            let anchor = solid.origin_hint.unwrap_or_else(|| bounds.center().xy());

            let fits = |offset: Vector2| {
                let moved = footprint.shifted(offset);
                moved.within(half) && placed.iter().all(|p| !moved.overlaps(p, gap))
            };
            let offset = std::iter::once(Vector2::zeros())
                .chain(ring_candidates(self.params.step, half).map(|c| c - anchor))
                .find(|&offset| fits(offset));

            let offset = offset.unwrap_or_else(|| {
                let right = placed
                    .iter()
                    .map(|p| p.max.x)
                    .fold(half.x, f64::max);
                let offset = Vector2::new(right + gap - footprint.min.x, -bounds.center().y);
                warn!(
                    x = right + gap,
                    "No free position on the plate, placing beside it"
                );
                offset
            });

            solid.mesh.translate(Vector3::new(offset.x, offset.y, 0.0));
            if let Some(hint) = solid.origin_hint.as_mut() {
                *hint += offset;
            }
            placed.push(footprint.shifted(offset));
        }

        if self.params.center {
            recenter(&mut solids, &placed);
        }
        debug!(solids = solids.len(), "Arranged solids on plate");
        Ok(solids)
    }
}

/// Plate positions on square rings around the origin, nearest first.
///
/// Rings are produced on demand, so a solid that fits early never pays for
/// the outer rings.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn ring_candidates(step: f64, half: Vector2) -> impl Iterator<Item = Point2> {
    let rings = (half.x.max(half.y) / step).ceil() as i64;
    std::iter::once(Point2::origin())
        .chain((1..=rings).flat_map(move |r| {
            let mut ring = ring_cells(r);
            ring.sort_by_key(|&(i, j)| i * i + j * j);
            ring.into_iter()
                .map(move |(i, j)| Point2::new(i as f64 * step, j as f64 * step))
        }))
        .filter(move |p| p.x.abs() <= half.x && p.y.abs() <= half.y)
}

/// The `8 * r` grid cells at Chebyshev distance `r` from the origin.
fn ring_cells(r: i64) -> Vec<(i64, i64)> {
    let mut cells = Vec::with_capacity(usize::try_from(8 * r).unwrap_or_default());
    for i in -r..=r {
        cells.push((i, -r));
        cells.push((i, r));
    }
    for j in (1 - r)..r {
        cells.push((-r, j));
        cells.push((r, j));
    }
    cells
}

/// Moves every solid so the group's footprint is centered on the origin.
fn recenter(solids: &mut [OutlineSolid], placed: &[Footprint]) {
    let Some(first) = placed.first() else {
        return;
    };
    let group = placed.iter().fold(*first, |acc, p| Footprint {
        min: Point2::new(acc.min.x.min(p.min.x), acc.min.y.min(p.min.y)),
        max: Point2::new(acc.max.x.max(p.max.x), acc.max.y.max(p.max.y)),
    });
    let offset = -nalgebra::center(&group.min, &group.max).coords;
    for solid in solids.iter_mut().filter(|s| !s.mesh.is_empty()) {
        solid.mesh.translate(Vector3::new(offset.x, offset.y, 0.0));
        if let Some(hint) = solid.origin_hint.as_mut() {
            *hint += offset;
        }
    }
}
