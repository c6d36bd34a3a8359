use std::collections::HashMap;

use tracing::debug;

use crate::geometry::{IntPoint, Path, PolygonSet, RasterImage, SCALE};

/// An oriented contour segment with the foreground on its left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub start: IntPoint,
    pub end: IntPoint,
}

/// Traces the boundary between foreground and background pixels.
///
/// A sample at or above `threshold` is foreground. Outer boundaries come
/// out counter-clockwise and hole boundaries clockwise.
///
/// Pixel centers sit on integer coordinates with the Y axis pointing up, so
/// image row 0 ends up at the top of the outline. The image is surrounded
/// by one ring of `background` samples, which closes every contour.
pub struct TraceContours<'a> {
    image: &'a RasterImage,
    threshold: u8,
    background: u8,
    merge_distance: f64,
}

impl<'a> TraceContours<'a> {
    /// Creates a new `TraceContours` operation with no endpoint merging.
    #[must_use]
    pub fn new(image: &'a RasterImage, threshold: u8, background: u8) -> Self {
        Self {
            image,
            threshold,
            background,
            merge_distance: 0.0,
        }
    }

    /// Sets the pixel distance under which endpoints are unified.
    #[must_use]
    pub fn with_merge_distance(mut self, merge_distance: f64) -> Self {
        self.merge_distance = merge_distance;
        self
    }

    /// Marches every 2x2 block and returns the raw contour segments.
    #[must_use]
    #[allow(clippy::cast_possible_wrap)]
    pub fn segments(&self) -> Vec<Segment> {
        let mut segments = Vec::new();
        if self.image.is_empty() {
            return segments;
        }
        let width = self.image.width() as i64;
        let height = self.image.height() as i64;

        for gy in -1..height {
            for gx in -1..width {
                self.march_cell(gx, gy, &mut segments);
            }
        }
        segments
    }

    /// Executes the trace, returning closed loops.
    ///
    /// An image without any foreground yields no loops.
    #[must_use]
    pub fn execute(&self) -> PolygonSet {
        let segments = self.segments();
        let loops = self.link_segments(&segments);
        debug!(
            segments = segments.len(),
            loops = loops.len(),
            "Traced contours"
        );
        loops
    }

    /// Sample at grid position `(gx, gy)`, Y up.
    #[allow(clippy::cast_possible_wrap)]
    fn sample(&self, gx: i64, gy: i64) -> u8 {
        let row = self.image.height() as i64 - 1 - gy;
        self.image.sample_or(gx, row, self.background)
    }

    fn is_inside(&self, value: u8) -> bool {
        value >= self.threshold
    }

    /// The iso level sits half a step below the threshold so a sample equal
    /// to the threshold is strictly inside.
    fn iso_level(&self) -> f64 {
        f64::from(self.threshold) - 0.5
    }

    /// Crossing point on the grid edge `a`-`b`, where `a` is the lower or left end.
    #[allow(clippy::cast_precision_loss)]
    fn crossing(&self, a: (i64, i64), b: (i64, i64)) -> IntPoint {
        let va = f64::from(self.sample(a.0, a.1));
        let vb = f64::from(self.sample(b.0, b.1));
        let t = ((self.iso_level() - va) / (vb - va)).clamp(0.0, 1.0);
        IntPoint::from_pixels(
            a.0 as f64 + t * (b.0 - a.0) as f64,
            a.1 as f64 + t * (b.1 - a.1) as f64,
        )
    }

    fn march_cell(&self, gx: i64, gy: i64, out: &mut Vec<Segment>) {
        // Corners counter-clockwise from bottom-left; edge k joins corner k and k + 1.
        let corners = [(gx, gy), (gx + 1, gy), (gx + 1, gy + 1), (gx, gy + 1)];
        let values = corners.map(|(x, y)| self.sample(x, y));
        let inside = values.map(|v| self.is_inside(v));

        let mut exits = [0usize; 2];
        let mut entries = [0usize; 2];
        let (mut n_exit, mut n_entry) = (0, 0);
        for k in 0..4 {
            match (inside[k], inside[(k + 1) % 4]) {
                (true, false) => {
                    exits[n_exit] = k;
                    n_exit += 1;
                }
                (false, true) => {
                    entries[n_entry] = k;
                    n_entry += 1;
                }
                _ => {}
            }
        }

        let edge_point = |k: usize| {
            let (a, b) = (corners[k], corners[(k + 1) % 4]);
            // Canonical order keeps neighbouring cells bit-identical.
            if a <= b {
                self.crossing(a, b)
            } else {
                self.crossing(b, a)
            }
        };

        match n_exit {
            1 => out.push(Segment {
                start: edge_point(exits[0]),
                end: edge_point(entries[0]),
            }),
            2 => {
                let mean = values.iter().map(|&v| f64::from(v)).sum::<f64>() / 4.0;
                // Joined inside cuts off the outside corners, else each inside
                // corner is cut off on its own.
                let step = if mean >= self.iso_level() { 1 } else { 3 };
                for &exit in &exits {
                    out.push(Segment {
                        start: edge_point(exit),
                        end: edge_point((exit + step) % 4),
                    });
                }
            }
            _ => {}
        }
    }

    /// Chains segments end-to-start into closed loops.
    fn link_segments(&self, segments: &[Segment]) -> PolygonSet {
        let starts: HashMap<IntPoint, usize> = segments
            .iter()
            .enumerate()
            .map(|(i, s)| (s.start, i))
            .collect();
        let merge2 = self.merge_distance_squared();

        let mut used = vec![false; segments.len()];
        let mut loops = Vec::new();
        let mut open_chains = 0usize;

        for first in 0..segments.len() {
            if used[first] {
                continue;
            }
            let origin = segments[first].start;
            let mut points = Vec::new();
            let mut current = first;
            let closed = loop {
                used[current] = true;
                points.push(segments[current].start);
                let end = segments[current].end;
                if end == origin {
                    break true;
                }
                if let Some(&next) = starts.get(&end).filter(|&&i| !used[i]) {
                    current = next;
                    continue;
                }
                if end.distance_squared(origin) <= merge2 {
                    break true;
                }
                match nearest_unused_start(segments, &used, end, merge2) {
                    Some(next) => current = next,
                    None => break false,
                }
            };

            if !closed {
                open_chains += 1;
                continue;
            }
            let path = Path::new(merge_close_points(points, merge2)).cleaned();
            if path.len() >= 3 && path.area2() != 0 {
                loops.push(path);
            }
        }

        if open_chains > 0 {
            debug!(open_chains, "Dropped contour chains that did not close");
        }
        loops
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn merge_distance_squared(&self) -> i128 {
        let d = (self.merge_distance.max(0.0) * SCALE as f64).round() as i128;
        d * d
    }
}

/// Finds the unused segment whose start is nearest to `p` within `max2`.
fn nearest_unused_start(
    segments: &[Segment],
    used: &[bool],
    p: IntPoint,
    max2: i128,
) -> Option<usize> {
    segments
        .iter()
        .enumerate()
        .filter(|(i, _)| !used[*i])
        .map(|(i, s)| (s.start.distance_squared(p), i))
        .filter(|&(d2, _)| d2 <= max2)
        .min()
        .map(|(_, i)| i)
}

/// Drops every vertex within `max2` of the previously kept one, wrapping
/// around at the end.
fn merge_close_points(points: Vec<IntPoint>, max2: i128) -> Vec<IntPoint> {
    if max2 == 0 {
        return points;
    }
    let mut kept: Vec<IntPoint> = Vec::with_capacity(points.len());
    for p in points {
        match kept.last() {
            Some(last) if last.distance_squared(p) <= max2 => {}
            _ => kept.push(p),
        }
    }
    while kept.len() > 1 {
        match (kept.first(), kept.last()) {
            (Some(first), Some(last)) if first.distance_squared(*last) <= max2 => {
                kept.pop();
            }
            _ => break,
        }
    }
    kept
}
