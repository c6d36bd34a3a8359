use std::collections::HashMap;

use slotmap::SecondaryMap;
use tracing::debug;

use crate::error::Result;
use crate::geometry::int_point::{cross, on_segment, segments_intersect};
use crate::geometry::{IntPoint, Path, PointLocation, PolygonSet};
use crate::topology::{PolyNodeId, PolyTree};

/// An axis-aligned rectangle on the fixed-point grid, boundary included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRect {
    pub min: IntPoint,
    pub max: IntPoint,
}

impl IntRect {
    /// Creates a rectangle from two corners in any order.
    #[must_use]
    pub fn new(a: IntPoint, b: IntPoint) -> Self {
        Self {
            min: IntPoint::new(a.x.min(b.x), a.y.min(b.y)),
            max: IntPoint::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// Rectangle around the pixel centers of a `width` x `height` image,
    /// padded by `margin` pixels on every side.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn around_image(width: usize, height: usize, margin: f64) -> Self {
        let w = width as f64 - 1.0;
        let h = height as f64 - 1.0;
        Self::new(
            IntPoint::from_pixels(-margin, -margin),
            IntPoint::from_pixels(w + margin, h + margin),
        )
    }

    /// Returns `true` if `p` is inside or on the boundary.
    #[must_use]
    pub fn contains(&self, p: IntPoint) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Returns `true` if `p` lies on the boundary.
    #[must_use]
    pub fn on_boundary(&self, p: IntPoint) -> bool {
        self.contains(p)
            && (p.x == self.min.x || p.x == self.max.x || p.y == self.min.y || p.y == self.max.y)
    }

    /// Corners in counter-clockwise order from the minimum corner.
    #[must_use]
    pub fn corners(&self) -> [IntPoint; 4] {
        [
            self.min,
            IntPoint::new(self.max.x, self.min.y),
            self.max,
            IntPoint::new(self.min.x, self.max.y),
        ]
    }

    /// The rectangle as a counter-clockwise path.
    #[must_use]
    pub fn to_path(&self) -> Path {
        Path::new(self.corners().to_vec())
    }

    fn outcode(&self, p: IntPoint) -> u8 {
        let mut code = 0;
        if p.x < self.min.x {
            code |= LEFT;
        } else if p.x > self.max.x {
            code |= RIGHT;
        }
        if p.y < self.min.y {
            code |= BOTTOM;
        } else if p.y > self.max.y {
            code |= TOP;
        }
        code
    }
}

const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const BOTTOM: u8 = 4;
const TOP: u8 = 8;

/// Intersects subject loops with a clip rectangle and nests the result.
///
/// Subject loops use the even-odd fill rule and must not cross each other,
/// which holds for iso-contours. Loops may touch the rectangle or lie
/// partly outside it. All arithmetic is exact on the integer grid.
pub struct ClipToRect {
    subjects: PolygonSet,
    clip: IntRect,
}

impl ClipToRect {
    /// Creates a new `ClipToRect` operation.
    #[must_use]
    pub fn new(subjects: PolygonSet, clip: IntRect) -> Self {
        Self { subjects, clip }
    }

    /// Executes the intersection and builds the containment tree.
    ///
    /// Pieces that collapse to zero area are dropped. Solid contours come
    /// out counter-clockwise, holes clockwise.
    ///
    /// # Errors
    ///
    /// Returns an error only if the tree becomes internally inconsistent.
    pub fn execute(self) -> Result<PolyTree> {
        let pieces = self.clip_pieces();
        let tree = build_tree(pieces)?;
        debug!(polygons = tree.len(), "Built containment tree");
        Ok(tree)
    }

    /// Clips every loop, returning unordered closed pieces.
    fn clip_pieces(&self) -> Vec<Path> {
        let rect = &self.clip;
        let (inside, partial): (Vec<&Path>, Vec<&Path>) = self
            .subjects
            .iter()
            .partition(|p| p.points().iter().all(|&v| rect.contains(v)));

        let mut pieces: Vec<Path> = inside.iter().map(|&p| p.clone()).collect();
        if partial.is_empty() {
            return pieces;
        }

        let mut soup: Vec<(IntPoint, IntPoint)> = Vec::new();
        let mut breakpoints: Vec<IntPoint> = rect.corners().to_vec();

        for path in &partial {
            for (a, b) in path.edges() {
                if let Some((p, q)) = clip_segment(a, b, rect) {
                    for end in [p, q] {
                        if rect.on_boundary(end) {
                            breakpoints.push(end);
                        }
                    }
                    if p != q {
                        soup.push((p, q));
                    }
                }
            }
        }
        for path in &inside {
            breakpoints.extend(path.points().iter().filter(|&&v| rect.on_boundary(v)));
        }

        soup.extend(self.boundary_runs(rect, &breakpoints));
        let stitched = stitch_segments(&soup);
        debug!(
            partial = partial.len(),
            pieces = stitched.len(),
            "Clipped loops crossing the clip rectangle"
        );
        pieces.extend(stitched);
        pieces
    }

    /// Stretches of the rectangle boundary that lie inside the subject region.
    fn boundary_runs(&self, rect: &IntRect, breakpoints: &[IntPoint]) -> Vec<(IntPoint, IntPoint)> {
        let corners = rect.corners();
        let mut runs = Vec::new();

        for side in 0..4 {
            let (from, to) = (corners[side], corners[(side + 1) % 4]);
            let mut stops: Vec<IntPoint> = breakpoints
                .iter()
                .copied()
                .filter(|&p| on_segment(from, to, p))
                .collect();
            stops.sort_by_key(|p| p.distance_squared(from));
            stops.dedup();

            for pair in stops.windows(2) {
                let (p, q) = (pair[0], pair[1]);
                let mid = IntPoint::new(p.x + q.x, p.y + q.y);
                let mut covered = false;
                let mut depth = 0usize;
                for path in &self.subjects {
                    match path.locate_scaled(mid, 2) {
                        PointLocation::OnBoundary => {
                            covered = true;
                            break;
                        }
                        PointLocation::Inside => depth += 1,
                        PointLocation::Outside => {}
                    }
                }
                if !covered && depth % 2 == 1 {
                    runs.push((p, q));
                }
            }
        }
        runs
    }
}

/// Clips segment `a`-`b` to the rectangle (Cohen-Sutherland on the integer grid).
fn clip_segment(mut a: IntPoint, mut b: IntPoint, rect: &IntRect) -> Option<(IntPoint, IntPoint)> {
    // Rounding can leave a point just past a corner; a few extra passes settle it.
    for _ in 0..8 {
        let (ca, cb) = (rect.outcode(a), rect.outcode(b));
        if ca | cb == 0 {
            return Some((a, b));
        }
        if ca & cb != 0 {
            return None;
        }
        let code = if ca == 0 { cb } else { ca };
        let p = if code & TOP != 0 {
            IntPoint::new(along_x(a, b, rect.max.y), rect.max.y)
        } else if code & BOTTOM != 0 {
            IntPoint::new(along_x(a, b, rect.min.y), rect.min.y)
        } else if code & RIGHT != 0 {
            IntPoint::new(rect.max.x, along_y(a, b, rect.max.x))
        } else {
            IntPoint::new(rect.min.x, along_y(a, b, rect.min.x))
        };
        if code == ca {
            a = p;
        } else {
            b = p;
        }
    }
    None
}

/// X coordinate where segment `a`-`b` meets the line `Y = y`.
fn along_x(a: IntPoint, b: IntPoint, y: i64) -> i64 {
    let num = i128::from(b.x - a.x) * i128::from(y - a.y);
    i64::try_from(i128::from(a.x) + div_round(num, i128::from(b.y - a.y))).unwrap_or(a.x)
}

/// Y coordinate where segment `a`-`b` meets the line `X = x`.
fn along_y(a: IntPoint, b: IntPoint, x: i64) -> i64 {
    let num = i128::from(b.y - a.y) * i128::from(x - a.x);
    i64::try_from(i128::from(a.y) + div_round(num, i128::from(b.x - a.x))).unwrap_or(a.y)
}

/// Integer division rounding half away from zero.
fn div_round(num: i128, den: i128) -> i128 {
    if den == 0 {
        return 0;
    }
    let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
    if num >= 0 {
        (2 * num + den) / (2 * den)
    } else {
        -((-2 * num + den) / (2 * den))
    }
}

/// Chains undirected segments that share endpoints into closed loops.
fn stitch_segments(segments: &[(IntPoint, IntPoint)]) -> Vec<Path> {
    let mut incident: HashMap<IntPoint, Vec<usize>> = HashMap::new();
    for (i, &(p, q)) in segments.iter().enumerate() {
        incident.entry(p).or_default().push(i);
        incident.entry(q).or_default().push(i);
    }

    let mut used = vec![false; segments.len()];
    let mut loops = Vec::new();
    for first in 0..segments.len() {
        if used[first] {
            continue;
        }
        used[first] = true;
        let (origin, mut at) = segments[first];
        let mut points = vec![origin];
        let closed = loop {
            if at == origin {
                break true;
            }
            let next = incident
                .get(&at)
                .and_then(|list| list.iter().copied().find(|&i| !used[i]));
            let Some(next) = next else {
                break false;
            };
            used[next] = true;
            points.push(at);
            let (p, q) = segments[next];
            at = if p == at { q } else { p };
        };
        if closed {
            loops.push(Path::new(points));
        }
    }
    loops
}

/// Nests pieces by containment. Hole flags follow depth parity and contours
/// are oriented to match.
///
/// Pieces are inserted largest first, so every container is already in the
/// tree. Each piece descends from the root into the one child that holds it;
/// children whose bounds do not enclose the piece's bounds are skipped
/// without a point test.
fn build_tree(pieces: Vec<Path>) -> Result<PolyTree> {
    let mut pieces: Vec<(Path, Bounds)> = pieces
        .into_iter()
        .map(Path::cleaned)
        .filter(|p| p.len() >= 3 && p.area2() != 0)
        .filter_map(|p| p.bounds().map(|b| (p, b)))
        .collect();
    pieces.sort_by_key(|(p, _)| std::cmp::Reverse(p.area2().abs()));

    let mut tree = PolyTree::new();
    let mut bounds: SecondaryMap<PolyNodeId, Bounds> = SecondaryMap::with_capacity(pieces.len());

    for (piece, piece_bounds) in pieces {
        let mut parent = tree.root();
        'descend: loop {
            for &child in &tree.node(parent)?.children {
                let Some(&child_bounds) = bounds.get(child) else {
                    continue;
                };
                if encloses(child_bounds, piece_bounds)
                    && tree.node(child)?.contour.contains_path(&piece)
                {
                    parent = child;
                    continue 'descend;
                }
            }
            break;
        }

        let is_hole = !tree.node(parent)?.is_hole;
        let id = tree.add_child(parent, piece.oriented(!is_hole))?;
        bounds.insert(id, piece_bounds);
    }
    Ok(tree)
}

type Bounds = (IntPoint, IntPoint);

fn encloses((lo, hi): Bounds, (inner_lo, inner_hi): Bounds) -> bool {
    lo.x <= inner_lo.x && lo.y <= inner_lo.y && hi.x >= inner_hi.x && hi.y >= inner_hi.y
}

/// Returns `true` if any two edges of `paths` touch, apart from the shared
/// vertex of consecutive edges on the same path.
#[must_use]
pub fn has_self_intersection(paths: &[&Path]) -> bool {
    struct Edge {
        path: usize,
        index: usize,
        len: usize,
        a: IntPoint,
        b: IntPoint,
    }

    let mut edges: Vec<Edge> = Vec::new();
    for (path_idx, path) in paths.iter().enumerate() {
        let len = path.len();
        for (index, (a, b)) in path.edges().enumerate() {
            edges.push(Edge {
                path: path_idx,
                index,
                len,
                a,
                b,
            });
        }
    }
    edges.sort_by_key(|e| e.a.x.min(e.b.x));

    for (i, e) in edges.iter().enumerate() {
        let e_max_x = e.a.x.max(e.b.x);
        for f in &edges[i + 1..] {
            if f.a.x.min(f.b.x) > e_max_x {
                break;
            }
            let adjacent = e.path == f.path
                && ((e.index + 1) % e.len == f.index || (f.index + 1) % f.len == e.index);
            if adjacent {
                // Consecutive edges only meet at their shared vertex unless they fold back.
                let (shared, other_e, other_f) = if e.b == f.a {
                    (e.b, e.a, f.b)
                } else {
                    (e.a, e.b, f.a)
                };
                if cross(shared, other_e, other_f) == 0
                    && (on_segment(shared, other_e, other_f) || on_segment(shared, other_f, other_e))
                {
                    return true;
                }
                continue;
            }
            if segments_intersect(e.a, e.b, f.a, f.b) {
                return true;
            }
        }
    }
    false
}
