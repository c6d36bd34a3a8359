use std::collections::{HashMap, HashSet, VecDeque};

use spade::handles::{FixedFaceHandle, InnerTag};
use spade::{
    ConstrainedDelaunayTriangulation, InsertionError, Point2 as SpadePoint2, Triangulation,
};

use crate::error::{Result, TessellationError};
use crate::math::Point2;

type Cdt = ConstrainedDelaunayTriangulation<SpadePoint2<f64>>;

/// Triangulated planar region.
#[derive(Debug, Clone, Default)]
pub struct PlanarTriangulation {
    /// Triangulation vertices.
    pub points: Vec<Point2>,
    /// Interior triangles, counter-clockwise.
    pub triangles: Vec<[u32; 3]>,
    /// Boundary edges `from -> to`, with the interior on the left.
    pub boundary: Vec<[u32; 2]>,
}

/// Triangulates a planar region bounded by closed loops using CDT.
///
/// The region is every point enclosed by an odd number of loops, so an
/// outer boundary plus its holes needs no orientation fix-up.
pub struct TessellatePolygon<'a> {
    loops: &'a [Vec<Point2>],
}

impl<'a> TessellatePolygon<'a> {
    /// Creates a new `TessellatePolygon` operation.
    #[must_use]
    pub fn new(loops: &'a [Vec<Point2>]) -> Self {
        Self { loops }
    }

    /// Executes the tessellation.
    ///
    /// Loops must not cross each other or themselves.
    ///
    /// # Errors
    ///
    /// Returns [`TessellationError::SelfIntersection`] if a boundary edge
    /// crosses one inserted before it, and [`TessellationError::Failed`] if a
    /// loop has fewer than three points, a point cannot be inserted, or no
    /// interior triangle remains.
    #[allow(clippy::cast_possible_truncation)]
    pub fn execute(&self) -> Result<PlanarTriangulation> {
        let mut cdt = Cdt::new();
        for points in self.loops {
            insert_constraint_loop(&mut cdt, points)?;
        }

        let interior = classify_interior_faces(&cdt);
        if interior.is_empty() {
            return Err(TessellationError::Failed("no interior triangles".into()).into());
        }

        let mut out = PlanarTriangulation::default();
        let mut vertex_map: HashMap<usize, u32> = HashMap::new();
        let mut map_vertex = |idx: usize, pos: SpadePoint2<f64>, out: &mut PlanarTriangulation| {
            *vertex_map.entry(idx).or_insert_with(|| {
                out.points.push(Point2::new(pos.x, pos.y));
                (out.points.len() - 1) as u32
            })
        };

        for face in cdt.inner_faces() {
            if !interior.contains(&face.fix().index()) {
                continue;
            }
            let verts = face.vertices();
            let mut tri = [0u32; 3];
            for (slot, vh) in tri.iter_mut().zip(verts.iter()) {
                *slot = map_vertex(vh.fix().index(), vh.position(), &mut out);
            }
            out.triangles.push(tri);
        }

        let inside = |face: Option<usize>| face.is_some_and(|idx| interior.contains(&idx));

        for edge in cdt.directed_edges() {
            if !cdt.is_constraint_edge(edge.as_undirected().fix()) {
                continue;
            }
            let left = inside(edge.face().as_inner().map(|f| f.fix().index()));
            let right = inside(edge.rev().face().as_inner().map(|f| f.fix().index()));
            if left && !right {
                let from = edge.from();
                let to = edge.to();
                let a = map_vertex(from.fix().index(), from.position(), &mut out);
                let b = map_vertex(to.fix().index(), to.position(), &mut out);
                out.boundary.push([a, b]);
            }
        }

        Ok(out)
    }
}

/// Adds one closed loop, vertices first, then its edges as constraints.
fn insert_constraint_loop(cdt: &mut Cdt, points: &[Point2]) -> Result<()> {
    if points.len() < 3 {
        return Err(
            TessellationError::Failed("constraint loop needs at least 3 points".into()).into(),
        );
    }

    let mut handles = Vec::with_capacity(points.len());
    for pt in points {
        let h = cdt
            .insert(SpadePoint2::new(pt.x, pt.y))
            .map_err(|e: InsertionError| TessellationError::Failed(format!("CDT insert: {e}")))?;
        handles.push(h);
    }

    for i in 0..handles.len() {
        let from = handles[i];
        let to = handles[(i + 1) % handles.len()];
        if from == to {
            continue;
        }
        if !cdt.can_add_constraint(from, to) {
            return Err(TessellationError::SelfIntersection.into());
        }
        cdt.add_constraint(from, to);
    }

    Ok(())
}

/// Inner faces enclosed by an odd number of constraint loops.
fn classify_interior_faces(cdt: &Cdt) -> HashSet<usize> {
    let outer = cdt.outer_face().fix();
    let mut seen = HashSet::new();
    let mut interior = HashSet::new();

    // Hull faces start outside; each constraint crossed flips parity.
    let mut queue: VecDeque<(FixedFaceHandle<InnerTag>, bool)> = cdt
        .directed_edges()
        .filter(|e| e.face().fix() == outer)
        .filter_map(|e| {
            let face = e.rev().face().as_inner()?;
            Some((face.fix(), cdt.is_constraint_edge(e.as_undirected().fix())))
        })
        .collect();

    while let Some((fix, inside)) = queue.pop_front() {
        if !seen.insert(fix.index()) {
            continue;
        }
        if inside {
            interior.insert(fix.index());
        }
        for edge in cdt.face(fix).adjacent_edges() {
            let Some(next) = edge.rev().face().as_inner() else {
                continue;
            };
            if !seen.contains(&next.fix().index()) {
                let flip = cdt.is_constraint_edge(edge.as_undirected().fix());
                queue.push_back((next.fix(), inside != flip));
            }
        }
    }

    interior
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn triangle_area(t: &PlanarTriangulation, tri: [u32; 3]) -> f64 {
        let a = t.points[tri[0] as usize];
        let b = t.points[tri[1] as usize];
        let c = t.points[tri[2] as usize];
        0.5 * ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y))
    }

    #[test]
    fn square_produces_2_triangles() {
        let loops = vec![vec![p(0.0, 0.0), p(4.0, 0.0), p(4.0, 4.0), p(0.0, 4.0)]];
        let t = TessellatePolygon::new(&loops).execute().unwrap();
        assert_eq!(t.triangles.len(), 2);
        assert_eq!(t.points.len(), 4);
        assert_eq!(t.boundary.len(), 4);
    }

    #[test]
    fn l_shape_concave_tessellates() {
        let loops = vec![vec![
            p(0.0, 0.0),
            p(4.0, 0.0),
            p(4.0, 2.0),
            p(2.0, 2.0),
            p(2.0, 4.0),
            p(0.0, 4.0),
        ]];
        let t = TessellatePolygon::new(&loops).execute().unwrap();
        // L-shape (6 vertices, concave) → 4 triangles
        assert_eq!(t.triangles.len(), 4);
        let area: f64 = t.triangles.iter().map(|&tri| triangle_area(&t, tri)).sum();
        assert!((area - 12.0).abs() < 1e-9);
    }

    #[test]
    fn triangles_are_counter_clockwise() {
        let loops = vec![vec![p(0.0, 0.0), p(0.0, 3.0), p(3.0, 3.0), p(3.0, 0.0)]];
        let t = TessellatePolygon::new(&loops).execute().unwrap();
        for &tri in &t.triangles {
            assert!(triangle_area(&t, tri) > 0.0);
        }
    }

    #[test]
    fn hole_is_excluded_and_bounded() {
        let loops = vec![
            vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)],
            vec![p(3.0, 3.0), p(3.0, 7.0), p(7.0, 7.0), p(7.0, 3.0)],
        ];
        let t = TessellatePolygon::new(&loops).execute().unwrap();

        let area: f64 = t.triangles.iter().map(|&tri| triangle_area(&t, tri)).sum();
        assert!((area - 84.0).abs() < 1e-9);
        assert_eq!(t.boundary.len(), 8);

        for &tri in &t.triangles {
            let c = [0, 1, 2]
                .iter()
                .map(|&k| t.points[tri[k] as usize])
                .fold((0.0, 0.0), |acc, q| (acc.0 + q.x / 3.0, acc.1 + q.y / 3.0));
            let in_hole = c.0 > 3.0 && c.0 < 7.0 && c.1 > 3.0 && c.1 < 7.0;
            assert!(!in_hole, "triangle centroid {c:?} is inside the hole");
        }
    }

    #[test]
    fn island_inside_hole_is_filled() {
        let loops = vec![
            vec![p(0.0, 0.0), p(10.0, 0.0), p(10.0, 10.0), p(0.0, 10.0)],
            vec![p(2.0, 2.0), p(2.0, 8.0), p(8.0, 8.0), p(8.0, 2.0)],
            vec![p(4.0, 4.0), p(6.0, 4.0), p(6.0, 6.0), p(4.0, 6.0)],
        ];
        let t = TessellatePolygon::new(&loops).execute().unwrap();
        let area: f64 = t.triangles.iter().map(|&tri| triangle_area(&t, tri)).sum();
        assert!((area - (100.0 - 36.0 + 4.0)).abs() < 1e-9);
        assert_eq!(t.boundary.len(), 12);
    }

    #[test]
    fn boundary_keeps_interior_on_the_left() {
        let loops = vec![vec![p(0.0, 0.0), p(2.0, 0.0), p(2.0, 2.0), p(0.0, 2.0)]];
        let t = TessellatePolygon::new(&loops).execute().unwrap();
        for &[a, b] in &t.boundary {
            let (a, b) = (t.points[a as usize], t.points[b as usize]);
            let mid = p((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
            let left = p(mid.x - (b.y - a.y) * 0.1, mid.y + (b.x - a.x) * 0.1);
            assert!(left.x > 0.0 && left.x < 2.0 && left.y > 0.0 && left.y < 2.0);
        }
    }

    #[test]
    fn short_loop_is_rejected() {
        let loops = vec![vec![p(0.0, 0.0), p(1.0, 0.0)]];
        assert!(TessellatePolygon::new(&loops).execute().is_err());
    }
}
