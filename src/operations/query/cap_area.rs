use crate::math::TOLERANCE;
use crate::tessellation::TriangleMesh;

/// Computes the area of the upward-facing flat cap of an extruded mesh.
///
/// Only triangles whose normal points along +Z contribute. For a prism this
/// is the area of the shape it was extruded from.
pub struct CapArea<'a> {
    mesh: &'a TriangleMesh,
}

impl<'a> CapArea<'a> {
    /// Creates a new `CapArea` query.
    #[must_use]
    pub fn new(mesh: &'a TriangleMesh) -> Self {
        Self { mesh }
    }

    /// Executes the query, returning the projected area.
    #[must_use]
    pub fn execute(&self) -> f64 {
        let mut area = 0.0;
        for i in 0..self.mesh.face_count() {
            let [a, b, c] = self.mesh.triangle(i);
            let normal = (b - a).cross(&(c - a));
            if normal.z > TOLERANCE && normal.x.abs() < TOLERANCE && normal.y.abs() < TOLERANCE {
                area += 0.5 * normal.z;
            }
        }
        area
    }
}
