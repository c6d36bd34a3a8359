mod tessellate_polygon;

pub use tessellate_polygon::{PlanarTriangulation, TessellatePolygon};

use crate::math::{Point3, Vector3};

/// An indexed triangle mesh.
///
/// Faces wind counter-clockwise when seen from outside the solid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}

impl TriangleMesh {
    /// Number of triangular faces. Zero signals a shape that could not be built.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.indices.len()
    }

    /// Returns `true` if the mesh has no faces.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Moves every vertex by `offset`.
    pub fn translate(&mut self, offset: Vector3) {
        for v in &mut self.vertices {
            *v += offset;
        }
    }

    /// Returns the three corners of face `i`.
    #[must_use]
    pub fn triangle(&self, i: usize) -> [Point3; 3] {
        let [a, b, c] = self.indices[i];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }
}
