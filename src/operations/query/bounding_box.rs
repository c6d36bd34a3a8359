use crate::math::Point3;
use crate::tessellation::TriangleMesh;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Center point.
    #[must_use]
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }
}

/// Computes the axis-aligned bounding box of a mesh.
pub struct BoundingBox<'a> {
    mesh: &'a TriangleMesh,
}

impl<'a> BoundingBox<'a> {
    /// Creates a new `BoundingBox` query.
    #[must_use]
    pub fn new(mesh: &'a TriangleMesh) -> Self {
        Self { mesh }
    }

    /// Executes the query, returning `None` for a mesh without vertices.
    #[must_use]
    pub fn execute(&self) -> Option<Aabb> {
        let first = *self.mesh.vertices.first()?;
        Some(
            self.mesh
                .vertices
                .iter()
                .fold(Aabb { min: first, max: first }, |b, v| Aabb {
                    min: Point3::new(b.min.x.min(v.x), b.min.y.min(v.y), b.min.z.min(v.z)),
                    max: Point3::new(b.max.x.max(v.x), b.max.y.max(v.y), b.max.z.max(v.z)),
                }),
        )
    }
}
