use crate::tessellation::TriangleMesh;

/// Computes the enclosed volume of a closed mesh.
///
/// Sums the signed volume of the tetrahedron spanned by the origin and each
/// triangle, `(1/6) * v0 . (v1 x v2)`. Outward winding gives a positive
/// result.
pub struct Volume<'a> {
    mesh: &'a TriangleMesh,
}

impl<'a> Volume<'a> {
    /// Creates a new `Volume` query.
    #[must_use]
    pub fn new(mesh: &'a TriangleMesh) -> Self {
        Self { mesh }
    }

    /// Executes the query, returning the signed volume.
    #[must_use]
    pub fn execute(&self) -> f64 {
        let mut signed_volume = 0.0;
        for i in 0..self.mesh.face_count() {
            let [v0, v1, v2] = self.mesh.triangle(i);
            signed_volume += v0.coords.dot(&v1.coords.cross(&v2.coords));
        }
        signed_volume / 6.0
    }
}
