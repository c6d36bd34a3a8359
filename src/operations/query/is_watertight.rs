use std::collections::HashMap;

use crate::tessellation::TriangleMesh;

/// Checks that a mesh is closed and consistently wound.
///
/// Every directed edge must be matched by exactly one face using it in the
/// opposite direction. Vertices are compared by index, so seams must share
/// vertices.
pub struct IsWatertight<'a> {
    mesh: &'a TriangleMesh,
}

impl<'a> IsWatertight<'a> {
    /// Creates a new `IsWatertight` query.
    #[must_use]
    pub fn new(mesh: &'a TriangleMesh) -> Self {
        Self { mesh }
    }

    /// Executes the query. An empty mesh is not watertight.
    #[must_use]
    pub fn execute(&self) -> bool {
        if self.mesh.is_empty() {
            return false;
        }
        let mut directed: HashMap<(u32, u32), usize> = HashMap::new();
        for &[a, b, c] in &self.mesh.indices {
            for edge in [(a, b), (b, c), (c, a)] {
                *directed.entry(edge).or_insert(0) += 1;
            }
        }
        directed
            .iter()
            .all(|(&(a, b), &count)| count == 1 && directed.get(&(b, a)) == Some(&1))
    }
}
