use tracing::debug;

use crate::error::Result;
use crate::topology::{DiscreteShape, PolyNodeId, PolyTree};

/// Splits a containment tree into independent shapes.
///
/// Every solid node becomes the outer boundary of one shape and takes its
/// immediate hole children along. Solids nested inside those holes are
/// found by descending further and become shapes of their own.
pub struct PartitionShapes<'a> {
    tree: &'a PolyTree,
}

impl<'a> PartitionShapes<'a> {
    /// Creates a new `PartitionShapes` operation.
    #[must_use]
    pub fn new(tree: &'a PolyTree) -> Self {
        Self { tree }
    }

    /// Executes the partition, returning shapes in depth-first order.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NodeNotFound`](crate::error::GeometryError::NodeNotFound)
    /// if the tree references a missing node.
    pub fn execute(&self) -> Result<Vec<DiscreteShape>> {
        let mut shapes = Vec::new();
        self.visit(self.tree.root(), &mut shapes)?;
        debug!(shapes = shapes.len(), "Partitioned containment tree");
        Ok(shapes)
    }

    fn visit(&self, id: PolyNodeId, shapes: &mut Vec<DiscreteShape>) -> Result<()> {
        let node = self.tree.node(id)?;
        if !node.is_hole {
            let mut holes = Vec::new();
            for &child in &node.children {
                let child = self.tree.node(child)?;
                if child.is_hole {
                    holes.push(child.contour.clone());
                }
            }
            shapes.push(DiscreteShape::new(node.contour.clone(), holes));
        }
        for &child in &node.children {
            self.visit(child, shapes)?;
        }
        Ok(())
    }
}
