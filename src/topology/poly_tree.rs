use slotmap::SlotMap;

use crate::error::GeometryError;
use crate::geometry::Path;

slotmap::new_key_type! {
    /// Unique identifier for a node in a [`PolyTree`].
    pub struct PolyNodeId;
}

/// One polygon in a containment tree.
#[derive(Debug, Clone)]
pub struct PolyNode {
    /// Boundary of this node. Empty for the synthetic root.
    pub contour: Path,
    /// `true` if the contour bounds a hole rather than solid material.
    pub is_hole: bool,
    /// Enclosing node, `None` for the root.
    pub parent: Option<PolyNodeId>,
    /// Polygons directly nested inside this one.
    pub children: Vec<PolyNodeId>,
}

/// Containment tree of clipped polygons.
///
/// The root carries no boundary and counts as a hole, so its children are
/// solids, their children holes, and so on by alternating depth.
#[derive(Debug)]
pub struct PolyTree {
    nodes: SlotMap<PolyNodeId, PolyNode>,
    root: PolyNodeId,
}

impl Default for PolyTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PolyTree {
    /// Creates a tree holding only the synthetic root.
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(PolyNode {
            contour: Path::default(),
            is_hole: true,
            parent: None,
            children: Vec::new(),
        });
        Self { nodes, root }
    }

    /// Returns the synthetic root.
    #[must_use]
    pub fn root(&self) -> PolyNodeId {
        self.root
    }

    /// Returns a reference to the node, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NodeNotFound`] for a stale or foreign id.
    pub fn node(&self, id: PolyNodeId) -> Result<&PolyNode, GeometryError> {
        self.nodes.get(id).ok_or(GeometryError::NodeNotFound)
    }

    /// Inserts `contour` as a child of `parent`. The hole flag is the
    /// opposite of the parent's.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NodeNotFound`] if `parent` is not in the tree.
    pub fn add_child(
        &mut self,
        parent: PolyNodeId,
        contour: Path,
    ) -> Result<PolyNodeId, GeometryError> {
        let is_hole = !self.node(parent)?.is_hole;
        let id = self.nodes.insert(PolyNode {
            contour,
            is_hole,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes
            .get_mut(parent)
            .ok_or(GeometryError::NodeNotFound)?
            .children
            .push(id);
        Ok(id)
    }

    /// Number of polygons, not counting the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Returns `true` if the tree holds no polygons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Nesting depth of a node; the root's children are at depth 0.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::NodeNotFound`] for an unknown id.
    pub fn depth(&self, id: PolyNodeId) -> Result<usize, GeometryError> {
        let mut depth = 0;
        let mut current = self.node(id)?.parent;
        while let Some(parent) = current {
            if parent == self.root {
                return Ok(depth);
            }
            depth += 1;
            current = self.node(parent)?.parent;
        }
        Err(GeometryError::NodeNotFound)
    }

    /// Node ids in depth-first pre-order, root excluded.
    #[must_use]
    pub fn iter_depth_first(&self) -> Vec<PolyNodeId> {
        let mut order = Vec::with_capacity(self.len());
        let mut stack: Vec<PolyNodeId> = Vec::new();
        if let Some(root) = self.nodes.get(self.root) {
            stack.extend(root.children.iter().rev());
        }
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(node) = self.nodes.get(id) {
                stack.extend(node.children.iter().rev());
            }
        }
        order
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::geometry::IntPoint;

    fn square(size: i64) -> Path {
        Path::new(vec![
            IntPoint::new(-size, -size),
            IntPoint::new(size, -size),
            IntPoint::new(size, size),
            IntPoint::new(-size, size),
        ])
    }

    #[test]
    fn new_tree_is_empty_with_hole_root() {
        let tree = PolyTree::new();
        assert!(tree.is_empty());
        let root = tree.node(tree.root()).unwrap();
        assert!(root.is_hole);
        assert!(root.contour.is_empty());
        assert!(root.parent.is_none());
    }

    #[test]
    fn hole_flag_alternates_with_depth() {
        let mut tree = PolyTree::new();
        let a = tree.add_child(tree.root(), square(30)).unwrap();
        let b = tree.add_child(a, square(20)).unwrap();
        let c = tree.add_child(b, square(10)).unwrap();

        assert!(!tree.node(a).unwrap().is_hole);
        assert!(tree.node(b).unwrap().is_hole);
        assert!(!tree.node(c).unwrap().is_hole);
        assert_eq!(tree.depth(a).unwrap(), 0);
        assert_eq!(tree.depth(c).unwrap(), 2);
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn depth_first_order_visits_children_in_insertion_order() {
        let mut tree = PolyTree::new();
        let a = tree.add_child(tree.root(), square(30)).unwrap();
        let a1 = tree.add_child(a, square(5)).unwrap();
        let b = tree.add_child(tree.root(), square(3)).unwrap();
        assert_eq!(tree.iter_depth_first(), vec![a, a1, b]);
    }

    #[test]
    fn unknown_parent_is_rejected() {
        let mut larger = PolyTree::new();
        let mut deepest = larger.root();
        for _ in 0..5 {
            deepest = larger.add_child(deepest, square(1)).unwrap();
        }

        let mut tree = PolyTree::new();
        assert!(matches!(
            tree.add_child(deepest, square(1)),
            Err(GeometryError::NodeNotFound)
        ));
    }
}
