pub mod discrete_shape;
pub mod poly_tree;

pub use discrete_shape::DiscreteShape;
pub use poly_tree::{PolyNode, PolyNodeId, PolyTree};
