pub mod clip;
pub mod extrude;
pub mod layout;
pub mod partition;
pub mod query;
pub mod trace;

pub use clip::{ClipToRect, IntRect};
pub use extrude::ExtrudeShape;
pub use layout::ArrangeOnPlate;
pub use partition::PartitionShapes;
pub use trace::TraceContours;
