mod bounding_box;
mod cap_area;
mod is_watertight;
mod volume;

pub use bounding_box::{Aabb, BoundingBox};
pub use cap_area::CapArea;
pub use is_watertight::IsWatertight;
pub use volume::Volume;
