pub mod int_point;
pub mod path;
pub mod raster;

pub use int_point::{IntPoint, SCALE};
pub use path::{Path, PointLocation, PolygonSet};
pub use raster::RasterImage;
