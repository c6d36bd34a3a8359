pub mod config;
pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;
pub mod pipeline;
pub mod tessellation;
pub mod topology;

pub use config::{LayoutParams, OutlineConfig};
pub use error::{OutlineError, Result};
pub use pipeline::{OutlinePipeline, OutlineSolid};
