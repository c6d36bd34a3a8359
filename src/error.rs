use thiserror::Error;

/// Top-level error type for the outline extrusion pipeline.
#[derive(Debug, Error)]
pub enum OutlineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),
}

/// Rejected configuration values. Raised before any processing starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parameter {parameter} = {value} is invalid: {reason}")]
    InvalidParameter {
        parameter: &'static str,
        value: f64,
        reason: &'static str,
    },
}

/// Errors related to input geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("image buffer holds {actual} samples, expected {width}x{height}")]
    ImageSize {
        width: usize,
        height: usize,
        actual: usize,
    },

    #[error("containment node not found")]
    NodeNotFound,
}

/// Errors related to tessellation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("polygon boundary self-intersects")]
    SelfIntersection,

    #[error("tessellation failed: {0}")]
    Failed(String),
}

/// Convenience type alias for results using [`OutlineError`].
pub type Result<T> = std::result::Result<T, OutlineError>;
