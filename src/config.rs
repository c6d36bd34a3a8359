use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Parameters for turning one raster image into extruded solids.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlineConfig {
    /// Samples at or above this value are foreground.
    pub threshold: u8,
    /// Intensity assumed for every sample outside the image.
    pub background: u8,
    /// Distance in pixels below which loop endpoints are unified.
    pub merge_distance: f64,
    /// Height of the extruded solids, in working units.
    pub extrusion_height: f64,
    /// Padding in pixels added around the image bounds before clipping.
    pub bounding_margin: f64,
    /// Working units per pixel.
    pub pixel_size: f64,
}

impl Default for OutlineConfig {
    fn default() -> Self {
        Self {
            threshold: 5,
            background: 0,
            merge_distance: 0.05,
            extrusion_height: 10.0,
            bounding_margin: 1.0,
            pixel_size: 1.0,
        }
    }
}

impl OutlineConfig {
    /// Checks every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] for the first value that is
    /// out of range.
    pub fn validate(&self) -> Result<()> {
        require_positive("extrusion_height", self.extrusion_height)?;
        require_positive("pixel_size", self.pixel_size)?;
        require_non_negative("merge_distance", self.merge_distance)?;
        require_non_negative("bounding_margin", self.bounding_margin)?;
        Ok(())
    }
}

/// Parameters for arranging solids on the build plate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    /// Plate extent in X and Y, centered on the origin.
    pub plate_size: [f64; 2],
    /// Minimum gap kept between two footprints.
    pub spacing: f64,
    /// Distance between candidate positions while searching outward.
    pub step: f64,
    /// Recenter the whole group on the origin once everything is placed.
    pub center: bool,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            plate_size: [200.0, 200.0],
            spacing: 2.0,
            step: 1.0,
            center: true,
        }
    }
}

impl LayoutParams {
    /// Checks every parameter.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`] for the first value that is
    /// out of range.
    pub fn validate(&self) -> Result<()> {
        require_positive("plate_size.x", self.plate_size[0])?;
        require_positive("plate_size.y", self.plate_size[1])?;
        require_non_negative("spacing", self.spacing)?;
        require_positive("step", self.step)?;
        Ok(())
    }
}

pub(crate) fn require_positive(parameter: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidParameter {
            parameter,
            value,
            reason: "must be a finite value greater than zero",
        }
        .into());
    }
    Ok(())
}

pub(crate) fn require_non_negative(parameter: &'static str, value: f64) -> Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidParameter {
            parameter,
            value,
            reason: "must be a finite value of at least zero",
        }
        .into());
    }
    Ok(())
}
