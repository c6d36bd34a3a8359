use std::collections::HashSet;

use tracing::{debug, warn};

use crate::config::require_positive;
use crate::error::{OutlineError, Result, TessellationError};
use crate::geometry::{IntPoint, SCALE};
use crate::math::{Point2, Point3};
use crate::operations::clip::has_self_intersection;
use crate::tessellation::{TessellatePolygon, TriangleMesh};
use crate::topology::DiscreteShape;

/// Extrudes a shape straight up along +Z into a closed prism.
///
/// The bottom cap sits at `z = 0`, the top cap at `z = height`. X and Y are
/// the traced pixel coordinates multiplied by the pixel size.
pub struct ExtrudeShape<'a> {
    shape: &'a DiscreteShape,
    height: f64,
    pixel_size: f64,
}

impl<'a> ExtrudeShape<'a> {
    /// Creates a new `ExtrudeShape` operation with a pixel size of 1.
    #[must_use]
    pub fn new(shape: &'a DiscreteShape, height: f64) -> Self {
        Self {
            shape,
            height,
            pixel_size: 1.0,
        }
    }

    /// Sets the number of working units per pixel.
    #[must_use]
    pub fn with_pixel_size(mut self, pixel_size: f64) -> Self {
        self.pixel_size = pixel_size;
        self
    }

    /// Executes the extrusion.
    ///
    /// A shape that cannot form a valid solid (crossing or touching
    /// boundaries, fewer than three distinct vertices, nothing left to
    /// triangulate) yields an empty mesh. Callers check
    /// [`TriangleMesh::face_count`] before using the result.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`](crate::error::ConfigError::InvalidParameter)
    /// if the height or pixel size is not a positive finite number.
    pub fn execute(&self) -> Result<TriangleMesh> {
        require_positive("extrusion_height", self.height)?;
        require_positive("pixel_size", self.pixel_size)?;

        match self.build() {
            Ok(mesh) => {
                debug!(
                    vertices = mesh.vertices.len(),
                    faces = mesh.face_count(),
                    "Extruded shape"
                );
                Ok(mesh)
            }
            Err(OutlineError::Tessellation(err)) => {
                warn!(error = %err, holes = self.shape.holes.len(), "Skipping shape");
                Ok(TriangleMesh::default())
            }
            Err(err) => Err(err),
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn build(&self) -> Result<TriangleMesh> {
        let distinct: HashSet<IntPoint> = self
            .shape
            .polygons()
            .flat_map(|p| p.points().iter().copied())
            .collect();
        if distinct.len() < 3 {
            return Err(TessellationError::Failed("fewer than 3 distinct vertices".into()).into());
        }

        let polygons: Vec<_> = self.shape.polygons().collect();
        if has_self_intersection(&polygons) {
            return Err(TessellationError::SelfIntersection.into());
        }

        // Grid coordinates are exact in f64, so the triangulation sees the
        // same topology the integer checks above saw.
        let loops: Vec<Vec<Point2>> = polygons
            .iter()
            .map(|p| {
                p.points()
                    .iter()
                    .map(|q| Point2::new(q.x as f64, q.y as f64))
                    .collect()
            })
            .collect();
        let planar = TessellatePolygon::new(&loops).execute()?;

        let k = self.pixel_size / SCALE as f64;
        let n = planar.points.len() as u32;
        let mut mesh = TriangleMesh::default();
        mesh.vertices.reserve(planar.points.len() * 2);
        for z in [0.0, self.height] {
            mesh.vertices
                .extend(planar.points.iter().map(|p| Point3::new(p.x * k, p.y * k, z)));
        }

        mesh.indices
            .reserve(planar.triangles.len() * 2 + planar.boundary.len() * 2);
        for &[a, b, c] in &planar.triangles {
            mesh.indices.push([n + a, n + b, n + c]);
            mesh.indices.push([c, b, a]);
        }
        // Interior is left of a -> b, so the outside faces right.
        for &[a, b] in &planar.boundary {
            mesh.indices.push([a, b, n + b]);
            mesh.indices.push([a, n + b, n + a]);
        }
        Ok(mesh)
    }
}
