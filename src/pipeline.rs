use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, warn};

use crate::config::OutlineConfig;
use crate::error::Result;
use crate::geometry::{Path, RasterImage};
use crate::math::Point2;
use crate::operations::clip::{ClipToRect, IntRect};
use crate::operations::extrude::ExtrudeShape;
use crate::operations::partition::PartitionShapes;
use crate::operations::trace::TraceContours;
use crate::tessellation::TriangleMesh;
use crate::topology::DiscreteShape;

/// One extruded shape, ready to be placed on the plate.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineSolid {
    /// Closed prism with its base at `z = 0`.
    pub mesh: TriangleMesh,
    /// Centroid of the shape's outer boundary in working units, used as the
    /// first placement candidate.
    pub origin_hint: Option<Point2>,
}

/// Converts raster images into extruded solids.
///
/// A grayscale image goes through four stages: contour tracing, exact
/// integer clipping into a containment tree, partition into independent
/// shapes, and extrusion of each shape into a closed triangle mesh.
/// Tracing, clipping and partitioning never fail on valid input. A shape
/// that cannot be extruded is skipped; it does not take the rest of the
/// image down with it.
#[derive(Debug, Clone)]
pub struct OutlinePipeline {
    config: OutlineConfig,
}

impl OutlinePipeline {
    /// Creates a pipeline after validating `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidParameter`](crate::error::ConfigError::InvalidParameter)
    /// for the first out-of-range parameter.
    pub fn new(config: OutlineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Returns the configuration in use.
    #[must_use]
    pub fn config(&self) -> &OutlineConfig {
        &self.config
    }

    /// Traces the closed foreground boundaries of `image`.
    #[must_use]
    pub fn trace(&self, image: &RasterImage) -> Vec<Path> {
        TraceContours::new(image, self.config.threshold, self.config.background)
            .with_merge_distance(self.config.merge_distance)
            .execute()
    }

    /// Traces, clips and partitions `image` into independent shapes.
    ///
    /// # Errors
    ///
    /// Returns an error if the containment tree becomes inconsistent.
    pub fn shapes(&self, image: &RasterImage) -> Result<Vec<DiscreteShape>> {
        let loops = self.trace(image);
        if loops.is_empty() {
            return Ok(Vec::new());
        }
        let clip = IntRect::around_image(image.width(), image.height(), self.config.bounding_margin);
        let tree = ClipToRect::new(loops, clip).execute()?;
        PartitionShapes::new(&tree).execute()
    }

    /// Extrudes each shape, dropping the ones that produce no faces.
    ///
    /// # Errors
    ///
    /// Returns an error only for invalid extrusion parameters.
    pub fn extrude_shapes(&self, shapes: &[DiscreteShape]) -> Result<Vec<OutlineSolid>> {
        let mut solids = Vec::with_capacity(shapes.len());
        for (index, shape) in shapes.iter().enumerate() {
            let mesh = ExtrudeShape::new(shape, self.config.extrusion_height)
                .with_pixel_size(self.config.pixel_size)
                .execute()?;
            if mesh.face_count() == 0 {
                debug!(index, "Dropped shape without faces");
                continue;
            }
            solids.push(OutlineSolid {
                mesh,
                origin_hint: shape.outer_centroid(self.config.pixel_size),
            });
        }
        Ok(solids)
    }

    /// Runs every stage on one image.
    ///
    /// # Errors
    ///
    /// Returns an error if an internal stage reports an inconsistency.
    pub fn run(&self, image: &RasterImage) -> Result<Vec<OutlineSolid>> {
        info!(
            width = image.width(),
            height = image.height(),
            "Creating outline solids"
        );
        let shapes = self.shapes(image)?;
        let solids = self.extrude_shapes(&shapes)?;
        info!(
            shapes = shapes.len(),
            solids = solids.len(),
            "Finished outline solids"
        );
        Ok(solids)
    }

    /// Runs every image in turn.
    ///
    /// Each image gets its own result, so one failure never aborts the
    /// rest. `cancel` is checked before each image; once it is set the
    /// remaining images are skipped and the returned list is shorter than
    /// `images`. `progress` receives `(done, total)` after each image.
    pub fn run_batch(
        &self,
        images: &[RasterImage],
        cancel: &AtomicBool,
        mut progress: impl FnMut(usize, usize),
    ) -> Vec<Result<Vec<OutlineSolid>>> {
        let total = images.len();
        let mut results = Vec::with_capacity(total);
        for (index, image) in images.iter().enumerate() {
            if cancel.load(Ordering::Relaxed) {
                info!(done = index, total, "Batch cancelled");
                break;
            }
            let result = self.run(image);
            if let Err(err) = &result {
                warn!(index, error = %err, "Image failed");
            }
            results.push(result);
            progress(index + 1, total);
        }
        results
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, OutlineError};
    use crate::geometry::IntPoint;
    use crate::operations::query::{CapArea, IsWatertight, Volume};
    use approx::assert_relative_eq;

    fn config() -> OutlineConfig {
        OutlineConfig {
            threshold: 128,
            extrusion_height: 2.0,
            ..OutlineConfig::default()
        }
    }

    fn pipeline() -> OutlinePipeline {
        OutlinePipeline::new(config()).unwrap()
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    /// Square frames of `255` between the given half-open pixel bands.
    fn nested_squares(size: usize, bands: &[(usize, usize)]) -> RasterImage {
        RasterImage::from_fn(size, size, |x, y| {
            let depth = bands
                .iter()
                .filter(|&&(lo, hi)| (lo..hi).contains(&x) && (lo..hi).contains(&y))
                .count();
            if depth % 2 == 1 {
                255
            } else {
                0
            }
        })
    }

    #[test]
    fn invalid_height_is_rejected_up_front() {
        let err = OutlinePipeline::new(OutlineConfig {
            extrusion_height: -1.0,
            ..OutlineConfig::default()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            OutlineError::Config(ConfigError::InvalidParameter {
                parameter: "extrusion_height",
                ..
            })
        ));
    }

    #[test]
    fn blank_image_yields_nothing() {
        let image = RasterImage::filled(16, 16, 0);
        assert!(pipeline().run(&image).unwrap().is_empty());
    }

    #[test]
    fn rectangle_area_matches_pixel_count() {
        let image = RasterImage::from_fn(24, 16, |x, y| {
            if (4..14).contains(&x) && (5..11).contains(&y) {
                255
            } else {
                0
            }
        });
        let solids = pipeline().run(&image).unwrap();
        assert_eq!(solids.len(), 1);
        let mesh = &solids[0].mesh;
        assert!(IsWatertight::new(mesh).execute());
        assert!((CapArea::new(mesh).execute() - 60.0).abs() < 1.0);
    }

    #[test]
    fn annulus_is_one_shape_with_one_hole() {
        let image = nested_squares(30, &[(5, 25), (10, 20)]);
        let p = pipeline();
        let shapes = p.shapes(&image).unwrap();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].holes.len(), 1);

        let solids = p.extrude_shapes(&shapes).unwrap();
        assert_eq!(solids.len(), 1);
        let volume = Volume::new(&solids[0].mesh).execute();
        assert_relative_eq!(volume, shapes[0].area() * 2.0, epsilon = 1e-6);
        assert!((volume - (400.0 - 100.0) * 2.0).abs() < 2.0);
        assert!(IsWatertight::new(&solids[0].mesh).execute());
    }

    #[test]
    fn island_in_hole_is_a_second_shape() {
        let image = nested_squares(40, &[(5, 35), (12, 28), (17, 23)]);
        let shapes = pipeline().shapes(&image).unwrap();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].holes.len(), 1);
        assert!(shapes[1].holes.is_empty());
        assert!(shapes[0].outer.contains_path(&shapes[1].outer));

        let solids = pipeline().run(&image).unwrap();
        assert_eq!(solids.len(), 2);
    }

    #[test]
    fn every_traced_loop_lands_in_one_shape() {
        let image = nested_squares(50, &[(2, 48), (6, 30), (10, 20), (13, 17), (34, 44)]);
        let p = pipeline();
        let loops = p.trace(&image);
        let shapes = p.shapes(&image).unwrap();
        let polygons: usize = shapes.iter().map(DiscreteShape::polygon_count).sum();
        assert_eq!(polygons, loops.len());
        for shape in &shapes {
            assert!(shape.outer.is_ccw());
            assert!(shape.holes.iter().all(|h| !h.is_ccw()));
        }
    }

    #[test]
    fn margin_zero_clips_border_foreground() {
        let image = RasterImage::filled(8, 8, 255);
        let padded = pipeline().shapes(&image).unwrap();
        assert!(padded[0].area() > 60.0);

        let tight = OutlinePipeline::new(OutlineConfig {
            bounding_margin: 0.0,
            ..config()
        })
        .unwrap();
        let shapes = tight.shapes(&image).unwrap();
        assert_eq!(shapes.len(), 1);
        assert_relative_eq!(shapes[0].area(), 49.0, epsilon = 1e-9);
    }

    #[test]
    fn origin_hint_is_outer_centroid_in_units() {
        let image = nested_squares(20, &[(4, 10)]);
        let p = OutlinePipeline::new(OutlineConfig {
            pixel_size: 0.5,
            ..config()
        })
        .unwrap();
        let solids = p.run(&image).unwrap();
        let hint = solids[0].origin_hint.unwrap();
        // Pixels 4..=9 center on 6.5; rows flip to y = 19 - 6.5.
        assert_relative_eq!(hint.x, 6.5 * 0.5, epsilon = 1e-9);
        assert_relative_eq!(hint.y, 12.5 * 0.5, epsilon = 1e-9);
    }

    #[test]
    fn runs_are_repeatable() {
        let image = nested_squares(30, &[(3, 27), (8, 15), (17, 22)]);
        let p = pipeline();
        assert_eq!(p.run(&image).unwrap(), p.run(&image).unwrap());
    }

    #[test]
    fn failed_shape_is_skipped_without_losing_others() {
        let good = DiscreteShape::new(
            Path::new(vec![
                IntPoint::new(0, 0),
                IntPoint::new(4000, 0),
                IntPoint::new(4000, 4000),
                IntPoint::new(0, 4000),
            ]),
            vec![],
        );
        let bow_tie = DiscreteShape::new(
            Path::new(vec![
                IntPoint::new(0, 0),
                IntPoint::new(4000, 4000),
                IntPoint::new(4000, 0),
                IntPoint::new(0, 4000),
            ]),
            vec![],
        );
        let solids = pipeline().extrude_shapes(&[bow_tie, good]).unwrap();
        assert_eq!(solids.len(), 1);
        assert_relative_eq!(Volume::new(&solids[0].mesh).execute(), 32.0, epsilon = 1e-9);
    }

    #[test]
    fn batch_reports_progress_and_keeps_going() {
        init_tracing();
        let images = vec![
            nested_squares(10, &[(2, 6)]),
            RasterImage::filled(10, 10, 0),
            nested_squares(10, &[(1, 9)]),
        ];
        let mut seen = Vec::new();
        let results = pipeline().run_batch(&images, &AtomicBool::new(false), |done, total| {
            seen.push((done, total));
        });
        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
        let counts: Vec<usize> = results.into_iter().map(|r| r.unwrap().len()).collect();
        assert_eq!(counts, vec![1, 0, 1]);
    }

    #[test]
    fn batch_stops_between_images_when_cancelled() {
        init_tracing();
        let images = vec![nested_squares(10, &[(2, 6)]); 4];
        let cancel = AtomicBool::new(false);
        let results = pipeline().run_batch(&images, &cancel, |done, _| {
            if done == 2 {
                cancel.store(true, Ordering::Relaxed);
            }
        });
        assert_eq!(results.len(), 2);
    }
}
