use crate::error::{GeometryError, Result};

/// A single-channel intensity image, stored row-major with row 0 at the top.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    width: usize,
    height: usize,
    samples: Vec<u8>,
}

impl RasterImage {
    /// Wraps a sample buffer of exactly `width * height` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::ImageSize`] if the buffer length does not match.
    pub fn new(width: usize, height: usize, samples: Vec<u8>) -> Result<Self> {
        if width.checked_mul(height) != Some(samples.len()) {
            return Err(GeometryError::ImageSize {
                width,
                height,
                actual: samples.len(),
            }
            .into());
        }
        Ok(Self {
            width,
            height,
            samples,
        })
    }

    /// Creates an image with every sample set to `value`.
    #[must_use]
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            samples: vec![value; width * height],
        }
    }

    /// Creates an image by evaluating `f(x, y)` for every pixel.
    #[must_use]
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> u8) -> Self {
        let mut samples = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                samples.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            samples,
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Returns `true` if the image has no pixels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the sample at column `x`, row `y`, if it is inside the image.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        if x < self.width && y < self.height {
            Some(self.samples[y * self.width + x])
        } else {
            None
        }
    }

    /// Returns the sample at a signed position, or `background` outside the image.
    #[must_use]
    pub fn sample_or(&self, x: i64, y: i64, background: u8) -> u8 {
        match (usize::try_from(x), usize::try_from(y)) {
            (Ok(x), Ok(y)) => self.get(x, y).unwrap_or(background),
            _ => background,
        }
    }
}

#[cfg(feature = "image")]
impl From<&image::GrayImage> for RasterImage {
    fn from(img: &image::GrayImage) -> Self {
        let (w, h) = img.dimensions();
        Self {
            width: w as usize,
            height: h as usize,
            samples: img.as_raw().clone(),
        }
    }
}

#[cfg(feature = "image")]
impl From<&image::DynamicImage> for RasterImage {
    fn from(img: &image::DynamicImage) -> Self {
        Self::from(&img.to_luma8())
    }
}
