//! Byte density fields sampled on a regular grid

use isocrate_core::{Error, Point3f, Result, Vector3f};
use serde::{Deserialize, Serialize};

/// A `width x height x depth` grid of `u8` density samples.
///
/// Samples are stored x-fastest: `x + y * width + z * width * height`.
/// The surface is where the density equals the iso value; samples strictly
/// above it count as inside.
///
/// Deserialized fields go through [`DensityField::from_samples`], so a
/// sample buffer that does not match the dimensions is rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDensityField")]
pub struct DensityField {
    samples: Vec<u8>,
    dimensions: [usize; 3],
}

/// Unchecked serialized form of a [`DensityField`]
#[derive(Debug, Clone, Deserialize)]
struct RawDensityField {
    samples: Vec<u8>,
    dimensions: [usize; 3],
}

impl TryFrom<RawDensityField> for DensityField {
    type Error = Error;

    fn try_from(raw: RawDensityField) -> Result<Self> {
        Self::from_samples(raw.dimensions, raw.samples)
    }
}

impl DensityField {
    /// Create a zero filled field
    pub fn new(dimensions: [usize; 3]) -> Result<Self> {
        let count = Self::sample_count(dimensions)?;
        Ok(Self {
            samples: vec![0; count],
            dimensions,
        })
    }

    /// Wrap existing samples; the length must match the dimensions
    pub fn from_samples(dimensions: [usize; 3], samples: Vec<u8>) -> Result<Self> {
        let count = Self::sample_count(dimensions)?;
        if samples.len() != count {
            return Err(Error::InvalidData(format!(
                "Density field {:?} needs {} samples, got {}",
                dimensions,
                count,
                samples.len()
            )));
        }

        Ok(Self {
            samples,
            dimensions,
        })
    }

    /// Fill a field by evaluating `f(x, y, z)` at every sample
    pub fn from_fn<F>(dimensions: [usize; 3], mut f: F) -> Result<Self>
    where
        F: FnMut(usize, usize, usize) -> u8,
    {
        let count = Self::sample_count(dimensions)?;
        let mut samples = Vec::with_capacity(count);
        for z in 0..dimensions[2] {
            for y in 0..dimensions[1] {
                for x in 0..dimensions[0] {
                    samples.push(f(x, y, z));
                }
            }
        }

        Ok(Self {
            samples,
            dimensions,
        })
    }

    /// Solid ball test volume.
    ///
    /// Density falls linearly from 255 to 0 across a shell of width
    /// `falloff` centred on `radius`, so the surface at iso 127 sits at
    /// (almost exactly) `radius` grid units from `center`.
    pub fn sphere(
        dimensions: [usize; 3],
        center: Point3f,
        radius: f32,
        falloff: f32,
    ) -> Result<Self> {
        if !(falloff > 0.0) {
            return Err(Error::InvalidData(format!(
                "Sphere falloff must be positive, got {}",
                falloff
            )));
        }

        Self::from_fn(dimensions, |x, y, z| {
            let p = Point3f::new(x as f32, y as f32, z as f32);
            let signed = radius - (p - center).magnitude();
            (127.5 + 255.0 * signed / falloff).clamp(0.0, 255.0) as u8
        })
    }

    fn sample_count(dimensions: [usize; 3]) -> Result<usize> {
        if dimensions.contains(&0) {
            return Err(Error::InvalidData(format!(
                "Density field dimensions must be non-zero, got {:?}",
                dimensions
            )));
        }

        dimensions
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .ok_or_else(|| {
                Error::InvalidData(format!("Density field {:?} is too large", dimensions))
            })
    }

    /// Grid dimensions in samples
    pub fn dimensions(&self) -> [usize; 3] {
        self.dimensions
    }

    pub fn width(&self) -> usize {
        self.dimensions[0]
    }

    pub fn height(&self) -> usize {
        self.dimensions[1]
    }

    pub fn depth(&self) -> usize {
        self.dimensions[2]
    }

    /// Number of cells along each axis (one fewer than samples)
    pub fn cell_dimensions(&self) -> [usize; 3] {
        self.dimensions.map(|d| d - 1)
    }

    pub fn cell_count(&self) -> usize {
        self.cell_dimensions().iter().product()
    }

    /// Raw samples in storage order
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    /// Linear storage index of a sample
    #[inline]
    pub fn index_of(&self, x: usize, y: usize, z: usize) -> usize {
        x + self.dimensions[0] * (y + self.dimensions[1] * z)
    }

    fn contains(&self, x: usize, y: usize, z: usize) -> bool {
        x < self.dimensions[0] && y < self.dimensions[1] && z < self.dimensions[2]
    }

    /// Sample at grid coordinates (with bounds checking)
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<u8> {
        if self.contains(x, y, z) {
            Some(self.samples[self.index_of(x, y, z)])
        } else {
            None
        }
    }

    /// Overwrite a sample
    pub fn set(&mut self, x: usize, y: usize, z: usize, value: u8) -> Result<()> {
        if !self.contains(x, y, z) {
            return Err(Error::OutOfBounds {
                x,
                y,
                z,
                dimensions: self.dimensions,
            });
        }

        let index = self.index_of(x, y, z);
        self.samples[index] = value;
        Ok(())
    }

    /// Sample at coordinates already known to be inside the field.
    ///
    /// Panics when out of range; extraction only calls this after the
    /// region has been validated.
    #[inline]
    pub fn sample(&self, x: usize, y: usize, z: usize) -> u8 {
        self.samples[self.index_of(x, y, z)]
    }

    /// Central difference density gradient, one-sided at the field faces
    pub fn gradient(&self, x: usize, y: usize, z: usize) -> Vector3f {
        let p = [x, y, z];
        let mut gradient = Vector3f::zeros();

        for axis in 0..3 {
            let lo = p[axis].saturating_sub(1);
            let hi = (p[axis] + 1).min(self.dimensions[axis] - 1);
            if hi == lo {
                continue;
            }

            let mut a = p;
            let mut b = p;
            a[axis] = lo;
            b[axis] = hi;
            let delta =
                self.sample(b[0], b[1], b[2]) as f32 - self.sample(a[0], a[1], a[2]) as f32;
            gradient[axis] = delta / (hi - lo) as f32;
        }

        gradient
    }
}
