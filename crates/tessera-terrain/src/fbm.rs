//! Multi-octave fractal Brownian motion (fBm) height generation.
//!
//! Composites several octaves of simplex noise so the terrain has features at
//! many spatial frequencies. Coordinates are grid cells, not world units, so a
//! height field keeps its shape when the world scale changes.

use noise::{NoiseFn, Simplex};

use crate::{HeightField, HeightFieldError};

/// Configuration for multi-octave fBm noise.
#[derive(Clone, Debug, PartialEq)]
pub struct FbmParams {
    /// Seed for deterministic generation.
    pub seed: u32,
    /// Number of noise octaves to composite.
    pub octaves: u32,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// Frequency of the first octave, in cycles per grid cell.
    pub base_frequency: f64,
    /// Amplitude of the first octave, in height units.
    pub amplitude: f64,
}

impl Default for FbmParams {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 6,
            lacunarity: 2.0,
            persistence: 0.5,
            base_frequency: 0.01,
            amplitude: 64.0,
        }
    }
}

/// Samples fBm heights over simplex noise.
pub struct FbmSampler {
    noise: Simplex,
    params: FbmParams,
}

impl FbmSampler {
    pub fn new(params: FbmParams) -> Self {
        Self {
            noise: Simplex::new(params.seed),
            params,
        }
    }

    /// Height at a fractional grid coordinate.
    ///
    /// The result lies within `[-max_amplitude, +max_amplitude]`.
    pub fn sample(&self, x: f64, z: f64) -> f64 {
        let mut total = 0.0;
        let mut frequency = self.params.base_frequency;
        let mut amplitude = self.params.amplitude;

        for _ in 0..self.params.octaves {
            total += self.noise.get([x * frequency, z * frequency]) * amplitude;
            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }

        total
    }

    /// Geometric sum of all octave amplitudes.
    pub fn max_amplitude(&self) -> f64 {
        (0..self.params.octaves)
            .map(|i| self.params.amplitude * self.params.persistence.powi(i as i32))
            .sum()
    }

    /// Fill a `size`×`size` field with fBm heights.
    pub fn generate(&self, size: usize) -> Result<HeightField, HeightFieldError> {
        let heights = (0..size * size)
            .map(|i| self.sample((i % size) as f64, (i / size) as f64) as f32)
            .collect();
        HeightField::from_heights(size, heights)
    }

    pub fn params(&self) -> &FbmParams {
        &self.params
    }
}
