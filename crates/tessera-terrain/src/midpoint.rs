//! Midpoint-displacement (diamond-square) fractal terrain.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::{HeightField, HeightFieldError};

/// Parameters for [`midpoint_displacement`].
#[derive(Clone, Debug, PartialEq)]
pub struct MidpointParams {
    /// Seed for the displacement RNG.
    pub seed: u64,
    /// Each subdivision scales the displacement by `2^-roughness`.
    /// Higher values produce smoother terrain.
    pub roughness: f32,
    /// Lowest height after rescaling.
    pub min_height: f32,
    /// Highest height after rescaling.
    pub max_height: f32,
}

impl Default for MidpointParams {
    fn default() -> Self {
        Self {
            seed: 0,
            roughness: 1.0,
            min_height: 0.0,
            max_height: 256.0,
        }
    }
}

/// Generate a `size`×`size` fractal field with diamond-square subdivision.
///
/// Sizes that are not `2^n + 1` are generated on the next such grid and cropped.
/// The result is rescaled to `[min_height, max_height]`.
pub fn midpoint_displacement(
    size: usize,
    params: &MidpointParams,
) -> Result<HeightField, HeightFieldError> {
    if size < 2 {
        return Err(HeightFieldError::TooSmall { size });
    }

    let grid = (size - 1).next_power_of_two() + 1;
    let mut heights = vec![0.0f32; grid * grid];
    let at = |x: usize, z: usize| z * grid + x;

    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let reduce = 2.0f32.powf(-params.roughness);
    let mut amplitude = 1.0f32;
    let mut rect = grid - 1;

    while rect >= 2 {
        let half = rect / 2;

        // Diamond step: centre of every square.
        for z in (0..grid - 1).step_by(rect) {
            for x in (0..grid - 1).step_by(rect) {
                let avg = (heights[at(x, z)]
                    + heights[at(x + rect, z)]
                    + heights[at(x, z + rect)]
                    + heights[at(x + rect, z + rect)])
                    * 0.25;
                heights[at(x + half, z + half)] = avg + jitter(&mut rng, amplitude);
            }
        }

        // Square step: midpoint of every edge, averaging whichever of the four
        // diamond neighbours exist.
        for z in (0..grid).step_by(half) {
            let x_start = if (z / half) % 2 == 0 { half } else { 0 };
            for x in (x_start..grid).step_by(rect) {
                let mut sum = 0.0;
                let mut count = 0.0;
                if x >= half {
                    sum += heights[at(x - half, z)];
                    count += 1.0;
                }
                if x + half < grid {
                    sum += heights[at(x + half, z)];
                    count += 1.0;
                }
                if z >= half {
                    sum += heights[at(x, z - half)];
                    count += 1.0;
                }
                if z + half < grid {
                    sum += heights[at(x, z + half)];
                    count += 1.0;
                }
                heights[at(x, z)] = sum / count + jitter(&mut rng, amplitude);
            }
        }

        amplitude *= reduce;
        rect /= 2;
    }

    let cropped = (0..size * size)
        .map(|i| heights[at(i % size, i / size)])
        .collect();
    let mut field = HeightField::from_heights(size, cropped)?;
    field.normalize_to(params.min_height, params.max_height);
    Ok(field)
}

fn jitter(rng: &mut ChaCha8Rng, amplitude: f32) -> f32 {
    if amplitude > 0.0 {
        rng.random_range(-amplitude..amplitude)
    } else {
        0.0
    }
}
