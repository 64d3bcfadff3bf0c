//! Brush weighting curves and positional noise.

use std::collections::hash_map::DefaultHasher;
use std::f32::consts::PI;
use std::hash::{Hash, Hasher};

/// Relative height jitter added to raise/lower so strokes are not perfectly radial.
pub const DEFAULT_RAISE_JITTER: f32 = 0.05;

/// Weight at normalized distance `d` (0 at the center, 1 at the rim).
///
/// 70% quadratic plus 30% raised cosine: a rounded dome that reaches exactly
/// zero at the rim. Outside the rim the weight is zero.
pub fn brush_falloff(d: f32) -> f32 {
    if !(0.0..=1.0).contains(&d) {
        return 0.0;
    }
    0.7 * (1.0 - d * d) + 0.3 * 0.5 * (1.0 + (d * PI).cos())
}

/// Blend factor pulling a height toward the flatten target.
///
/// `1 - (1 - falloff²)^(s / (1 - s))`: strength 0.5 gives exactly
/// `falloff²`, strength 1 snaps the whole footprint to the target and
/// strength 0 leaves it untouched.
pub fn flatten_blend(falloff: f32, strength: f32) -> f32 {
    if falloff <= 0.0 || strength <= 0.0 {
        return 0.0;
    }
    if strength >= 1.0 {
        return 1.0;
    }
    let base = (1.0 - falloff * falloff).clamp(0.0, 1.0);
    1.0 - base.powf(strength / (1.0 - strength))
}

/// Deterministic value in `[-1, 1]` for grid cell `(x, z)` under `seed`.
pub fn cell_noise(x: usize, z: usize, seed: u64) -> f32 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    x.hash(&mut hasher);
    z.hash(&mut hasher);
    let bits = (hasher.finish() >> 40) as u32;
    bits as f32 / ((1u32 << 24) - 1) as f32 * 2.0 - 1.0
}
