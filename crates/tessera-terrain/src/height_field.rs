//! The square elevation grid that every other terrain subsystem reads from.

use crate::HeightFieldError;

/// An inclusive rectangle of grid cells, `x0..=x1` by `z0..=z1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridRect {
    pub x0: usize,
    pub z0: usize,
    pub x1: usize,
    pub z1: usize,
}

impl GridRect {
    /// Create a rectangle from inclusive corners.
    pub fn new(x0: usize, z0: usize, x1: usize, z1: usize) -> Self {
        debug_assert!(x0 <= x1 && z0 <= z1, "inverted grid rect");
        Self { x0, z0, x1, z1 }
    }

    /// The rectangle covering a whole `size`×`size` grid.
    pub fn full(size: usize) -> Self {
        Self::new(0, 0, size - 1, size - 1)
    }

    /// Clamp a signed, possibly out-of-range rectangle into `[0, size)`.
    ///
    /// Returns `None` when the rectangle lies entirely outside the grid.
    pub fn clamped(x0: i64, z0: i64, x1: i64, z1: i64, size: usize) -> Option<Self> {
        let max = size as i64 - 1;
        if x1 < 0 || z1 < 0 || x0 > max || z0 > max || x0 > x1 || z0 > z1 {
            return None;
        }
        Some(Self::new(
            x0.clamp(0, max) as usize,
            z0.clamp(0, max) as usize,
            x1.clamp(0, max) as usize,
            z1.clamp(0, max) as usize,
        ))
    }

    /// Grow by `ring` cells on every side, clamped to `[0, size)`.
    pub fn expanded(&self, ring: usize, size: usize) -> Self {
        Self::new(
            self.x0.saturating_sub(ring),
            self.z0.saturating_sub(ring),
            (self.x1 + ring).min(size - 1),
            (self.z1 + ring).min(size - 1),
        )
    }

    /// Whether two rectangles share at least one cell.
    pub fn intersects(&self, other: &GridRect) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1 && self.z0 <= other.z1 && other.z0 <= self.z1
    }

    pub fn contains(&self, x: usize, z: usize) -> bool {
        (self.x0..=self.x1).contains(&x) && (self.z0..=self.z1).contains(&z)
    }

    pub fn width(&self) -> usize {
        self.x1 - self.x0 + 1
    }

    /// Iterate cells row by row (`z` outer, `x` inner).
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (self.z0..=self.z1).flat_map(move |z| (self.x0..=self.x1).map(move |x| (x, z)))
    }
}

/// A `size`×`size` grid of heights stored row-major (`z * size + x`).
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    size: usize,
    heights: Vec<f32>,
}

impl HeightField {
    /// Create a flat field at height zero.
    pub fn new(size: usize) -> Result<Self, HeightFieldError> {
        Self::flat(size, 0.0)
    }

    /// Create a flat field at the given height.
    pub fn flat(size: usize, height: f32) -> Result<Self, HeightFieldError> {
        if size < 2 {
            return Err(HeightFieldError::TooSmall { size });
        }
        Ok(Self {
            size,
            heights: vec![height; size * size],
        })
    }

    /// Wrap an existing row-major sample buffer.
    pub fn from_heights(size: usize, heights: Vec<f32>) -> Result<Self, HeightFieldError> {
        if size < 2 {
            return Err(HeightFieldError::TooSmall { size });
        }
        if heights.len() != size * size {
            return Err(HeightFieldError::SampleCountMismatch {
                expected: size * size,
                actual: heights.len(),
            });
        }
        Ok(Self { size, heights })
    }

    /// Samples per side.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Row-major samples.
    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    /// Row-major index of a grid cell.
    #[inline]
    pub fn index(&self, x: usize, z: usize) -> usize {
        debug_assert!(x < self.size && z < self.size, "({x}, {z}) out of bounds");
        z * self.size + x
    }

    /// Height at an in-bounds grid cell.
    #[inline]
    pub fn get(&self, x: usize, z: usize) -> f32 {
        self.heights[self.index(x, z)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, z: usize, height: f32) {
        let i = self.index(x, z);
        self.heights[i] = height;
    }

    /// Bilinear sample at fractional grid coordinates, clamped to the grid.
    pub fn sample_bilinear(&self, gx: f32, gz: f32) -> f32 {
        let max = (self.size - 1) as f32;
        let gx = if gx.is_finite() { gx.clamp(0.0, max) } else { 0.0 };
        let gz = if gz.is_finite() { gz.clamp(0.0, max) } else { 0.0 };

        let x0 = gx.floor() as usize;
        let z0 = gz.floor() as usize;
        let x1 = (x0 + 1).min(self.size - 1);
        let z1 = (z0 + 1).min(self.size - 1);
        let fx = gx - x0 as f32;
        let fz = gz - z0 as f32;

        let bottom = self.get(x0, z0) * (1.0 - fx) + self.get(x1, z0) * fx;
        let top = self.get(x0, z1) * (1.0 - fx) + self.get(x1, z1) * fx;
        bottom * (1.0 - fz) + top * fz
    }

    /// Minimum and maximum height over the whole field.
    pub fn min_max(&self) -> (f32, f32) {
        self.region_min_max(&GridRect::full(self.size))
    }

    /// Minimum and maximum height inside `rect`.
    pub fn region_min_max(&self, rect: &GridRect) -> (f32, f32) {
        rect.cells()
            .map(|(x, z)| self.get(x, z))
            .fold((f32::MAX, f32::MIN), |(lo, hi), h| (lo.min(h), hi.max(h)))
    }

    /// Linearly remap all heights so they span `[min_height, max_height]`.
    ///
    /// A field with no variation collapses to `min_height`.
    pub fn normalize_to(&mut self, min_height: f32, max_height: f32) {
        let (lo, hi) = self.min_max();
        let range = hi - lo;
        if range <= f32::EPSILON {
            self.heights.fill(min_height);
            return;
        }
        let target = max_height - min_height;
        for h in &mut self.heights {
            *h = min_height + (*h - lo) / range * target;
        }
    }

    /// Check that the field tiles exactly into patches of `patch_size` vertices.
    ///
    /// Returns the number of patches along each side.
    pub fn patches_per_side(&self, patch_size: usize) -> Result<usize, HeightFieldError> {
        if patch_size < 2 || (self.size - 1) % (patch_size - 1) != 0 {
            return Err(HeightFieldError::IncompatiblePatchSize {
                size: self.size,
                patch_size,
            });
        }
        Ok((self.size - 1) / (patch_size - 1))
    }
}
