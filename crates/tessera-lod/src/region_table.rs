//! Distance-to-LOD classification.

use std::ops::RangeInclusive;

use crate::{LodError, PatchLayout};

/// Share of the far plane covered by the LOD regions when no value is configured.
pub const DEFAULT_CONTROL_FACTOR: f32 = 0.6;

/// Accepted range for the control factor. Values outside are clamped.
pub const CONTROL_FACTOR_RANGE: RangeInclusive<f32> = 0.5..=0.7;

/// Ascending distance thresholds, one per LOD level.
///
/// Level `i` gets weight `i + 1`, so the finest level owns the smallest slice
/// of `far_plane * control_factor` and each coarser level a larger one.
/// Distances past the last threshold fall back to `max_lod`.
#[derive(Clone, Debug)]
pub struct LodRegionTable {
    layout: PatchLayout,
    far_plane: f32,
    control_factor: f32,
    thresholds: Vec<f32>,
}

impl LodRegionTable {
    /// Build the table with [`DEFAULT_CONTROL_FACTOR`].
    pub fn new(
        patch_size: usize,
        num_patches_x: usize,
        num_patches_z: usize,
        world_scale: f32,
        far_plane: f32,
    ) -> Result<Self, LodError> {
        let layout = PatchLayout::new(patch_size, num_patches_x, num_patches_z, world_scale)?;
        Ok(Self::for_layout(&layout, far_plane, DEFAULT_CONTROL_FACTOR))
    }

    /// Build the table for an already validated layout.
    ///
    /// `control_factor` is clamped into [`CONTROL_FACTOR_RANGE`].
    pub fn for_layout(layout: &PatchLayout, far_plane: f32, control_factor: f32) -> Self {
        let clamped = clamp_control_factor(control_factor);
        if clamped != control_factor {
            tracing::warn!(
                requested = control_factor,
                used = clamped,
                "LOD control factor out of range, clamping"
            );
        }

        let levels = layout.max_lod() as usize + 1;
        let weight_sum = (levels * (levels + 1) / 2) as f32;
        let unit = far_plane.max(0.0) * clamped / weight_sum;

        let mut thresholds = Vec::with_capacity(levels);
        let mut running = 0.0;
        for level in 0..levels {
            running += unit * (level + 1) as f32;
            thresholds.push(running);
        }

        Self {
            layout: *layout,
            far_plane,
            control_factor: clamped,
            thresholds,
        }
    }

    /// Coarsest LOD index.
    pub fn max_lod(&self) -> u32 {
        self.layout.max_lod()
    }

    pub fn layout(&self) -> &PatchLayout {
        &self.layout
    }

    pub fn far_plane(&self) -> f32 {
        self.far_plane
    }

    pub fn control_factor(&self) -> f32 {
        self.control_factor
    }

    /// Upper distance bound of each level, ascending.
    pub fn thresholds(&self) -> &[f32] {
        &self.thresholds
    }

    /// LOD for a camera-to-patch distance.
    ///
    /// Returns the first level whose threshold exceeds `distance`, or
    /// `max_lod` when none does.
    pub fn distance_to_lod(&self, distance: f32) -> u32 {
        self.thresholds
            .iter()
            .position(|&threshold| distance < threshold)
            .map_or(self.max_lod(), |level| level as u32)
    }
}

fn clamp_control_factor(value: f32) -> f32 {
    if value.is_nan() {
        return DEFAULT_CONTROL_FACTOR;
    }
    value.clamp(*CONTROL_FACTOR_RANGE.start(), *CONTROL_FACTOR_RANGE.end())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(patch_size: usize, far_plane: f32) -> LodRegionTable {
        LodRegionTable::new(patch_size, 4, 4, 1.0, far_plane).unwrap()
    }

    #[test]
    fn test_init_reports_max_lod() {
        assert_eq!(table(33, 1000.0).max_lod(), 4);
        assert_eq!(table(65, 1000.0).max_lod(), 5);
        assert_eq!(table(3, 1000.0).max_lod(), 0);
    }

    #[test]
    fn test_init_rejects_bad_patch_size() {
        for patch_size in [0, 2, 4, 32, 34] {
            assert!(
                LodRegionTable::new(patch_size, 2, 2, 1.0, 1000.0).is_err(),
                "patch_size {patch_size} must fail"
            );
        }
    }

    #[test]
    fn test_thresholds_follow_triangular_weights() {
        // 33 -> max_lod 4 -> weights 1..=5, sum 15; 1500 * 0.6 / 15 = 60.
        let t = table(33, 1500.0);
        let expected = [60.0, 180.0, 360.0, 600.0, 900.0];
        assert_eq!(t.thresholds().len(), expected.len());
        for (got, want) in t.thresholds().iter().zip(expected) {
            assert!((got - want).abs() < 1e-3, "threshold {got} != {want}");
        }
    }

    #[test]
    fn test_boundaries_are_exclusive() {
        let t = table(33, 1500.0);
        assert_eq!(t.distance_to_lod(0.0), 0);
        assert_eq!(t.distance_to_lod(59.9), 0);
        assert_eq!(t.distance_to_lod(60.0), 1);
        assert_eq!(t.distance_to_lod(899.0), 4);
        assert_eq!(t.distance_to_lod(5000.0), 4, "beyond last threshold is max_lod");
    }

    #[test]
    fn test_distance_to_lod_is_monotonic_and_in_range() {
        let t = table(65, 2000.0);
        let mut previous = 0;
        for step in 0..4000 {
            let lod = t.distance_to_lod(step as f32 * 0.75);
            assert!(lod >= previous, "LOD decreased at step {step}");
            assert!(lod <= t.max_lod(), "LOD {lod} above max");
            previous = lod;
        }
        assert_eq!(previous, t.max_lod());
    }

    #[test]
    fn test_control_factor_is_clamped() {
        let layout = PatchLayout::new(17, 2, 2, 1.0).unwrap();
        assert_eq!(LodRegionTable::for_layout(&layout, 100.0, 0.1).control_factor(), 0.5);
        assert_eq!(LodRegionTable::for_layout(&layout, 100.0, 2.0).control_factor(), 0.7);
        assert_eq!(
            LodRegionTable::for_layout(&layout, 100.0, f32::NAN).control_factor(),
            DEFAULT_CONTROL_FACTOR
        );
    }

    #[test]
    fn test_non_positive_far_plane_selects_coarsest() {
        let t = table(17, 0.0);
        assert_eq!(t.distance_to_lod(0.0), t.max_lod());
    }
}
