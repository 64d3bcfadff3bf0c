//! Stroke state and the per-cell brush passes.

use glam::Vec2;
use tessera_splat::{SplatMode, SplatPaintStore, SplatStroke};
use tessera_terrain::{GridRect, HeightField};

use crate::{BrushKind, BrushParams, DEFAULT_RAISE_JITTER, brush_falloff, cell_noise, flatten_blend};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BrushSettings {
    /// Relative jitter on raise/lower, see [`DEFAULT_RAISE_JITTER`].
    pub raise_jitter: f32,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            raise_jitter: DEFAULT_RAISE_JITTER,
        }
    }
}

/// `Idle -> Painting -> Idle`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum StrokeState {
    #[default]
    Idle,
    Painting {
        /// Height under the stroke's first center, the flatten target.
        base_height: f32,
        /// Seed for the noise brush, fixed for the whole stroke.
        seed: u64,
    },
}

/// Applies brushes to terrain data. Holds only stroke state; the height
/// field and splat store are borrowed per call.
#[derive(Debug, Default)]
pub struct BrushEngine {
    settings: BrushSettings,
    state: StrokeState,
    strokes: u64,
}

impl BrushEngine {
    pub fn new(settings: BrushSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn settings(&self) -> &BrushSettings {
        &self.settings
    }

    pub fn state(&self) -> StrokeState {
        self.state
    }

    pub fn is_painting(&self) -> bool {
        self.state != StrokeState::Idle
    }

    /// Enter `Painting`, sampling the flatten target at `center` (world units).
    ///
    /// Starting while already painting restarts the stroke.
    pub fn begin_stroke(&mut self, field: &HeightField, center: Vec2, world_scale: f32) {
        let grid = center / world_scale;
        let base_height = field.sample_bilinear(grid.x, grid.y);
        self.strokes += 1;
        self.state = StrokeState::Painting {
            base_height,
            seed: self.strokes,
        };
        tracing::debug!(?center, base_height, stroke = self.strokes, "brush stroke started");
    }

    pub fn end_stroke(&mut self) {
        if self.is_painting() {
            tracing::debug!(stroke = self.strokes, "brush stroke ended");
        }
        self.state = StrokeState::Idle;
    }

    /// Apply a sculpting brush.
    ///
    /// When idle the call is a one-off stroke: it begins a stroke at
    /// `params.center` and ends it again before returning.
    ///
    /// Returns the grid rectangle whose heights may have changed, or `None`
    /// when nothing was touched (paint kinds, non-positive radius, or a
    /// footprint entirely off the terrain).
    pub fn apply_height(
        &mut self,
        field: &mut HeightField,
        params: &BrushParams,
        world_scale: f32,
    ) -> Option<GridRect> {
        if !params.kind.edits_height() || !(params.radius > 0.0) || !(world_scale > 0.0) {
            return None;
        }

        let center = params.center / world_scale;
        let radius = params.radius / world_scale;
        let rect = GridRect::clamped(
            (center.x - radius).floor() as i64,
            (center.y - radius).floor() as i64,
            (center.x + radius).ceil() as i64,
            (center.y + radius).ceil() as i64,
            field.size(),
        )?;

        let one_off = !self.is_painting();
        if one_off {
            self.begin_stroke(field, params.center, world_scale);
        }
        let StrokeState::Painting { base_height, seed } = self.state else {
            return None;
        };

        // Smoothing reads neighbors as they were before this pass.
        let snapshot = (params.kind == BrushKind::Smooth).then(|| Snapshot::capture(field, &rect));

        for (x, z) in rect.cells() {
            let d = Vec2::new(x as f32, z as f32).distance(center) / radius;
            if d > 1.0 {
                continue;
            }
            let falloff = brush_falloff(d);
            let h = field.get(x, z);
            let updated = match params.kind {
                BrushKind::Raise | BrushKind::Lower => {
                    let sign = if params.kind == BrushKind::Raise { 1.0 } else { -1.0 };
                    let jitter = 1.0 + self.settings.raise_jitter * cell_noise(x, z, 0);
                    h + sign * params.strength * falloff * jitter
                }
                BrushKind::Flatten => {
                    let t = flatten_blend(falloff, params.strength);
                    h * (1.0 - t) + base_height * t
                }
                BrushKind::Smooth => match &snapshot {
                    Some(snapshot) => {
                        let t = falloff * params.strength.clamp(0.0, 1.0);
                        h * (1.0 - t) + snapshot.box_average(x, z) * t
                    }
                    None => h,
                },
                BrushKind::Noise => h + params.strength * falloff * cell_noise(x, z, seed),
                BrushKind::Paint | BrushKind::Erase => h,
            };
            field.set(x, z, updated);
        }

        tracing::debug!(
            kind = params.kind.name(),
            ?rect,
            strength = params.strength,
            "height brush applied"
        );
        if one_off {
            self.end_stroke();
        }
        Some(rect)
    }

    /// Apply a paint or erase brush. Returns the number of texels changed.
    pub fn apply_paint(&mut self, store: &mut SplatPaintStore, params: &BrushParams) -> usize {
        let mode = match params.kind {
            BrushKind::Paint => SplatMode::Paint,
            BrushKind::Erase => SplatMode::Erase,
            _ => return 0,
        };
        store.paint_stroke(&SplatStroke {
            center: params.center,
            radius: params.radius,
            strength: params.strength,
            texture_index: params.texture_index,
            mode,
        })
    }
}

/// Heights of `rect` grown by one cell, for 3x3 averaging.
struct Snapshot {
    area: GridRect,
    heights: Vec<f32>,
}

impl Snapshot {
    fn capture(field: &HeightField, rect: &GridRect) -> Self {
        let area = rect.expanded(1, field.size());
        let heights = area.cells().map(|(x, z)| field.get(x, z)).collect();
        Self { area, heights }
    }

    fn get(&self, x: usize, z: usize) -> f32 {
        self.heights[(z - self.area.z0) * self.area.width() + (x - self.area.x0)]
    }

    /// Mean of the 3x3 neighborhood, clipped at the snapshot edge.
    fn box_average(&self, x: usize, z: usize) -> f32 {
        let (mut sum, mut count) = (0.0, 0.0);
        for nz in z.saturating_sub(1)..=(z + 1).min(self.area.z1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(self.area.x1) {
                if self.area.contains(nx, nz) {
                    sum += self.get(nx, nz);
                    count += 1.0;
                }
            }
        }
        sum / count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> BrushEngine {
        BrushEngine::new(BrushSettings::default())
    }

    fn ramp(size: usize) -> HeightField {
        let heights = (0..size * size).map(|i| (i % size) as f32).collect();
        HeightField::from_heights(size, heights).unwrap()
    }

    fn brush(kind: BrushKind, x: f32, z: f32, radius: f32, strength: f32) -> BrushParams {
        BrushParams::new(kind, Vec2::new(x, z), radius, strength)
    }

    #[test]
    fn test_raise_peaks_at_centre_and_spares_outside() {
        let mut field = HeightField::flat(33, 0.0).unwrap();
        let rect = engine()
            .apply_height(&mut field, &brush(BrushKind::Raise, 16.0, 16.0, 5.0, 2.0), 1.0)
            .unwrap();
        assert_eq!(rect, GridRect::new(11, 11, 21, 21));

        let centre = field.get(16, 16);
        assert!((centre - 2.0).abs() <= 2.0 * DEFAULT_RAISE_JITTER + 1e-5, "centre {centre}");
        assert!(field.get(18, 16) < centre);
        assert_eq!(field.get(16, 22), 0.0, "outside the radius");
        assert_eq!(field.get(11, 11), 0.0, "rect corner beyond the circle");
    }

    #[test]
    fn test_lower_mirrors_raise() {
        let mut up = HeightField::flat(17, 0.0).unwrap();
        let mut down = HeightField::flat(17, 0.0).unwrap();
        engine().apply_height(&mut up, &brush(BrushKind::Raise, 8.0, 8.0, 4.0, 1.0), 1.0);
        engine().apply_height(&mut down, &brush(BrushKind::Lower, 8.0, 8.0, 4.0, 1.0), 1.0);
        for (a, b) in up.heights().iter().zip(down.heights()) {
            assert!((a + b).abs() < 1e-6);
        }
    }

    #[test]
    fn test_flatten_full_strength_is_idempotent() {
        let mut once = ramp(33);
        let mut e = engine();
        let params = brush(BrushKind::Flatten, 16.0, 16.0, 6.0, 1.0);
        e.apply_height(&mut once, &params, 1.0);
        e.end_stroke();

        let mut twice = once.clone();
        e.apply_height(&mut twice, &params, 1.0);
        e.end_stroke();
        assert_eq!(once, twice);
        assert_eq!(once.get(16, 16), 16.0, "flattened to the height under the first centre");
        assert_eq!(once.get(19, 16), 16.0);
    }

    #[test]
    fn test_flatten_uses_stroke_start_height() {
        let mut field = ramp(33);
        let mut e = engine();
        e.begin_stroke(&field, Vec2::new(10.0, 16.0), 1.0);
        e.apply_height(&mut field, &brush(BrushKind::Flatten, 20.0, 16.0, 3.0, 1.0), 1.0);
        assert_eq!(field.get(20, 16), 10.0);
    }

    #[test]
    fn test_zero_strength_flatten_changes_nothing() {
        let mut field = ramp(17);
        let before = field.clone();
        engine().apply_height(&mut field, &brush(BrushKind::Flatten, 8.0, 8.0, 4.0, 0.0), 1.0);
        assert_eq!(field, before);
    }

    #[test]
    fn test_smooth_reduces_spike() {
        let mut field = HeightField::flat(17, 0.0).unwrap();
        field.set(8, 8, 9.0);
        engine().apply_height(&mut field, &brush(BrushKind::Smooth, 8.0, 8.0, 3.0, 1.0), 1.0);
        assert!((field.get(8, 8) - 1.0).abs() < 1e-5, "spike averaged to {}", field.get(8, 8));
        assert!(field.get(7, 8) > 0.0, "neighbours pick up some height");
    }

    #[test]
    fn test_smooth_leaves_plane_alone() {
        let mut field = HeightField::flat(17, 4.0).unwrap();
        engine().apply_height(&mut field, &brush(BrushKind::Smooth, 0.0, 0.0, 6.0, 1.0), 1.0);
        assert!(field.heights().iter().all(|&h| (h - 4.0).abs() < 1e-6));
    }

    #[test]
    fn test_noise_is_bounded_and_stroke_seeded() {
        let mut a = HeightField::flat(17, 0.0).unwrap();
        let mut e = engine();
        e.apply_height(&mut a, &brush(BrushKind::Noise, 8.0, 8.0, 5.0, 0.5), 1.0);
        assert!(a.heights().iter().all(|h| h.abs() <= 0.5));
        assert!(a.heights().iter().any(|&h| h != 0.0));

        e.end_stroke();
        let mut b = HeightField::flat(17, 0.0).unwrap();
        e.apply_height(&mut b, &brush(BrushKind::Noise, 8.0, 8.0, 5.0, 0.5), 1.0);
        assert_ne!(a, b, "a new stroke draws new noise");
    }

    #[test]
    fn test_brush_at_origin_touches_only_valid_cells() {
        let mut field = HeightField::flat(17, 0.0).unwrap();
        let rect = engine()
            .apply_height(&mut field, &brush(BrushKind::Raise, 0.0, 0.0, 4.0, 1.0), 1.0)
            .unwrap();
        assert_eq!((rect.x0, rect.z0), (0, 0));
        assert_eq!((rect.x1, rect.z1), (4, 4));
        assert!(field.get(0, 0) > 0.0);
    }

    #[test]
    fn test_oversized_brush_covers_at_most_the_terrain() {
        let mut field = HeightField::flat(9, 0.0).unwrap();
        let rect = engine()
            .apply_height(&mut field, &brush(BrushKind::Raise, 4.0, 4.0, 500.0, 1.0), 1.0)
            .unwrap();
        assert_eq!(rect, GridRect::full(9));
        assert!(field.heights().iter().all(|&h| h > 0.0));
    }

    #[test]
    fn test_degenerate_brushes_are_noops() {
        let mut field = HeightField::flat(9, 0.0).unwrap();
        let mut e = engine();
        for params in [
            brush(BrushKind::Raise, 4.0, 4.0, 0.0, 1.0),
            brush(BrushKind::Raise, -40.0, 4.0, 5.0, 1.0),
            brush(BrushKind::Paint, 4.0, 4.0, 5.0, 1.0),
        ] {
            assert!(e.apply_height(&mut field, &params, 1.0).is_none(), "{params:?}");
        }
        assert!(!e.is_painting(), "no-op applications never start a stroke");
        assert!(field.heights().iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_world_scale_converts_to_grid() {
        let mut field = HeightField::flat(17, 0.0).unwrap();
        let rect = engine()
            .apply_height(&mut field, &brush(BrushKind::Raise, 16.0, 16.0, 4.0, 1.0), 2.0)
            .unwrap();
        assert_eq!(rect, GridRect::new(6, 6, 10, 10));
        assert!(field.get(8, 8) > 0.9);
    }

    #[test]
    fn test_one_off_application_closes_its_stroke() {
        let mut field = ramp(33);
        let mut e = engine();
        e.apply_height(&mut field, &brush(BrushKind::Flatten, 8.0, 16.0, 3.0, 1.0), 1.0);
        assert!(!e.is_painting());

        e.apply_height(&mut field, &brush(BrushKind::Flatten, 24.0, 16.0, 3.0, 1.0), 1.0);
        assert_eq!(field.get(24, 16), 24.0, "second flatten targets its own start height");
        assert_eq!(field.get(8, 16), 8.0);
    }

    #[test]
    fn test_explicit_stroke_stays_open_across_applications() {
        let mut field = ramp(33);
        let mut e = engine();
        e.begin_stroke(&field, Vec2::new(8.0, 16.0), 1.0);
        e.apply_height(&mut field, &brush(BrushKind::Flatten, 24.0, 16.0, 3.0, 1.0), 1.0);
        assert!(e.is_painting());
        assert_eq!(field.get(24, 16), 8.0);
        e.end_stroke();
    }

    #[test]
    fn test_stroke_state_machine() {
        let field = HeightField::flat(9, 3.0).unwrap();
        let mut e = engine();
        assert_eq!(e.state(), StrokeState::Idle);
        e.begin_stroke(&field, Vec2::new(4.0, 4.0), 1.0);
        assert_eq!(
            e.state(),
            StrokeState::Painting {
                base_height: 3.0,
                seed: 1
            }
        );
        e.end_stroke();
        assert!(!e.is_painting());
    }

    #[test]
    fn test_paint_forwarding() {
        let layout = tessera_lod::PatchLayout::new(9, 1, 1, 1.0).unwrap();
        let mut store = SplatPaintStore::new(layout, 8, 0);
        let mut e = engine();
        let params = brush(BrushKind::Paint, 4.0, 4.0, 2.0, 1.0).with_texture(3);
        assert!(e.apply_paint(&mut store, &params) > 0);
        assert_eq!(e.apply_paint(&mut store, &brush(BrushKind::Raise, 4.0, 4.0, 2.0, 1.0)), 0);
    }
}
