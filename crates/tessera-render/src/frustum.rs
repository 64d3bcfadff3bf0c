//! Per-patch frustum culling against planes extracted from the view-projection matrix.

use glam::{Mat4, Vec3, Vec4};
use tessera_mesh::PatchBounds;

const LEFT: usize = 0;
const RIGHT: usize = 1;
const BOTTOM: usize = 2;
const TOP: usize = 3;
const NEAR: usize = 4;
const FAR: usize = 5;

/// Clip-space depth convention of the projection the planes come from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DepthRange {
    /// `0 <= z <= w`, as produced by glam's `perspective_rh` and used by wgpu.
    #[default]
    ZeroToOne,
    /// `-w <= z <= w`, the OpenGL convention.
    NegOneToOne,
    /// Reverse-Z: near maps to 1, far to 0.
    Reversed,
}

/// How a patch box is judged visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CullTest {
    /// Visible if any of the eight box corners lies inside every tested plane.
    #[default]
    CornerPoints,
    /// Positive-vertex test: culled only if the box lies entirely behind a plane.
    BoundingBox,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CullSettings {
    pub enabled: bool,
    pub test: CullTest,
    pub depth_range: DepthRange,
    /// Ignore the top and bottom planes. Tall sculpted features near the
    /// screen edge then never pop, at the cost of drawing extra patches.
    pub skip_top_bottom: bool,
}

impl Default for CullSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            test: CullTest::CornerPoints,
            depth_range: DepthRange::ZeroToOne,
            skip_top_bottom: false,
        }
    }
}

/// Six inward-facing, normalized planes `(a, b, c, d)`: left, right, bottom,
/// top, near, far.
#[derive(Clone, Debug)]
pub struct Frustum {
    planes: [Vec4; 6],
}

impl Frustum {
    /// Gribb-Hartmann extraction: side planes from `row3 ± row0/1`, near and
    /// far from the depth rows according to `depth`.
    pub fn from_view_projection(vp: &Mat4, depth: DepthRange) -> Self {
        let rows = [vp.row(0), vp.row(1), vp.row(2), vp.row(3)];

        let mut planes = [Vec4::ZERO; 6];
        planes[LEFT] = rows[3] + rows[0];
        planes[RIGHT] = rows[3] - rows[0];
        planes[BOTTOM] = rows[3] + rows[1];
        planes[TOP] = rows[3] - rows[1];
        (planes[NEAR], planes[FAR]) = match depth {
            DepthRange::ZeroToOne => (rows[2], rows[3] - rows[2]),
            DepthRange::NegOneToOne => (rows[3] + rows[2], rows[3] - rows[2]),
            DepthRange::Reversed => (rows[3] - rows[2], rows[2]),
        };

        for plane in &mut planes {
            let len = plane.truncate().length();
            if len > 0.0 {
                *plane /= len;
            }
        }

        Self { planes }
    }

    pub fn planes(&self) -> &[Vec4; 6] {
        &self.planes
    }

    fn tested_planes(&self, skip_top_bottom: bool) -> impl Iterator<Item = &Vec4> {
        self.planes
            .iter()
            .enumerate()
            .filter(move |(i, _)| !(skip_top_bottom && (*i == BOTTOM || *i == TOP)))
            .map(|(_, plane)| plane)
    }

    /// Whether `point` is on the inner side of every tested plane.
    pub fn contains_point(&self, point: Vec3, skip_top_bottom: bool) -> bool {
        self.tested_planes(skip_top_bottom)
            .all(|plane| plane.truncate().dot(point) + plane.w >= 0.0)
    }

    /// Any-corner test.
    pub fn any_corner_inside(&self, bounds: &PatchBounds, skip_top_bottom: bool) -> bool {
        bounds
            .corners()
            .iter()
            .any(|&corner| self.contains_point(corner, skip_top_bottom))
    }

    /// Positive-vertex box test. Conservative: never rejects a visible box.
    pub fn intersects_box(&self, bounds: &PatchBounds, skip_top_bottom: bool) -> bool {
        self.tested_planes(skip_top_bottom).all(|plane| {
            let normal = plane.truncate();
            let p = Vec3::select(normal.cmpge(Vec3::ZERO), bounds.max, bounds.min);
            normal.dot(p) + plane.w >= 0.0
        })
    }
}

/// Frustum plus settings, built once per frame.
pub struct FrustumCuller {
    frustum: Frustum,
    settings: CullSettings,
}

impl FrustumCuller {
    pub fn new(view_projection: &Mat4, settings: &CullSettings) -> Self {
        Self {
            frustum: Frustum::from_view_projection(view_projection, settings.depth_range),
            settings: *settings,
        }
    }

    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// `true` when the patch should be drawn.
    pub fn is_visible(&self, bounds: &PatchBounds) -> bool {
        if !self.settings.enabled {
            return true;
        }
        match self.settings.test {
            CullTest::CornerPoints => self
                .frustum
                .any_corner_inside(bounds, self.settings.skip_top_bottom),
            CullTest::BoundingBox => self
                .frustum
                .intersects_box(bounds, self.settings.skip_top_bottom),
        }
    }
}
