//! Camera producing the position and view-projection the terrain consumes.

use glam::{Mat4, Quat, Vec3};

use crate::DepthRange;

/// What the terrain needs from whatever camera the host uses.
pub trait CameraView {
    fn position(&self) -> Vec3;
    fn view_projection(&self) -> Mat4;
    fn depth_range(&self) -> DepthRange {
        DepthRange::ZeroToOne
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
    /// Swap near and far in the projection so depth runs from 1 to 0.
    pub reverse_z: bool,
}

impl Camera {
    /// Camera at `position` looking at `target` with +Y up.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let view = Mat4::look_at_rh(position, target, Vec3::Y);
        let (_, rotation, _) = view.inverse().to_scale_rotation_translation();
        Self {
            position,
            rotation,
            ..Self::default()
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        (Mat4::from_translation(self.position) * Mat4::from_quat(self.rotation)).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let (near, far) = if self.reverse_z {
            (self.far, self.near)
        } else {
            (self.near, self.far)
        };
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, near, far)
    }

    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_y: std::f32::consts::FRAC_PI_4,
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 10000.0,
            reverse_z: false,
        }
    }
}

impl CameraView for Camera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn view_projection(&self) -> Mat4 {
        self.view_projection_matrix()
    }

    fn depth_range(&self) -> DepthRange {
        if self.reverse_z {
            DepthRange::Reversed
        } else {
            DepthRange::ZeroToOne
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Frustum;

    #[test]
    fn test_default_camera_view_is_identity() {
        assert!(Camera::default().view_matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn test_looking_at_faces_target() {
        let target = Vec3::new(10.0, 10.0, 0.0);
        let camera = Camera::looking_at(Vec3::new(0.0, 10.0, 0.0), target);
        let in_view = camera.view_matrix().transform_point3(target);
        assert!(
            in_view.truncate().length() < 1e-4 && in_view.z < 0.0,
            "target at {in_view:?} in view space"
        );
    }

    #[test]
    fn test_view_matrix_inverse_is_camera_transform() {
        let camera = Camera {
            position: Vec3::new(10.0, 20.0, 30.0),
            rotation: Quat::from_rotation_y(std::f32::consts::FRAC_PI_2),
            ..Camera::default()
        };
        let reconstructed = camera.view_matrix().inverse().col(3).truncate();
        assert!((reconstructed - camera.position).length() < 1e-4);
    }

    #[test]
    fn test_depth_range_matches_projection() {
        for reverse_z in [false, true] {
            let camera = Camera {
                position: Vec3::new(0.0, 5.0, 0.0),
                far: 500.0,
                reverse_z,
                ..Camera::default()
            };
            let frustum =
                Frustum::from_view_projection(&camera.view_projection(), camera.depth_range());
            assert!(frustum.contains_point(Vec3::new(0.0, 5.0, -50.0), false));
            assert!(!frustum.contains_point(Vec3::new(0.0, 5.0, -600.0), false));
        }
    }
}
