use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Perspective projection parameters. The aspect ratio is not stored: it is
/// taken from the surface every frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Projection {
    /// Right-handed perspective with a `[0, 1]` clip depth range.
    pub fn matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, self.near, self.far)
    }
}

/// Width over height, guarding against a zero-height surface.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

/// Model transform for a solid: translate to `offset`, then rotate about X
/// and Y by `time` radians.
pub fn model_transform(offset: Vec3, time: f32) -> Mat4 {
    Mat4::from_translation(offset) * Mat4::from_rotation_x(time) * Mat4::from_rotation_y(time)
}

/// Compose the shared projection with one solid's model transform.
pub fn model_view_projection(projection: Mat4, offset: Vec3, time: f32) -> Mat4 {
    projection * model_transform(offset, time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_projection() {
        let p = Projection::default();
        assert_eq!(p.fov_degrees, 45.0);
        assert_eq!(p.near, 0.1);
        assert_eq!(p.far, 100.0);
        let m = p.matrix(4.0 / 3.0);
        assert!(!m.col(0).x.is_nan());
    }

    #[test]
    fn aspect_guards_zero_height() {
        assert_eq!(aspect_ratio(800, 400), 2.0);
        assert_eq!(aspect_ratio(800, 0), 800.0);
    }

    #[test]
    fn model_at_time_zero_is_translation() {
        let offset = Vec3::new(-3.0, 0.0, -7.0);
        let m = model_transform(offset, 0.0);
        assert_eq!(m, Mat4::from_translation(offset));
    }

    #[test]
    fn rotation_applies_after_translation() {
        // The origin of the solid stays at its offset regardless of rotation.
        let offset = Vec3::new(3.0, 0.0, -7.0);
        let m = model_transform(offset, 1.3);
        let origin = m.transform_point3(Vec3::ZERO);
        assert!(origin.abs_diff_eq(offset, 1e-6));
    }

    #[test]
    fn mvp_matches_explicit_composition() {
        let t = 2.5_f32;
        let aspect = 16.0 / 9.0;
        let proj = Projection::default().matrix(aspect);
        let expected = Mat4::perspective_rh(45.0_f32.to_radians(), aspect, 0.1, 100.0)
            * Mat4::from_translation(Vec3::new(-3.0, 0.0, -7.0))
            * Mat4::from_rotation_x(t)
            * Mat4::from_rotation_y(t);
        let mvp = model_view_projection(proj, Vec3::new(-3.0, 0.0, -7.0), t);
        assert!(mvp.abs_diff_eq(expected, 1e-6));
    }
}
