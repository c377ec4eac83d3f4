use glam::{Mat4, Vec3};
use tracing::warn;

/// Projection and view state pushed to the shader at the start of every session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    projection: Mat4,
    view: Mat4,
    eye: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            eye: Vec3::ZERO,
        }
    }
}

impl Camera {
    pub fn set_perspective(&mut self, fov_radians: f32, aspect: f32, near: f32, far: f32) {
        self.projection = Mat4::perspective_rh_gl(fov_radians, aspect, near, far);
    }

    pub fn set_ortho(&mut self, min_x: f32, max_x: f32, min_y: f32, max_y: f32, min_z: f32, max_z: f32) {
        self.projection = Mat4::orthographic_rh_gl(min_x, max_x, min_y, max_y, min_z, max_z);
    }

    /// Looks from `eye` towards `target` with +Y up. Falls back to +Z up when the
    /// view direction is vertical. When `eye == target` the previous view and eye
    /// are both kept.
    pub fn look_at(&mut self, eye: Vec3, target: Vec3) {
        let Some(forward) = (target - eye).try_normalize() else {
            warn!(?eye, "camera eye and target coincide; keeping previous view");
            return;
        };
        self.eye = eye;
        let up = if forward.cross(Vec3::Y).length_squared() < 1e-8 {
            Vec3::Z
        } else {
            Vec3::Y
        };
        self.view = Mat4::look_at_rh(eye, target, up);
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn view(&self) -> Mat4 {
        self.view
    }

    pub fn eye(&self) -> Vec3 {
        self.eye
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}
