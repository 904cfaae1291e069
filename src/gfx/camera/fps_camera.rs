use cgmath::*;

use crate::config::{CameraConfig, ProjectionConfig};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

pub const WORLD_UP: Vector3<f32> = Vector3::new(0.0, 1.0, 0.0);

/// Pitch stays this far (radians) inside +-90 degrees so the look vector never
/// lines up with `WORLD_UP`.
const PITCH_MARGIN: f32 = 0.1;

/// Free-flying first-person camera.
///
/// Yaw and pitch are kept in degrees. With yaw 0 the camera looks down +Z,
/// with yaw 180 it looks down -Z.
#[derive(Debug, Clone, Copy)]
pub struct FpsCamera {
    position: Point3<f32>,
    yaw: f32,
    pitch: f32,
    fov: f32,
    fov_range: (f32, f32),
    look: Vector3<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,
}

impl FpsCamera {
    pub fn new(position: Point3<f32>, yaw: f32, pitch: f32) -> Self {
        let mut camera = Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            fov: 45.0,
            fov_range: (1.0, 120.0),
            look: Vector3::unit_z(),
            right: -Vector3::unit_x(),
            up: WORLD_UP,
        };
        camera.rotate(yaw, pitch);
        camera
    }

    /// Builds the start-of-session camera, initial rotations included.
    pub fn from_config(config: &CameraConfig) -> Self {
        let mut camera = Self::new(config.position, config.yaw, config.pitch);
        camera.fov_range = (config.min_fov, config.max_fov);
        camera.set_fov(config.fov);
        for (yaw, pitch) in config.initial_rotations {
            camera.rotate(yaw, pitch);
        }
        camera
    }

    pub fn max_pitch() -> f32 {
        90.0 - PITCH_MARGIN.to_degrees()
    }

    /// Adds yaw/pitch deltas (degrees) and rebuilds the orthonormal basis.
    pub fn rotate(&mut self, delta_yaw: f32, delta_pitch: f32) {
        let max_pitch = Self::max_pitch();
        self.yaw = (self.yaw + delta_yaw).rem_euclid(360.0);
        self.pitch = (self.pitch + delta_pitch).clamp(-max_pitch, max_pitch);
        self.update_vectors();
    }

    /// Moves the camera by a caller-computed displacement. No collision.
    pub fn move_by(&mut self, displacement: Vector3<f32>) {
        self.position += displacement;
    }

    /// Sets the vertical field of view in degrees, clamped to the zoom range.
    pub fn set_fov(&mut self, fov: f32) {
        let (min, max) = self.fov_range;
        self.fov = fov.clamp(min, max);
    }

    pub fn fov(&self) -> f32 {
        self.fov
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn look(&self) -> Vector3<f32> {
        self.look
    }

    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.position + self.look, self.up)
    }

    /// Perspective projection for the given viewport, with wgpu's 0..1 depth range.
    pub fn projection_matrix(&self, aspect: f32, projection: &ProjectionConfig) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(Deg(self.fov), aspect, projection.near, projection.far)
    }

    fn update_vectors(&mut self) {
        let (sin_yaw, cos_yaw) = Rad::from(Deg(self.yaw)).0.sin_cos();
        let (sin_pitch, cos_pitch) = Rad::from(Deg(self.pitch)).0.sin_cos();

        self.look = Vector3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw).normalize();
        self.right = self.look.cross(WORLD_UP).normalize();
        self.up = self.right.cross(self.look).normalize();
    }
}

impl Default for FpsCamera {
    fn default() -> Self {
        Self::from_config(&CameraConfig::default())
    }
}
