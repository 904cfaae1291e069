use cgmath::Matrix4;
use winit::event::{ElementState, MouseScrollDelta};

use super::{camera_controller::CameraController, fps_camera::FpsCamera};
use crate::{
    config::{AppConfig, ProjectionConfig},
    input::KeyAction,
};

/// Owns the camera and the controller that drives it.
pub struct CameraManager {
    pub camera: FpsCamera,
    pub controller: CameraController,
    pub projection: ProjectionConfig,
}

impl CameraManager {
    pub fn new(camera: FpsCamera, controller: CameraController, projection: ProjectionConfig) -> Self {
        Self {
            camera,
            controller,
            projection,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            FpsCamera::from_config(&config.camera),
            CameraController::new(&config.controls),
            config.projection,
        )
    }

    pub fn process_key(&mut self, action: KeyAction, state: ElementState) -> bool {
        self.controller.process_movement_key(action, state)
    }

    pub fn process_mouse_motion(&mut self, delta: (f64, f64)) {
        self.controller.process_mouse_motion(delta.0, delta.1);
    }

    pub fn process_scroll(&mut self, delta: &MouseScrollDelta) {
        self.controller.process_scroll(delta);
    }

    pub fn update(&mut self, dt: f32) {
        self.controller.update(&mut self.camera, dt);
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.camera.view_matrix()
    }

    pub fn projection_matrix(&self, width: u32, height: u32) -> Matrix4<f32> {
        self.camera
            .projection_matrix(aspect_ratio(width, height), &self.projection)
    }
}

/// Width over height, guarding against a minimized (zero-height) surface.
pub fn aspect_ratio(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}
