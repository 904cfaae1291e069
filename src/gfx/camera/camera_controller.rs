use cgmath::{Vector3, Zero};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, MouseScrollDelta},
};

use super::fps_camera::{FpsCamera, WORLD_UP};
use crate::{config::ControlConfig, input::KeyAction};

/// Pixel scroll deltas (touchpads) are turned into lines with this divisor.
const PIXELS_PER_LINE: f32 = 20.0;

/// Accumulates held movement keys, mouse deltas and scroll input between
/// frames, then applies them to the camera once per frame in [`update`].
///
/// [`update`]: CameraController::update
#[derive(Debug, Clone)]
pub struct CameraController {
    pub move_speed: f32,
    pub mouse_sensitivity: f32,
    pub zoom_sensitivity: f32,
    is_forward_pressed: bool,
    is_backward_pressed: bool,
    is_left_pressed: bool,
    is_right_pressed: bool,
    is_up_pressed: bool,
    is_down_pressed: bool,
    pending_rotation: (f32, f32),
    pending_scroll: f32,
}

impl CameraController {
    pub fn new(controls: &ControlConfig) -> Self {
        Self {
            move_speed: controls.move_speed,
            mouse_sensitivity: controls.mouse_sensitivity,
            zoom_sensitivity: controls.zoom_sensitivity,
            is_forward_pressed: false,
            is_backward_pressed: false,
            is_left_pressed: false,
            is_right_pressed: false,
            is_up_pressed: false,
            is_down_pressed: false,
            pending_rotation: (0.0, 0.0),
            pending_scroll: 0.0,
        }
    }

    /// Records the held state of a movement key. Returns false for actions the
    /// controller does not own.
    pub fn process_movement_key(&mut self, action: KeyAction, state: ElementState) -> bool {
        let pressed = state == ElementState::Pressed;
        match action {
            KeyAction::MoveForward => self.is_forward_pressed = pressed,
            KeyAction::MoveBackward => self.is_backward_pressed = pressed,
            KeyAction::StrafeLeft => self.is_left_pressed = pressed,
            KeyAction::StrafeRight => self.is_right_pressed = pressed,
            KeyAction::MoveUp => self.is_up_pressed = pressed,
            KeyAction::MoveDown => self.is_down_pressed = pressed,
            _ => return false,
        }
        true
    }

    /// Raw mouse motion in pixels. Moving the mouse right turns the camera right.
    pub fn process_mouse_motion(&mut self, dx: f64, dy: f64) {
        self.pending_rotation.0 -= dx as f32 * self.mouse_sensitivity;
        self.pending_rotation.1 -= dy as f32 * self.mouse_sensitivity;
    }

    pub fn process_scroll(&mut self, delta: &MouseScrollDelta) {
        self.pending_scroll += match delta {
            MouseScrollDelta::LineDelta(_, lines) => *lines,
            MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => {
                *y as f32 / PIXELS_PER_LINE
            }
        };
    }

    /// Drops any held keys, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.is_forward_pressed = false;
        self.is_backward_pressed = false;
        self.is_left_pressed = false;
        self.is_right_pressed = false;
        self.is_up_pressed = false;
        self.is_down_pressed = false;
    }

    /// Displacement for this frame from the held keys. Opposing keys do not
    /// cancel out: forward, left and up take priority.
    pub fn displacement(&self, camera: &FpsCamera, dt: f32) -> Vector3<f32> {
        let step = self.move_speed * dt;
        let mut displacement = Vector3::zero();

        if self.is_forward_pressed {
            displacement += camera.look() * step;
        } else if self.is_backward_pressed {
            displacement -= camera.look() * step;
        }

        if self.is_left_pressed {
            displacement -= camera.right() * step;
        } else if self.is_right_pressed {
            displacement += camera.right() * step;
        }

        if self.is_up_pressed {
            displacement += WORLD_UP * step;
        } else if self.is_down_pressed {
            displacement -= WORLD_UP * step;
        }

        displacement
    }

    /// Applies everything accumulated since the previous frame.
    pub fn update(&mut self, camera: &mut FpsCamera, dt: f32) {
        let (yaw, pitch) = std::mem::take(&mut self.pending_rotation);
        if yaw != 0.0 || pitch != 0.0 {
            camera.rotate(yaw, pitch);
        }

        let scroll = std::mem::take(&mut self.pending_scroll);
        if scroll != 0.0 {
            camera.set_fov(camera.fov() + scroll * self.zoom_sensitivity);
        }

        let displacement = self.displacement(camera, dt);
        if !displacement.is_zero() {
            camera.move_by(displacement);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{EuclideanSpace, InnerSpace, Point3};

    fn controller() -> CameraController {
        CameraController::new(&ControlConfig::default())
    }

    #[test]
    fn test_forward_wins_over_backward() {
        let camera = FpsCamera::new(Point3::origin(), 0.0, 0.0);
        let mut controller = controller();
        controller.process_movement_key(KeyAction::MoveForward, ElementState::Pressed);
        controller.process_movement_key(KeyAction::MoveBackward, ElementState::Pressed);

        let d = controller.displacement(&camera, 1.0);
        assert!((d - camera.look() * 15.0).magnitude() < 1e-4);
    }

    #[test]
    fn test_movement_scales_with_elapsed_time() {
        let mut camera = FpsCamera::new(Point3::origin(), 0.0, 0.0);
        let mut controller = controller();
        controller.process_movement_key(KeyAction::MoveUp, ElementState::Pressed);

        controller.update(&mut camera, 0.5);
        assert!((camera.position().y - 7.5).abs() < 1e-4);

        controller.process_movement_key(KeyAction::MoveUp, ElementState::Released);
        controller.update(&mut camera, 0.5);
        assert!((camera.position().y - 7.5).abs() < 1e-4);
    }

    #[test]
    fn test_non_movement_keys_are_ignored() {
        let mut controller = controller();
        assert!(!controller.process_movement_key(KeyAction::Quit, ElementState::Pressed));
        assert!(controller.process_movement_key(KeyAction::StrafeRight, ElementState::Pressed));
    }

    #[test]
    fn test_mouse_motion_rotates_once() {
        let mut camera = FpsCamera::new(Point3::origin(), 180.0, 0.0);
        let mut controller = controller();
        controller.process_mouse_motion(100.0, -50.0);

        controller.update(&mut camera, 0.016);
        assert!((camera.yaw() - 170.0).abs() < 1e-4);
        assert!((camera.pitch() - 5.0).abs() < 1e-4);

        controller.update(&mut camera, 0.016);
        assert!((camera.yaw() - 170.0).abs() < 1e-4);
    }

    #[test]
    fn test_scroll_zoom_stays_in_range() {
        let mut camera = FpsCamera::default();
        let mut controller = controller();

        controller.process_scroll(&MouseScrollDelta::LineDelta(0.0, 1.0));
        controller.update(&mut camera, 0.0);
        assert_eq!(camera.fov(), 42.0);

        for _ in 0..100 {
            controller.process_scroll(&MouseScrollDelta::LineDelta(0.0, -5.0));
            controller.update(&mut camera, 0.0);
            assert!(camera.fov() >= 1.0 && camera.fov() <= 120.0);
        }
        assert_eq!(camera.fov(), 120.0);

        for _ in 0..100 {
            controller.process_scroll(&MouseScrollDelta::LineDelta(0.0, 5.0));
            controller.update(&mut camera, 0.0);
        }
        assert_eq!(camera.fov(), 1.0);
    }
}
