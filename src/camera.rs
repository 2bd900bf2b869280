use cgmath::{vec3, Vector3};
use winit::keyboard::KeyCode;

use crate::input::Input;

const RUN_SPEED: f32 = 40.0;
const LOOK_SENSITIVITY: f32 = 0.25;
const WHEEL_DOLLY: f32 = 2.0;

/// Free-flying camera. Position and orientation feed the view matrix; the
/// movement itself is plain keyboard/mouse glue, updated once per frame from
/// the polled input state.
#[derive(Debug)]
pub struct Camera {
    pub position: Vector3<f32>,
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl Camera {
    pub fn new(position: Vector3<f32>) -> Self {
        Self {
            position,
            pitch: 15.0,
            yaw: 0.0,
            roll: 0.0,
        }
    }

    pub fn update(&mut self, input: &mut Input, delta: f32) {
        let (dx, dy) = input.take_mouse_delta();
        if input.is_look_held() {
            self.yaw += dx * LOOK_SENSITIVITY;
            self.pitch += dy * LOOK_SENSITIVITY;
            self.pitch = self.pitch.clamp(-90.0, 90.0);
        }

        let yaw = self.yaw.to_radians();
        let forward = vec3(yaw.sin(), 0.0, -yaw.cos());
        let right = vec3(yaw.cos(), 0.0, yaw.sin());

        let step = RUN_SPEED * delta;
        if input.is_key_down(KeyCode::KeyW) {
            self.position += forward * step;
        }
        if input.is_key_down(KeyCode::KeyS) {
            self.position -= forward * step;
        }
        if input.is_key_down(KeyCode::KeyD) {
            self.position += right * step;
        }
        if input.is_key_down(KeyCode::KeyA) {
            self.position -= right * step;
        }
        if input.is_key_down(KeyCode::Space) {
            self.position.y += step;
        }
        if input.is_key_down(KeyCode::ShiftLeft) {
            self.position.y -= step;
        }

        self.position += forward * (input.take_wheel_delta() * WHEEL_DOLLY);
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use winit::event::ElementState;

    use super::*;

    #[test]
    fn forward_key_moves_along_yaw_direction() {
        let mut camera = Camera::new(vec3(0.0, 5.0, 0.0));
        camera.yaw = 90.0;
        let mut input = Input::default();
        input.key_event(KeyCode::KeyW, ElementState::Pressed);

        camera.update(&mut input, 0.5);

        assert_relative_eq!(camera.position.x, RUN_SPEED * 0.5, epsilon = 1e-4);
        assert_relative_eq!(camera.position.z, 0.0, epsilon = 1e-4);
        assert_relative_eq!(camera.position.y, 5.0);
    }

    #[test]
    fn pitch_stays_clamped_while_looking() {
        let mut camera = Camera::new(vec3(0.0, 0.0, 0.0));
        let mut input = Input::default();
        input.mouse_button(winit::event::MouseButton::Right, ElementState::Pressed);
        input.cursor_moved(0.0, 0.0);
        input.cursor_moved(0.0, 100000.0);

        camera.update(&mut input, 0.016);

        assert_relative_eq!(camera.pitch, 90.0);
    }
}
