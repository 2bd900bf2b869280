use std::collections::HashSet;

use winit::event::{ElementState, MouseButton};
use winit::keyboard::KeyCode;

/// Keyboard and mouse state accumulated from winit events, polled once per
/// frame by the camera. Mouse and wheel deltas are taken, not read: the
/// consumer drains them so a frame never sees another frame's motion.
#[derive(Debug, Default)]
pub struct Input {
    held: HashSet<KeyCode>,
    mouse_delta: (f32, f32),
    wheel_delta: f32,
    look_held: bool,
    last_cursor: Option<(f64, f64)>,
}

impl Input {
    pub fn key_event(&mut self, code: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                self.held.insert(code);
            }
            ElementState::Released => {
                self.held.remove(&code);
            }
        }
    }

    pub fn mouse_button(&mut self, button: MouseButton, state: ElementState) {
        if button == MouseButton::Right {
            self.look_held = state.is_pressed();
        }
    }

    pub fn cursor_moved(&mut self, x: f64, y: f64) {
        if let Some((last_x, last_y)) = self.last_cursor {
            self.mouse_delta.0 += (x - last_x) as f32;
            self.mouse_delta.1 += (y - last_y) as f32;
        }
        self.last_cursor = Some((x, y));
    }

    pub fn wheel(&mut self, delta: f32) {
        self.wheel_delta += delta;
    }

    pub fn is_key_down(&self, code: KeyCode) -> bool {
        self.held.contains(&code)
    }

    pub fn is_look_held(&self) -> bool {
        self.look_held
    }

    pub fn take_mouse_delta(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.mouse_delta)
    }

    pub fn take_wheel_delta(&mut self) -> f32 {
        std::mem::take(&mut self.wheel_delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_drain_when_taken() {
        let mut input = Input::default();
        input.cursor_moved(10.0, 10.0);
        input.cursor_moved(14.0, 7.0);
        input.wheel(2.0);

        assert_eq!(input.take_mouse_delta(), (4.0, -3.0));
        assert_eq!(input.take_mouse_delta(), (0.0, 0.0));
        assert_eq!(input.take_wheel_delta(), 2.0);
        assert_eq!(input.take_wheel_delta(), 0.0);
    }

    #[test]
    fn keys_track_press_and_release() {
        let mut input = Input::default();
        input.key_event(KeyCode::KeyW, ElementState::Pressed);
        assert!(input.is_key_down(KeyCode::KeyW));

        input.key_event(KeyCode::KeyW, ElementState::Released);
        assert!(!input.is_key_down(KeyCode::KeyW));
    }
}
