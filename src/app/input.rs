use crate::editor::{InputSnapshot, KeyboardState, MouseState};
use winit::event::MouseButton;
use winit::keyboard::{KeyCode, PhysicalKey};

/// Shell-level actions that never reach the editor core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    SaveScene,
    LoadScene,
}

/// Accumulates winit events into the per-frame snapshot the editor reads.
#[derive(Default, Debug, Clone, Copy)]
pub struct InputState {
    keyboard: KeyboardState,
    mouse: MouseState,
}

impl InputState {
    pub fn handle_key(&mut self, key: PhysicalKey, pressed: bool) -> InputAction {
        let PhysicalKey::Code(code) = key else {
            return InputAction::None;
        };
        let keys = &mut self.keyboard;
        match code {
            KeyCode::KeyW => keys.w = pressed,
            KeyCode::KeyA => keys.a = pressed,
            KeyCode::KeyS => keys.s = pressed,
            KeyCode::KeyD => keys.d = pressed,
            KeyCode::KeyQ => keys.q = pressed,
            KeyCode::Digit1 => keys.digit1 = pressed,
            KeyCode::Digit2 => keys.digit2 = pressed,
            KeyCode::Digit3 => keys.digit3 = pressed,
            KeyCode::Delete => keys.delete = pressed,
            KeyCode::Escape => keys.escape = pressed,
            KeyCode::AltLeft | KeyCode::AltRight => keys.alt = pressed,
            KeyCode::F1 => keys.f1 = pressed,
            KeyCode::F2 => keys.f2 = pressed,
            KeyCode::F3 => keys.f3 = pressed,
            KeyCode::F4 => keys.f4 = pressed,
            KeyCode::F5 if pressed => return InputAction::SaveScene,
            KeyCode::F9 if pressed => return InputAction::LoadScene,
            _ => {}
        }
        InputAction::None
    }

    pub fn handle_mouse_button(&mut self, button: MouseButton, pressed: bool) {
        match button {
            MouseButton::Left => self.mouse.left = pressed,
            MouseButton::Middle => self.mouse.middle = pressed,
            MouseButton::Right => self.mouse.right = pressed,
            _ => {}
        }
    }

    pub fn handle_cursor(&mut self, x: f32, y: f32) {
        self.mouse.x = x;
        self.mouse.y = y;
    }

    /// Releases everything, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        let (x, y) = (self.mouse.x, self.mouse.y);
        *self = Self::default();
        self.handle_cursor(x, y);
    }

    pub fn snapshot(&self) -> InputSnapshot {
        InputSnapshot {
            keyboard: self.keyboard,
            mouse: self.mouse,
            gui: Default::default(),
        }
    }
}
