use glam::Vec2;

/// Named keys the editor reacts to.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardState {
    pub w: bool,
    pub a: bool,
    pub s: bool,
    pub d: bool,
    pub q: bool,
    pub digit1: bool,
    pub digit2: bool,
    pub digit3: bool,
    pub delete: bool,
    pub escape: bool,
    pub alt: bool,
    pub f1: bool,
    pub f2: bool,
    pub f3: bool,
    pub f4: bool,
}

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct MouseState {
    /// Window pixels, origin top-left.
    pub x: f32,
    pub y: f32,
    pub left: bool,
    pub middle: bool,
    pub right: bool,
}

impl MouseState {
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Whether the GUI layer is currently consuming input.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuiCapture {
    pub wants_keyboard: bool,
    pub hovered: bool,
}

/// One immutable frame of device state.
#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct InputSnapshot {
    pub keyboard: KeyboardState,
    pub mouse: MouseState,
    pub gui: GuiCapture,
}
