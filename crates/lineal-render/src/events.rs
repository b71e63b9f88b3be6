// crates/lineal-render/src/events.rs
use glam::Vec2;

/// Raw input from the windowing layer, in absolute viewport pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    MouseMove { position: Vec2 },
    MousePress { position: Vec2, button: MouseButton },
    MouseRelease { position: Vec2, button: MouseButton },
    /// The pointer left the window.
    MouseLeave,
    Resize { size: Vec2 },
}

impl InputEvent {
    pub fn position(&self) -> Option<Vec2> {
        match self {
            InputEvent::MouseMove { position }
            | InputEvent::MousePress { position, .. }
            | InputEvent::MouseRelease { position, .. } => Some(*position),
            InputEvent::MouseLeave | InputEvent::Resize { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}
