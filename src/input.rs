//! Key bindings
//!
//! Maps physical keys to the actions the viewer understands. Movement keys are
//! level-triggered (held), toggles and quit are edge-triggered (pressed).

use winit::keyboard::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    MoveForward,
    MoveBackward,
    StrafeLeft,
    StrafeRight,
    MoveUp,
    MoveDown,
    ToggleWireframe,
    ToggleFlashlight,
    Quit,
}

impl KeyAction {
    /// Movement actions follow the held state of the key; the rest fire on press.
    pub fn is_held(self) -> bool {
        matches!(
            self,
            KeyAction::MoveForward
                | KeyAction::MoveBackward
                | KeyAction::StrafeLeft
                | KeyAction::StrafeRight
                | KeyAction::MoveUp
                | KeyAction::MoveDown
        )
    }
}

pub fn action_for_key(code: KeyCode) -> Option<KeyAction> {
    let action = match code {
        KeyCode::KeyW => KeyAction::MoveForward,
        KeyCode::KeyS => KeyAction::MoveBackward,
        KeyCode::KeyA => KeyAction::StrafeLeft,
        KeyCode::KeyD => KeyAction::StrafeRight,
        KeyCode::KeyZ => KeyAction::MoveUp,
        KeyCode::KeyX => KeyAction::MoveDown,
        KeyCode::F1 => KeyAction::ToggleWireframe,
        KeyCode::KeyF => KeyAction::ToggleFlashlight,
        KeyCode::Escape => KeyAction::Quit,
        _ => return None,
    };
    Some(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings() {
        assert_eq!(action_for_key(KeyCode::KeyW), Some(KeyAction::MoveForward));
        assert_eq!(action_for_key(KeyCode::KeyX), Some(KeyAction::MoveDown));
        assert_eq!(action_for_key(KeyCode::F1), Some(KeyAction::ToggleWireframe));
        assert_eq!(action_for_key(KeyCode::KeyF), Some(KeyAction::ToggleFlashlight));
        assert_eq!(action_for_key(KeyCode::Escape), Some(KeyAction::Quit));
        assert_eq!(action_for_key(KeyCode::KeyQ), None);
    }

    #[test]
    fn test_toggles_are_edge_triggered() {
        assert!(KeyAction::StrafeLeft.is_held());
        assert!(KeyAction::MoveUp.is_held());
        assert!(!KeyAction::ToggleFlashlight.is_held());
        assert!(!KeyAction::Quit.is_held());
    }
}
