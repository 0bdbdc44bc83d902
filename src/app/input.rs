use crate::interaction::Modifiers;
use winit::event::MouseButton;
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

/// What a window event means for the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    None,
    Exit,
    Key(KeyCode),
    PointerDown,
    /// Primary button released; the viewport ends any drag, then clicks.
    PointerUp(Modifiers),
    /// Middle button pressed; grabs the gizmo of the selection.
    GizmoDown,
    GizmoUp,
}

#[derive(Default, Debug, Clone, Copy)]
pub struct InputState {
    pub mouse_buttons: [bool; 5],
    pub cursor: Option<(f32, f32)>,
    pub modifiers: Modifiers,
}

impl InputState {
    pub fn handle_key(&mut self, key: PhysicalKey, pressed: bool) -> InputAction {
        match key {
            PhysicalKey::Code(KeyCode::Escape) if pressed => InputAction::Exit,
            PhysicalKey::Code(code) if pressed => InputAction::Key(code),
            _ => InputAction::None,
        }
    }

    pub fn set_modifiers(&mut self, state: ModifiersState) {
        self.modifiers = modifiers_from(state);
    }

    pub fn handle_button(&mut self, button: MouseButton, pressed: bool) -> InputAction {
        let Some(index) = map_mouse_button(button) else {
            return InputAction::None;
        };
        self.mouse_buttons[index] = pressed;
        match (index, pressed) {
            (0, true) => InputAction::PointerDown,
            (0, false) => InputAction::PointerUp(self.modifiers),
            (2, true) => InputAction::GizmoDown,
            (2, false) => InputAction::GizmoUp,
            _ => InputAction::None,
        }
    }

    /// Records the cursor and returns the travel since the last position
    /// when the secondary button is held.
    pub fn handle_cursor(&mut self, x: f32, y: f32) -> Option<(f32, f32)> {
        let previous = self.cursor.replace((x, y));
        if !self.mouse_buttons[1] {
            return None;
        }
        previous.map(|(px, py)| (x - px, y - py))
    }

    pub fn cursor_left(&mut self) {
        self.cursor = None;
    }
}

pub fn modifiers_from(state: ModifiersState) -> Modifiers {
    Modifiers {
        shift: state.shift_key(),
        ctrl: state.control_key(),
        alt: state.alt_key(),
    }
}

fn map_mouse_button(button: MouseButton) -> Option<usize> {
    match button {
        MouseButton::Left => Some(0),
        MouseButton::Right => Some(1),
        MouseButton::Middle => Some(2),
        MouseButton::Back => Some(3),
        MouseButton::Forward => Some(4),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{modifiers_from, InputAction, InputState};
    use crate::interaction::Modifiers;
    use winit::event::MouseButton;
    use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

    #[test]
    fn keys_map_to_actions_on_press_only() {
        let mut input = InputState::default();
        let r = PhysicalKey::Code(KeyCode::KeyR);
        assert_eq!(input.handle_key(r, true), InputAction::Key(KeyCode::KeyR));
        assert_eq!(input.handle_key(r, false), InputAction::None);
        assert_eq!(
            input.handle_key(PhysicalKey::Code(KeyCode::Escape), true),
            InputAction::Exit
        );
    }

    #[test]
    fn primary_release_carries_current_modifiers() {
        let mut input = InputState::default();
        input.set_modifiers(ModifiersState::SHIFT);
        assert_eq!(input.handle_button(MouseButton::Left, true), InputAction::PointerDown);
        assert_eq!(
            input.handle_button(MouseButton::Left, false),
            InputAction::PointerUp(Modifiers::SHIFT)
        );
        assert_eq!(input.handle_button(MouseButton::Other(9), true), InputAction::None);
    }

    #[test]
    fn middle_button_grabs_the_gizmo() {
        let mut input = InputState::default();
        assert_eq!(input.handle_button(MouseButton::Middle, true), InputAction::GizmoDown);
        assert!(input.mouse_buttons[2]);
        // Gizmo drags do not orbit.
        input.handle_cursor(0.0, 0.0);
        assert_eq!(input.handle_cursor(5.0, 5.0), None);
        assert_eq!(input.handle_button(MouseButton::Middle, false), InputAction::GizmoUp);
        assert_eq!(input.handle_button(MouseButton::Back, true), InputAction::None);
    }

    #[test]
    fn secondary_drag_reports_cursor_travel() {
        let mut input = InputState::default();
        assert_eq!(input.handle_cursor(10.0, 10.0), None);
        input.handle_button(MouseButton::Right, true);
        assert_eq!(input.handle_cursor(14.0, 7.0), Some((4.0, -3.0)));
        input.handle_button(MouseButton::Right, false);
        assert_eq!(input.handle_cursor(20.0, 7.0), None);
        input.cursor_left();
        assert_eq!(input.cursor, None);
    }

    #[test]
    fn modifier_state_maps_each_key() {
        let mods = modifiers_from(ModifiersState::CONTROL | ModifiersState::ALT);
        assert!(!mods.shift && mods.ctrl && mods.alt);
        assert!(!mods.multi_select());
    }
}
