//! Winit input → engine events.
//!
//! Keeps the little state winit does not carry on every event: cursor
//! position, held buttons and modifiers.

use hexview_core::{
    CopyFormat, KeyEvent, KeyPhase, Modifiers, PointerEvent, PointerPhase, WheelEvent,
};
use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use winit::keyboard::{Key, KeyCode, ModifiersState, NamedKey, PhysicalKey};

/// Pixels per wheel "line" for devices that report line deltas.
pub const LINE_HEIGHT_PX: f64 = 40.0;

#[derive(Clone, Copy, Debug, Default)]
pub struct InputState {
    x: f64,
    y: f64,
    /// DOM-style bitmask: 1 primary, 2 secondary, 4 middle.
    buttons: u16,
    modifiers: ModifiersState,
}

impl InputState {
    pub fn set_modifiers(&mut self, modifiers: ModifiersState) {
        self.modifiers = modifiers;
    }

    pub fn cursor_moved(&mut self, x: f64, y: f64) -> PointerEvent {
        self.x = x;
        self.y = y;
        self.pointer(PointerPhase::Move, -1)
    }

    /// `None` for buttons the engine has no notion of.
    pub fn mouse_input(&mut self, state: ElementState, button: MouseButton) -> Option<PointerEvent> {
        let (index, bit) = match button {
            MouseButton::Left => (0, 1),
            MouseButton::Right => (2, 2),
            MouseButton::Middle => (1, 4),
            _ => return None,
        };
        let phase = match state {
            ElementState::Pressed => {
                self.buttons |= bit;
                PointerPhase::Down
            }
            ElementState::Released => {
                self.buttons &= !bit;
                PointerPhase::Up
            }
        };
        Some(self.pointer(phase, index))
    }

    pub fn wheel(&self, delta: MouseScrollDelta) -> WheelEvent {
        let (dx, dy) = match delta {
            // Winit reports "scroll up" as positive; the engine scrolls down
            // for positive deltas.
            MouseScrollDelta::LineDelta(x, y) => {
                (-f64::from(x) * LINE_HEIGHT_PX, -f64::from(y) * LINE_HEIGHT_PX)
            }
            MouseScrollDelta::PixelDelta(pos) => (-pos.x, -pos.y),
        };
        WheelEvent {
            delta_x: dx,
            delta_y: dy,
            ctrl_key: self.modifiers.control_key(),
            shift_key: self.modifiers.shift_key(),
        }
    }

    pub fn key(&self, state: ElementState, logical: &Key, physical: PhysicalKey) -> KeyEvent {
        KeyEvent {
            phase: match state {
                ElementState::Pressed => KeyPhase::Down,
                ElementState::Released => KeyPhase::Up,
            },
            key: key_name(logical),
            code: match physical {
                PhysicalKey::Code(code) => format!("{code:?}"),
                PhysicalKey::Unidentified(_) => String::new(),
            },
            modifiers: self.modifiers(),
        }
    }

    /// Copy shortcut: Ctrl/Cmd+C copies hex, with Shift the full dump, with
    /// Alt the ASCII text.
    pub fn copy_request(&self, state: ElementState, physical: PhysicalKey) -> Option<CopyFormat> {
        let accel = self.modifiers.control_key() || self.modifiers.super_key();
        if state != ElementState::Pressed || !accel || physical != PhysicalKey::Code(KeyCode::KeyC) {
            return None;
        }
        Some(if self.modifiers.shift_key() {
            CopyFormat::Dump
        } else if self.modifiers.alt_key() {
            CopyFormat::Text
        } else {
            CopyFormat::Hex
        })
    }

    fn modifiers(&self) -> Modifiers {
        Modifiers {
            shift_key: self.modifiers.shift_key(),
            ctrl_key: self.modifiers.control_key(),
            alt_key: self.modifiers.alt_key(),
            meta_key: self.modifiers.super_key(),
        }
    }

    fn pointer(&self, phase: PointerPhase, button: i16) -> PointerEvent {
        PointerEvent {
            phase,
            x: self.x,
            y: self.y,
            button,
            buttons: self.buttons,
            modifiers: self.modifiers(),
        }
    }
}

fn key_name(key: &Key) -> String {
    match key {
        Key::Character(s) => s.to_string(),
        Key::Named(NamedKey::Space) => " ".to_string(),
        Key::Named(named) => format!("{named:?}"),
        _ => String::new(),
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn test_press_move_release_tracks_buttons() {
        let mut input = InputState::default();
        input.cursor_moved(10.0, 20.0);

        let down = input.mouse_input(ElementState::Pressed, MouseButton::Left).unwrap();
        assert_eq!(down.phase, PointerPhase::Down);
        assert!(down.is_primary());
        assert_eq!((down.x, down.y), (10.0, 20.0));

        let mv = input.cursor_moved(30.0, 20.0);
        assert!(mv.primary_held());
        assert_eq!(mv.button, -1);

        let up = input.mouse_input(ElementState::Released, MouseButton::Left).unwrap();
        assert_eq!(up.phase, PointerPhase::Up);
        assert_eq!(up.buttons, 0);
        assert!(!input.cursor_moved(31.0, 20.0).primary_held());
    }

    #[test]
    fn test_secondary_button_is_not_primary() {
        let mut input = InputState::default();
        let ev = input.mouse_input(ElementState::Pressed, MouseButton::Right).unwrap();
        assert_eq!(ev.button, 2);
        assert_eq!(ev.buttons, 2);
        assert!(!ev.is_primary());
        assert!(input.mouse_input(ElementState::Pressed, MouseButton::Back).is_none());
    }

    #[test]
    fn test_wheel_deltas() {
        let mut input = InputState::default();
        let line = input.wheel(MouseScrollDelta::LineDelta(0.0, -3.0));
        assert_eq!(line.delta_y, 120.0);

        input.set_modifiers(ModifiersState::SHIFT);
        let px = input.wheel(MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 25.0)));
        assert_eq!(px.delta_y, -25.0);
        assert!(px.shift_key);
    }

    #[test]
    fn test_copy_shortcuts() {
        let mut input = InputState::default();
        let c = PhysicalKey::Code(KeyCode::KeyC);
        assert_eq!(input.copy_request(ElementState::Pressed, c), None);

        input.set_modifiers(ModifiersState::CONTROL);
        assert_eq!(input.copy_request(ElementState::Pressed, c), Some(CopyFormat::Hex));
        assert_eq!(input.copy_request(ElementState::Released, c), None);
        assert_eq!(
            input.copy_request(ElementState::Pressed, PhysicalKey::Code(KeyCode::KeyV)),
            None
        );

        input.set_modifiers(ModifiersState::CONTROL | ModifiersState::SHIFT);
        assert_eq!(input.copy_request(ElementState::Pressed, c), Some(CopyFormat::Dump));
        input.set_modifiers(ModifiersState::SUPER | ModifiersState::ALT);
        assert_eq!(input.copy_request(ElementState::Pressed, c), Some(CopyFormat::Text));
    }

    #[test]
    fn test_key_event_names() {
        let mut input = InputState::default();
        input.set_modifiers(ModifiersState::CONTROL);
        let ev = input.key(
            ElementState::Pressed,
            &Key::Character("a".into()),
            PhysicalKey::Code(KeyCode::KeyA),
        );
        assert_eq!(ev.phase, KeyPhase::Down);
        assert_eq!(ev.key, "a");
        assert_eq!(ev.code, "KeyA");
        assert!(ev.modifiers.ctrl_key);

        let esc = input.key(
            ElementState::Released,
            &Key::Named(NamedKey::Escape),
            PhysicalKey::Code(KeyCode::Escape),
        );
        assert_eq!(esc.key, "Escape");
        assert_eq!(esc.phase, KeyPhase::Up);
    }
}
