//! Message payloads exchanged between the host and the engine.
//!
//! Inbound payloads are already-dispatched input events; the engine never
//! touches a windowing or DOM API.  Field names serialize in camelCase so a
//! host can forward them as JSON unchanged.

use serde::{Deserialize, Serialize};

/// Surface size change, in device pixels.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResizeEvent {
    pub width: f64,
    pub height: f64,
    pub device_pixel_ratio: f64,
}

/// Mouse wheel / trackpad scroll.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WheelEvent {
    pub delta_x: f64,
    pub delta_y: f64,
    #[serde(default)]
    pub ctrl_key: bool,
    #[serde(default)]
    pub shift_key: bool,
}

/// Keyboard modifier state carried by pointer and key events.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Modifiers {
    pub ctrl_key: bool,
    pub shift_key: bool,
    pub alt_key: bool,
    pub meta_key: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// Pointer event in surface pixel coordinates.
///
/// `button` is the button that changed state (0 = primary); `buttons` is
/// the bitmask of buttons currently held (bit 0 = primary).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub button: i16,
    #[serde(default)]
    pub buttons: u16,
    #[serde(flatten)]
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub const PRIMARY_BUTTON: i16 = 0;
    pub const PRIMARY_MASK: u16 = 1;

    pub fn new(phase: PointerPhase, x: f64, y: f64) -> Self {
        let (button, buttons) = match phase {
            PointerPhase::Down | PointerPhase::Move => (Self::PRIMARY_BUTTON, Self::PRIMARY_MASK),
            PointerPhase::Up => (Self::PRIMARY_BUTTON, 0),
        };
        Self {
            phase,
            x,
            y,
            button,
            buttons,
            modifiers: Modifiers::default(),
        }
    }

    /// Whether the button that changed state is the primary one.
    pub fn is_primary(&self) -> bool {
        self.button == Self::PRIMARY_BUTTON
    }

    /// Whether the primary button is currently held.
    pub fn primary_held(&self) -> bool {
        self.buttons & Self::PRIMARY_MASK != 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyPhase {
    Down,
    Up,
}

/// Keyboard event.  Reserved: the engine defines no key bindings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEvent {
    pub phase: KeyPhase,
    pub key: String,
    pub code: String,
    #[serde(flatten)]
    pub modifiers: Modifiers,
}

/// How a selection is rendered for clipboard export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyFormat {
    /// `48 65 6C 6C 6F`
    #[default]
    Hex,
    /// `Hello` with `.` for non-printable bytes.
    Text,
    /// The selected rows as they appear in the grid.
    Dump,
}

/// Engine → host messages.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Outbound {
    /// Device and pipeline are ready; frames will be drawn from now on.
    Ready,
    /// Unrecoverable initialization or device failure.  The engine has
    /// stopped; the host should present the message and recreate it.
    Error { message: String },
    /// Rendered text of the current selection, for the host's clipboard.
    Copy { text: String },
}

// ===================================================================
// Tests
// ===================================================================
