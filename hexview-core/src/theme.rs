//! Colour theme: nine RGBA roles plus the light/dark presets.
//!
//! Colours arrive already decoded as float quadruples in `[0, 1]`; parsing
//! CSS colour strings is the host's business.

use serde::{Deserialize, Serialize};

/// RGBA colour, each channel in `[0.0, 1.0]`.
pub type Rgba = [f32; 4];

/// Fully populated colour theme.  Every role always holds a colour.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    pub background: Rgba,
    pub text: Rgba,
    pub address: Rgba,
    pub dim: Rgba,
    pub selection_bg: Rgba,
    pub selection_fg: Rgba,
    pub scroll_track: Rgba,
    pub scroll_thumb: Rgba,
    pub scroll_thumb_active: Rgba,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// The engine's built-in palette.
    pub fn dark() -> Self {
        Self {
            background: [0.06, 0.06, 0.07, 1.0],
            text: [0.85, 0.85, 0.86, 1.0],
            address: [0.55, 0.72, 0.78, 1.0],
            dim: [0.55, 0.55, 0.56, 1.0],
            selection_bg: [0.16, 0.36, 0.78, 1.0],
            selection_fg: [0.97, 0.97, 0.98, 1.0],
            scroll_track: [0.10, 0.10, 0.12, 1.0],
            scroll_thumb: [0.22, 0.22, 0.25, 1.0],
            scroll_thumb_active: [0.35, 0.35, 0.38, 1.0],
        }
    }

    /// Light preset (white page, black text, blue selection).
    pub fn light() -> Self {
        Self {
            background: rgb8(0xFF, 0xFF, 0xFF),
            text: rgb8(0x00, 0x00, 0x00),
            address: rgb8(0x66, 0x66, 0x66),
            dim: rgb8(0x99, 0x99, 0x99),
            selection_bg: rgb8(0x00, 0x78, 0xD4),
            selection_fg: rgb8(0xFF, 0xFF, 0xFF),
            scroll_track: rgb8(0xED, 0xED, 0xED),
            scroll_thumb: rgb8(0xC9, 0xC9, 0xC9),
            scroll_thumb_active: rgb8(0xAF, 0xAF, 0xAF),
        }
    }

    /// Overlay `patch` on this theme.  Roles absent from the patch keep
    /// their current colour; supplied colours are clamped into `[0, 1]` and
    /// ignored outright if any channel is not finite.
    pub fn merge(&self, patch: &ThemePatch) -> Self {
        let pick = |current: Rgba, next: Option<Rgba>| -> Rgba {
            match next {
                Some(c) if c.iter().all(|v| v.is_finite()) => c.map(|v| v.clamp(0.0, 1.0)),
                Some(_) => {
                    log::warn!("ignoring non-finite theme colour");
                    current
                }
                None => current,
            }
        };

        Self {
            background: pick(self.background, patch.background),
            text: pick(self.text, patch.text),
            address: pick(self.address, patch.address),
            dim: pick(self.dim, patch.dim),
            selection_bg: pick(self.selection_bg, patch.selection_bg),
            selection_fg: pick(self.selection_fg, patch.selection_fg),
            scroll_track: pick(self.scroll_track, patch.scroll_track),
            scroll_thumb: pick(self.scroll_thumb, patch.scroll_thumb),
            scroll_thumb_active: pick(self.scroll_thumb_active, patch.scroll_thumb_active),
        }
    }
}

/// Partial theme update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemePatch {
    pub background: Option<Rgba>,
    pub text: Option<Rgba>,
    pub address: Option<Rgba>,
    pub dim: Option<Rgba>,
    pub selection_bg: Option<Rgba>,
    pub selection_fg: Option<Rgba>,
    pub scroll_track: Option<Rgba>,
    pub scroll_thumb: Option<Rgba>,
    pub scroll_thumb_active: Option<Rgba>,
}

impl From<Theme> for ThemePatch {
    /// A patch that replaces every role.
    fn from(t: Theme) -> Self {
        Self {
            background: Some(t.background),
            text: Some(t.text),
            address: Some(t.address),
            dim: Some(t.dim),
            selection_bg: Some(t.selection_bg),
            selection_fg: Some(t.selection_fg),
            scroll_track: Some(t.scroll_track),
            scroll_thumb: Some(t.scroll_thumb),
            scroll_thumb_active: Some(t.scroll_thumb_active),
        }
    }
}

fn rgb8(r: u8, g: u8, b: u8) -> Rgba {
    [
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        1.0,
    ]
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_dark() {
        assert_eq!(Theme::default(), Theme::dark());
    }

    #[test]
    fn test_partial_merge_keeps_other_roles() {
        let base = Theme::dark();
        let patch = ThemePatch {
            text: Some([1.0, 0.0, 0.0, 1.0]),
            ..Default::default()
        };
        let merged = base.merge(&patch);
        assert_eq!(merged.text, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(merged.background, base.background);
        assert_eq!(merged.scroll_thumb_active, base.scroll_thumb_active);
    }

    #[test]
    fn test_merge_clamps_channels() {
        let patch = ThemePatch {
            dim: Some([2.0, -1.0, 0.5, 1.5]),
            ..Default::default()
        };
        let merged = Theme::dark().merge(&patch);
        assert_eq!(merged.dim, [1.0, 0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_merge_ignores_nan() {
        let patch = ThemePatch {
            address: Some([f32::NAN, 0.0, 0.0, 1.0]),
            ..Default::default()
        };
        let merged = Theme::dark().merge(&patch);
        assert_eq!(merged.address, Theme::dark().address);
    }

    #[test]
    fn test_light_preset_values() {
        let light = Theme::light();
        assert_eq!(light.background, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(light.text, [0.0, 0.0, 0.0, 1.0]);
        assert!((light.selection_bg[2] - 212.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_full_patch_replaces_everything() {
        let merged = Theme::dark().merge(&ThemePatch::from(Theme::light()));
        assert_eq!(merged, Theme::light());
    }

    #[test]
    fn test_patch_from_json() {
        let patch: ThemePatch =
            serde_json::from_str(r#"{"selectionBg":[0.0,0.5,1.0,1.0]}"#).unwrap();
        assert_eq!(patch.selection_bg, Some([0.0, 0.5, 1.0, 1.0]));
        assert!(patch.text.is_none());
    }
}
