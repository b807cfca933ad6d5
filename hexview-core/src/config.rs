//! Engine configuration.
//!
//! [`EngineConfig`] is an immutable, always fully populated value.  Hosts
//! send [`ConfigPatch`]es; [`EngineConfig::merge`] folds a patch in and
//! returns the next config.  Out-of-range numbers are clamped rather than
//! rejected, and non-finite numbers are ignored, so a merge never fails.

use serde::{Deserialize, Serialize};

use crate::theme::{Theme, ThemePatch};

/// Font size bounds in pixels.
pub const FONT_PX_MIN: u32 = 8;
pub const FONT_PX_MAX: u32 = 48;
/// Scrollbar width bounds in pixels.
pub const SCROLLBAR_WIDTH_MIN: u32 = 8;
pub const SCROLLBAR_WIDTH_MAX: u32 = 64;
/// Upper bound for bytes per row, shared with the layout engine.
pub const MAX_BYTES_PER_ROW: u32 = 1024;
pub const ADDRESS_GAP_MAX: u32 = 8;
pub const HEX_GAP_MAX: u32 = 8;
pub const SECTION_GAP_MAX: u32 = 16;

/// Column spacing, in character cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gaps {
    /// Blanks between the address colon and the first hex digit.
    pub address: u32,
    /// Blanks after each byte's two hex digits.
    pub hex: u32,
    /// Blanks between the hex section and the ASCII section.
    pub section: u32,
}

impl Default for Gaps {
    fn default() -> Self {
        Self {
            address: 1,
            hex: 1,
            section: 2,
        }
    }
}

/// Complete engine configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub font_px: u32,
    pub scrollbar_width_px: u32,
    pub min_bytes_per_row: u32,
    pub gaps: Gaps,
    pub theme: Theme,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            font_px: 14,
            scrollbar_width_px: 20,
            min_bytes_per_row: 4,
            gaps: Gaps::default(),
            theme: Theme::default(),
        }
    }
}

/// Partial configuration update.
///
/// Numbers are `f64` because hosts hand over untyped numeric values; they
/// are floored and clamped on merge.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigPatch {
    pub font_px: Option<f64>,
    pub theme: Option<ThemePatch>,
    pub scrollbar_width_px: Option<f64>,
    pub min_bytes_per_row: Option<f64>,
    pub address_gap_chars: Option<f64>,
    pub hex_gap_chars: Option<f64>,
    pub section_gap_chars: Option<f64>,
}

impl ConfigPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// What changed between two configs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConfigChanges {
    /// Font size changed: cell metrics and the glyph atlas must be rebuilt.
    pub font: bool,
    /// Scrollbar width, minimum row width or gaps changed: relayout.
    pub layout: bool,
    /// Colours changed.  Never requires a GPU rebuild.
    pub theme: bool,
}

impl ConfigChanges {
    pub fn any(&self) -> bool {
        self.font || self.layout || self.theme
    }
}

impl EngineConfig {
    /// Build a config from defaults plus `patch`.
    pub fn from_patch(patch: &ConfigPatch) -> Self {
        Self::default().merge(patch)
    }

    /// Return a new config with `patch` applied over `self`.
    pub fn merge(&self, patch: &ConfigPatch) -> Self {
        let theme = match &patch.theme {
            Some(t) => self.theme.merge(t),
            None => self.theme,
        };

        Self {
            font_px: lenient(patch.font_px, FONT_PX_MIN, FONT_PX_MAX).unwrap_or(self.font_px),
            scrollbar_width_px: lenient(
                patch.scrollbar_width_px,
                SCROLLBAR_WIDTH_MIN,
                SCROLLBAR_WIDTH_MAX,
            )
            .unwrap_or(self.scrollbar_width_px),
            min_bytes_per_row: lenient(patch.min_bytes_per_row, 1, MAX_BYTES_PER_ROW)
                .unwrap_or(self.min_bytes_per_row),
            gaps: Gaps {
                address: lenient(patch.address_gap_chars, 0, ADDRESS_GAP_MAX)
                    .unwrap_or(self.gaps.address),
                hex: lenient(patch.hex_gap_chars, 0, HEX_GAP_MAX).unwrap_or(self.gaps.hex),
                section: lenient(patch.section_gap_chars, 0, SECTION_GAP_MAX)
                    .unwrap_or(self.gaps.section),
            },
            theme,
        }
    }

    /// Compare with `next` and report which subsystems need work.
    pub fn changes(&self, next: &EngineConfig) -> ConfigChanges {
        ConfigChanges {
            font: self.font_px != next.font_px,
            layout: self.scrollbar_width_px != next.scrollbar_width_px
                || self.min_bytes_per_row != next.min_bytes_per_row
                || self.gaps != next.gaps,
            theme: self.theme != next.theme,
        }
    }
}

/// Floor and clamp a host number; `None` for absent or non-finite input.
fn lenient(value: Option<f64>, lo: u32, hi: u32) -> Option<u32> {
    let v = value?;
    if !v.is_finite() {
        log::warn!("ignoring non-finite config value {v}");
        return None;
    }
    Some(v.floor().clamp(f64::from(lo), f64::from(hi)) as u32)
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.font_px, 14);
        assert_eq!(cfg.scrollbar_width_px, 20);
        assert_eq!(cfg.min_bytes_per_row, 4);
        assert_eq!(cfg.gaps, Gaps { address: 1, hex: 1, section: 2 });
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.merge(&ConfigPatch::default()), cfg);
        assert!(ConfigPatch::default().is_empty());
    }

    #[test]
    fn test_out_of_range_values_are_clamped() {
        let patch = ConfigPatch {
            font_px: Some(200.0),
            scrollbar_width_px: Some(2.0),
            min_bytes_per_row: Some(0.0),
            address_gap_chars: Some(-3.0),
            hex_gap_chars: Some(99.0),
            section_gap_chars: Some(17.9),
            theme: None,
        };
        let cfg = EngineConfig::from_patch(&patch);
        assert_eq!(cfg.font_px, 48);
        assert_eq!(cfg.scrollbar_width_px, 8);
        assert_eq!(cfg.min_bytes_per_row, 1);
        assert_eq!(cfg.gaps.address, 0);
        assert_eq!(cfg.gaps.hex, 8);
        assert_eq!(cfg.gaps.section, 16);
    }

    #[test]
    fn test_fractional_values_are_floored() {
        let patch = ConfigPatch {
            font_px: Some(15.7),
            min_bytes_per_row: Some(8.99),
            ..Default::default()
        };
        let cfg = EngineConfig::from_patch(&patch);
        assert_eq!(cfg.font_px, 15);
        assert_eq!(cfg.min_bytes_per_row, 8);
    }

    #[test]
    fn test_non_finite_values_keep_previous() {
        let base = EngineConfig::default();
        let patch = ConfigPatch {
            font_px: Some(f64::NAN),
            scrollbar_width_px: Some(f64::INFINITY),
            ..Default::default()
        };
        let cfg = base.merge(&patch);
        assert_eq!(cfg.font_px, base.font_px);
        assert_eq!(cfg.scrollbar_width_px, base.scrollbar_width_px);
    }

    #[test]
    fn test_merge_is_layered() {
        let first = EngineConfig::default().merge(&ConfigPatch {
            font_px: Some(20.0),
            ..Default::default()
        });
        let second = first.merge(&ConfigPatch {
            hex_gap_chars: Some(0.0),
            ..Default::default()
        });
        assert_eq!(second.font_px, 20);
        assert_eq!(second.gaps.hex, 0);
    }

    #[test]
    fn test_changes_classification() {
        let base = EngineConfig::default();
        let font = base.merge(&ConfigPatch { font_px: Some(18.0), ..Default::default() });
        let layout = base.merge(&ConfigPatch { section_gap_chars: Some(4.0), ..Default::default() });
        let theme = base.merge(&ConfigPatch {
            theme: Some(ThemePatch { text: Some([1.0; 4]), ..Default::default() }),
            ..Default::default()
        });

        assert_eq!(base.changes(&font), ConfigChanges { font: true, layout: false, theme: false });
        assert_eq!(base.changes(&layout), ConfigChanges { font: false, layout: true, theme: false });
        assert_eq!(base.changes(&theme), ConfigChanges { font: false, layout: false, theme: true });
        assert!(!base.changes(&base).any());
    }

    #[test]
    fn test_patch_deserializes_camel_case() {
        let patch: ConfigPatch = serde_json::from_str(
            r#"{"fontPx": 16, "hexGapChars": 0, "theme": {"background": [0, 0, 0, 1]}}"#,
        )
        .unwrap();
        assert_eq!(patch.font_px, Some(16.0));
        assert_eq!(patch.hex_gap_chars, Some(0.0));
        assert_eq!(patch.theme.unwrap().background, Some([0.0, 0.0, 0.0, 1.0]));
        assert!(patch.scrollbar_width_px.is_none());
    }
}
