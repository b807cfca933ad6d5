//! Font family chains.
//!
//! A [`FontDescription`] is parsed from a CSS `font-family` value and
//! resolved once per [`crate::TextEngine`] against the font database: the
//! first named family that is installed wins, generic keywords always
//! resolve, and `monospace` is the last resort.

use cosmic_text::fontdb;
use cosmic_text::Family;

/// Family chain used when the host does not name one.
pub const DEFAULT_FONT_FAMILY: &str = "ui-monospace, SFMono-Regular, Menlo, Monaco, Consolas, \
     \"Liberation Mono\", \"Courier New\", monospace";

// ── Generic family ──────────────────────────────────────────────────

/// CSS generic font families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GenericFamily {
    Serif,
    SansSerif,
    Monospace,
    Cursive,
    Fantasy,
}

/// One entry of a family chain.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FamilyName {
    Generic(GenericFamily),
    Named(String),
}

impl FamilyName {
    /// Borrow as a `cosmic-text` family for [`cosmic_text::Attrs`].
    pub fn as_family(&self) -> Family<'_> {
        match self {
            FamilyName::Generic(GenericFamily::Serif) => Family::Serif,
            FamilyName::Generic(GenericFamily::SansSerif) => Family::SansSerif,
            FamilyName::Generic(GenericFamily::Monospace) => Family::Monospace,
            FamilyName::Generic(GenericFamily::Cursive) => Family::Cursive,
            FamilyName::Generic(GenericFamily::Fantasy) => Family::Fantasy,
            FamilyName::Named(name) => Family::Name(name),
        }
    }
}

// ── Font description ────────────────────────────────────────────────

/// Ordered family fallback chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontDescription {
    pub families: Vec<FamilyName>,
}

impl Default for FontDescription {
    fn default() -> Self {
        Self::from_css(DEFAULT_FONT_FAMILY)
    }
}

impl FontDescription {
    /// Parse `"Menlo, \"Courier New\", monospace"` into a chain.
    ///
    /// Quotes are stripped and names keep their case.  System-UI keywords
    /// (`ui-monospace`, `system-ui`, …) have no portable meaning and are
    /// dropped.  An empty chain becomes `monospace`.
    pub fn from_css(family_str: &str) -> Self {
        let families: Vec<FamilyName> = family_str
            .split(',')
            .map(|s| s.trim().trim_matches('"').trim_matches('\''))
            .filter(|s| !s.is_empty())
            .filter_map(|s| match parse_generic(&s.to_ascii_lowercase()) {
                Some(generic) => Some(FamilyName::Generic(generic)),
                None if is_system_ui(s) => None,
                None => Some(FamilyName::Named(s.to_string())),
            })
            .collect();

        Self {
            families: if families.is_empty() {
                vec![FamilyName::Generic(GenericFamily::Monospace)]
            } else {
                families
            },
        }
    }

    /// Pick the first family of the chain that the database can serve.
    pub fn resolve(&self, db: &fontdb::Database) -> FamilyName {
        for family in &self.families {
            match family {
                FamilyName::Generic(_) => return family.clone(),
                FamilyName::Named(name) if has_family(db, name) => {
                    log::debug!("font family resolved to {name}");
                    return family.clone();
                }
                FamilyName::Named(name) => log::trace!("font family {name} not installed"),
            }
        }
        FamilyName::Generic(GenericFamily::Monospace)
    }
}

/// Parse a generic family keyword.
fn parse_generic(name: &str) -> Option<GenericFamily> {
    match name {
        "serif" => Some(GenericFamily::Serif),
        "sans-serif" => Some(GenericFamily::SansSerif),
        "monospace" => Some(GenericFamily::Monospace),
        "cursive" => Some(GenericFamily::Cursive),
        "fantasy" => Some(GenericFamily::Fantasy),
        _ => None,
    }
}

fn is_system_ui(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower == "system-ui" || lower.starts_with("ui-")
}

fn has_family(db: &fontdb::Database, name: &str) -> bool {
    db.faces()
        .any(|face| face.families.iter().any(|(n, _)| n.eq_ignore_ascii_case(name)))
}

// ===================================================================
// Tests
// ===================================================================
