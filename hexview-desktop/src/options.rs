//! Startup options: command line and the optional JSON config file.
//!
//! ```text
//! hexview-desktop [--light] [FILE]
//! HEXVIEW_CONFIG=/path/to/config.json   # a ConfigPatch, camelCase keys
//! ```

use std::path::{Path, PathBuf};

use hexview_core::{ConfigPatch, Theme, ThemePatch};
use thiserror::Error;

pub const CONFIG_ENV: &str = "HEXVIEW_CONFIG";

#[derive(Error, Debug)]
pub enum OptionsError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("unknown option: {0}")]
    UnknownFlag(String),
}

#[derive(Debug, Default)]
pub struct Options {
    pub file: Option<PathBuf>,
    pub light: bool,
    pub config: ConfigPatch,
}

impl Options {
    /// Parse arguments (without the program name) and load the config file
    /// named by `config_path`, if any.
    pub fn load<I>(args: I, config_path: Option<PathBuf>) -> Result<Self, OptionsError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut options = Self::default();
        for arg in args {
            match arg.as_str() {
                "--light" => options.light = true,
                flag if flag.starts_with("--") => return Err(OptionsError::UnknownFlag(arg)),
                _ => options.file = Some(PathBuf::from(arg)),
            }
        }
        if let Some(path) = config_path {
            options.config = read_config(&path)?;
        }
        if options.light {
            // The file's own theme entries still win over the preset.
            let mut theme = ThemePatch::from(Theme::light());
            if let Some(user) = &options.config.theme {
                theme = merge_theme_patch(theme, user);
            }
            options.config.theme = Some(theme);
        }
        Ok(options)
    }

    /// Hand the startup config to the engine's `Init`; later calls get an
    /// empty patch.
    pub fn take_config(&mut self) -> ConfigPatch {
        std::mem::take(&mut self.config)
    }

    /// Bytes of the file named on the command line, or an empty buffer.
    pub fn read_data(&self) -> Result<Vec<u8>, OptionsError> {
        match &self.file {
            Some(path) => std::fs::read(path).map_err(|source| OptionsError::Read {
                path: path.clone(),
                source,
            }),
            None => Ok(Vec::new()),
        }
    }
}

pub fn read_config(path: &Path) -> Result<ConfigPatch, OptionsError> {
    let text = std::fs::read_to_string(path).map_err(|source| OptionsError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| OptionsError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn merge_theme_patch(base: ThemePatch, over: &ThemePatch) -> ThemePatch {
    ThemePatch {
        background: over.background.or(base.background),
        text: over.text.or(base.text),
        address: over.address.or(base.address),
        dim: over.dim.or(base.dim),
        selection_bg: over.selection_bg.or(base.selection_bg),
        selection_fg: over.selection_fg.or(base.selection_fg),
        scroll_track: over.scroll_track.or(base.scroll_track),
        scroll_thumb: over.scroll_thumb.or(base.scroll_thumb),
        scroll_thumb_active: over.scroll_thumb_active.or(base.scroll_thumb_active),
    }
}

// ===================================================================
// Tests
// ===================================================================
