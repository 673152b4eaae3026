#![forbid(unsafe_code)]

//! Pane configuration.
//!
//! Every field has a default matching the stock pane, so
//! `PaneConfig::default()` needs no file at all.
//!
//! # Loading
//!
//! ```toml
//! # outpane.toml
//! wrap_title = "Wrap lines"
//! alert_color = "red"
//! font_scale_step = 2.0
//!
//! [neutral]
//! fg = "#333"
//! bg = "#f5f5f5"
//! ```
//!
//! ```rust,ignore
//! let config = PaneConfig::from_toml_file("outpane.toml")?;
//! let config = PaneConfig::from_json_str(json)?;
//! ```

#[cfg(feature = "config")]
use std::path::Path;

use outpane_text::Palette;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tunables for an [`OutputPane`](crate::OutputPane).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaneConfig {
    /// Label of the wrap toggle, shown as `"[ON] <title>"` / `"[OFF] <title>"`.
    pub wrap_title: String,
    /// Palette for compiler output and child stderr.
    pub neutral: Palette,
    /// Palette for child stdout.
    pub alert: Palette,
    /// Element colour applied to child stderr lines.
    pub alert_color: String,
    /// Increment used by the font-scale buttons.
    pub font_scale_step: f32,
    /// Toolbar height subtracted from the container height on resize.
    pub toolbar_height: u32,
}

impl Default for PaneConfig {
    fn default() -> Self {
        Self {
            wrap_title: "Wrap lines".into(),
            neutral: Palette::neutral(),
            alert: Palette::alert(),
            alert_color: "red".into(),
            font_scale_step: 1.0,
            toolbar_height: 0,
        }
    }
}

impl PaneConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s).map_err(ConfigError::Toml)?;
        config.validated()
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s).map_err(ConfigError::Json)?;
        config.validated()
    }

    /// Check every field is usable.
    ///
    /// Returns the list of problems; empty means valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.wrap_title.trim().is_empty() {
            errors.push("wrap_title must not be empty".into());
        }
        if !(self.font_scale_step.is_finite() && self.font_scale_step > 0.0) {
            errors.push(format!(
                "font_scale_step must be > 0, got {}",
                self.font_scale_step
            ));
        }
        if self.alert_color.trim().is_empty() {
            errors.push("alert_color must not be empty".into());
        }

        errors
    }

    fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }
}
