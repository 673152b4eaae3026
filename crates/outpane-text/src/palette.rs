#![forbid(unsafe_code)]

//! Default colours for a styler instance.

use serde::{Deserialize, Serialize};

/// Default foreground and background colours (CSS colour values).
///
/// These are what an explicit "default colour" escape (SGR 39/49) and
/// inverse video resolve to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Default foreground colour.
    pub fg: String,
    /// Default background colour.
    pub bg: String,
}

impl Palette {
    /// Background shared by both stock palettes.
    pub const BACKGROUND: &'static str = "#f5f5f5";

    /// Palette for ordinary output.
    #[must_use]
    pub fn neutral() -> Self {
        Self {
            fg: "#333".into(),
            bg: Self::BACKGROUND.into(),
        }
    }

    /// Palette for output that should stand out.
    #[must_use]
    pub fn alert() -> Self {
        Self {
            fg: "red".into(),
            bg: Self::BACKGROUND.into(),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::neutral()
    }
}
