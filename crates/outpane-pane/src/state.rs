#![forbid(unsafe_code)]

//! Persisted pane state.
//!
//! [`PaneViewState`] is the minimal snapshot a host needs to recreate an
//! equivalent pane. The pane pushes it to its container every time an
//! option changes.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::model::{CompilerId, EditorId};
use crate::widgets::FontScale;

/// Which compiler a pane listens to and which editor it decorates.
///
/// Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaneIdentity {
    pub compiler: CompilerId,
    pub editor: EditorId,
}

impl PaneIdentity {
    #[must_use]
    pub const fn new(compiler: CompilerId, editor: EditorId) -> Self {
        Self { compiler, editor }
    }
}

fn default_font_scale() -> f32 {
    FontScale::DEFAULT
}

/// Serializable pane state: `{compiler, editor, wrap, fontScale}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaneViewState {
    pub compiler: CompilerId,
    pub editor: EditorId,
    #[serde(default)]
    pub wrap: bool,
    #[serde(default = "default_font_scale")]
    pub font_scale: f32,
}

impl PaneViewState {
    /// State for a fresh pane with default options.
    #[must_use]
    pub fn new(compiler: CompilerId, editor: EditorId) -> Self {
        Self {
            compiler,
            editor,
            wrap: false,
            font_scale: FontScale::DEFAULT,
        }
    }

    /// Builder: set the wrap option.
    #[must_use]
    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    /// Builder: set the font scale.
    #[must_use]
    pub fn with_font_scale(mut self, scale: f32) -> Self {
        self.font_scale = scale;
        self
    }

    #[must_use]
    pub fn identity(&self) -> PaneIdentity {
        PaneIdentity::new(self.compiler, self.editor)
    }

    /// Parse a persisted state.
    pub fn from_json_str(s: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Serialize for persistence.
    pub fn to_json_string(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }
}
