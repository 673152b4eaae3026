#![forbid(unsafe_code)]

//! Compilation outcome as delivered to output panes.
//!
//! The shapes mirror the JSON the compiler backend produces. Every optional
//! field has an explicit default: missing streams are empty, a missing
//! execution result is `None`, and a present exit code of `0` is a real
//! value like any other.
//!
//! # Example
//!
//! ```
//! use outpane_pane::model::ResultModel;
//!
//! let result = ResultModel::from_json_str(
//!     r#"{"code":1,"stderr":[{"text":"error: x","line":3}]}"#,
//! ).unwrap();
//! assert_eq!(result.code, 1);
//! assert!(result.stdout.is_empty());
//! assert_eq!(result.stderr[0].source_line(), Some(3));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Identity of a compiler view within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompilerId(pub u32);

impl CompilerId {
    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CompilerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of an editor view within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditorId(pub u32);

impl EditorId {
    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EditorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Metadata about the compiler that produced a result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerMeta {
    /// Display label, e.g. `"gcc 12"`.
    pub name: String,
}

impl CompilerMeta {
    /// Metadata carrying only a display name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Source location attached to an output line by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineTag {
    /// 1-based source line.
    pub line: Option<u32>,
}

/// One line of compiler or program output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputLine {
    /// Raw text, possibly containing ANSI escapes.
    pub text: String,
    /// Structured source location; wins over `line`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<LineTag>,
    /// Fallback source line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl OutputLine {
    /// A line with no source location.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// A line pointing at a source line through the bare `line` field.
    #[must_use]
    pub fn at_line(text: impl Into<String>, line: u32) -> Self {
        Self {
            text: text.into(),
            tag: None,
            line: Some(line),
        }
    }

    /// A line pointing at a source line through a tag.
    #[must_use]
    pub fn tagged(text: impl Into<String>, line: u32) -> Self {
        Self {
            text: text.into(),
            tag: Some(LineTag { line: Some(line) }),
            line: None,
        }
    }

    /// Resolve the originating source line.
    ///
    /// `tag.line` takes precedence, then `line`. Source lines are 1-based,
    /// so `0` means "no line".
    #[must_use]
    pub fn source_line(&self) -> Option<u32> {
        self.tag
            .and_then(|tag| tag.line)
            .or(self.line)
            .filter(|&line| line > 0)
    }
}

/// Outcome of running the compiled program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecResult {
    /// Program exit code.
    pub code: i32,
    /// Program stdout.
    pub stdout: Vec<OutputLine>,
    /// Program stderr.
    pub stderr: Vec<OutputLine>,
}

impl ExecResult {
    /// Whether the program produced any output at all.
    #[must_use]
    pub fn has_output(&self) -> bool {
        !self.stdout.is_empty() || !self.stderr.is_empty()
    }
}

/// Normalized compilation outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResultModel {
    /// Compiler exit code.
    pub code: i32,
    /// Compiler stdout.
    pub stdout: Vec<OutputLine>,
    /// Compiler stderr.
    pub stderr: Vec<OutputLine>,
    /// Child process outcome, when the program was executed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exec_result: Option<ExecResult>,
    /// Display label for the compiler, when the backend supplies one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler_name: Option<String>,
}

impl ResultModel {
    /// A result with only an exit code.
    #[must_use]
    pub fn with_code(code: i32) -> Self {
        Self {
            code,
            ..Self::default()
        }
    }

    /// Parse a backend JSON payload.
    pub fn from_json_str(s: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Serialize back to the backend JSON shape.
    pub fn to_json_string(&self) -> Result<String, ModelError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Compiler stdout followed by compiler stderr, in order.
    pub fn compiler_lines(&self) -> impl Iterator<Item = &OutputLine> {
        self.stdout.iter().chain(self.stderr.iter())
    }
}
