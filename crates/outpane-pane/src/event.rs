#![forbid(unsafe_code)]

//! Events exchanged between compiler, output and editor views.
//!
//! The event names are the wire protocol shared by every view in a
//! session; [`EventKind::as_str`] returns them.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use outpane_hub::BusEvent;

use crate::error::EventError;
use crate::model::{CompilerId, CompilerMeta, EditorId, ResultModel};

/// Routing kind of a [`PaneEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A compiler produced a new outcome.
    CompileResult,
    /// A compiler view was torn down.
    CompilerClose,
    /// An output pane announced itself.
    OutputOpened,
    /// An output pane was torn down.
    OutputClosed,
    /// Request to highlight a source line in an editor.
    EditorSetDecoration,
}

impl EventKind {
    /// Every kind, in protocol order.
    pub const ALL: [Self; 5] = [
        Self::CompileResult,
        Self::CompilerClose,
        Self::OutputOpened,
        Self::OutputClosed,
        Self::EditorSetDecoration,
    ];

    /// Wire name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CompileResult => "compileResult",
            Self::CompilerClose => "compilerClose",
            Self::OutputOpened => "outputOpened",
            Self::OutputClosed => "outputClosed",
            Self::EditorSetDecoration => "editorSetDecoration",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| EventError::UnknownEvent(s.to_string()))
    }
}

/// An event on a session bus.
///
/// Results travel behind an `Rc`: every subscriber sees the same immutable
/// snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum PaneEvent {
    /// `compileResult(compiler, meta?, result)`
    CompileResult {
        compiler: CompilerId,
        meta: Option<CompilerMeta>,
        result: Rc<ResultModel>,
    },
    /// `compilerClose(compiler)`
    CompilerClose { compiler: CompilerId },
    /// `outputOpened(compiler)`
    OutputOpened { compiler: CompilerId },
    /// `outputClosed(compiler)`
    OutputClosed { compiler: CompilerId },
    /// `editorSetDecoration(editor, line, reveal)`
    EditorSetDecoration {
        editor: EditorId,
        line: u32,
        reveal: bool,
    },
}

impl PaneEvent {
    /// The compiler this event is addressed to or about, if any.
    #[must_use]
    pub fn compiler(&self) -> Option<CompilerId> {
        match self {
            Self::CompileResult { compiler, .. }
            | Self::CompilerClose { compiler }
            | Self::OutputOpened { compiler }
            | Self::OutputClosed { compiler } => Some(*compiler),
            Self::EditorSetDecoration { .. } => None,
        }
    }
}

impl BusEvent for PaneEvent {
    type Kind = EventKind;

    fn kind(&self) -> EventKind {
        match self {
            Self::CompileResult { .. } => EventKind::CompileResult,
            Self::CompilerClose { .. } => EventKind::CompilerClose,
            Self::OutputOpened { .. } => EventKind::OutputOpened,
            Self::OutputClosed { .. } => EventKind::OutputClosed,
            Self::EditorSetDecoration { .. } => EventKind::EditorSetDecoration,
        }
    }
}
