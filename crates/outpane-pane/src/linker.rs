#![forbid(unsafe_code)]

//! Output-line to editor-line linking.
//!
//! Clicking a linked line reveals the source line in the paired editor;
//! hovering only highlights it. There is no hover-leave event: the editor
//! keeps the last decoration until told otherwise.

use outpane_hub::HubHandle;
use tracing::trace;

use crate::event::PaneEvent;
use crate::model::EditorId;

/// Outcome of a pointer interaction with a rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkResponse {
    /// A decoration request was emitted. For clicks the host must suppress
    /// its default navigation.
    Handled,
    /// The line has no source location; nothing was emitted.
    Ignored,
}

impl LinkResponse {
    #[must_use]
    pub const fn is_handled(self) -> bool {
        matches!(self, Self::Handled)
    }
}

/// Emits `editorSetDecoration` for the pane's editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineLinker {
    editor: EditorId,
}

impl LineLinker {
    #[must_use]
    pub const fn new(editor: EditorId) -> Self {
        Self { editor }
    }

    #[must_use]
    pub const fn editor(&self) -> EditorId {
        self.editor
    }

    /// The decoration event for `source_line`, if it links anywhere.
    #[must_use]
    pub fn decoration(&self, source_line: Option<u32>, reveal: bool) -> Option<PaneEvent> {
        source_line.map(|line| PaneEvent::EditorSetDecoration {
            editor: self.editor,
            line,
            reveal,
        })
    }

    /// Click: reveal the line.
    pub fn activate(&self, hub: &HubHandle<PaneEvent>, source_line: Option<u32>) -> LinkResponse {
        self.send(hub, source_line, true)
    }

    /// Hover: highlight without moving the editor.
    pub fn hover(&self, hub: &HubHandle<PaneEvent>, source_line: Option<u32>) -> LinkResponse {
        self.send(hub, source_line, false)
    }

    fn send(
        &self,
        hub: &HubHandle<PaneEvent>,
        source_line: Option<u32>,
        reveal: bool,
    ) -> LinkResponse {
        match self.decoration(source_line, reveal) {
            Some(event) => {
                trace!(editor = %self.editor, ?source_line, reveal, "decoration request");
                hub.emit(event);
                LinkResponse::Handled
            }
            None => LinkResponse::Ignored,
        }
    }
}
