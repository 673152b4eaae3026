#![forbid(unsafe_code)]

//! outpane public facade crate.
//!
//! Re-exports the stable surface of the internal crates and offers a
//! prelude for hosts embedding compiler output panes.

use std::fmt;

// --- Hub re-exports --------------------------------------------------------

pub use outpane_hub::{BusEvent, EventHub, HubHandle, Observable, ObserverGuard, TickQueue};

// --- Text re-exports -------------------------------------------------------

pub use outpane_text::{AnsiMarkup, Palette, TextStyler, escape_markup};

// --- Pane re-exports -------------------------------------------------------

pub use outpane_pane::{
    CompilerId, CompilerMeta, CompilerPublisher, ConfigError, ContainerSize, EditorId,
    EventError, EventKind, ExecResult, FontScale, LayoutFlags, LineLinker, LineTag, LinkResponse,
    MemoryContainer, ModelError, OutputLine, OutputPane, PaneConfig, PaneContainer, PaneEvent,
    PaneIdentity, PaneLifecycle, PaneViewState, Projector, RenderedContent, RenderedLine,
    ResultModel, Session, ToggleState, Toggles,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for outpane hosts.
#[derive(Debug)]
pub enum Error {
    /// Malformed backend payload or persisted state.
    Model(ModelError),
    /// Configuration could not be loaded.
    Config(ConfigError),
    /// Unknown wire event name.
    Event(EventError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "{err}"),
            Self::Event(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Model(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Event(err) => Some(err),
        }
    }
}

impl From<ModelError> for Error {
    fn from(err: ModelError) -> Self {
        Self::Model(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<EventError> for Error {
    fn from(err: EventError) -> Self {
        Self::Event(err)
    }
}

/// Standard result type for outpane APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CompilerId, CompilerMeta, CompilerPublisher, EditorId, Error, EventKind, LinkResponse,
        MemoryContainer, OutputPane, PaneConfig, PaneContainer, PaneEvent, PaneViewState, Result,
        ResultModel, Session,
    };

    pub use crate::{hub, pane, text};
}

pub use outpane_hub as hub;
pub use outpane_pane as pane;
pub use outpane_text as text;
