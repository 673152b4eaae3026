#![forbid(unsafe_code)]

//! Compiler output pane.
//!
//! An output pane renders what a compiler produced (its streams, its exit
//! code and the output of the executed program) and lets the user jump from
//! a diagnostic to the source line in an editor. Compiler, pane and editor
//! never reference each other; they share a [`Session`] bus and address one
//! another by id.
//!
//! # Key Components
//!
//! - [`OutputPane`] - lifecycle, subscriptions and option handling
//! - [`Projector`] - result-to-display projection
//! - [`LineLinker`] - click/hover to `editorSetDecoration`
//! - [`CompilerPublisher`] - the producing side of the protocol
//! - [`PaneEvent`] / [`EventKind`] - the wire protocol
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use outpane_pane::{
//!     CompilerId, CompilerPublisher, EditorId, MemoryContainer, OutputPane,
//!     PaneConfig, PaneViewState, ResultModel, Session,
//! };
//!
//! let session = Session::new();
//! let compiler = CompilerPublisher::new(&session, CompilerId(1));
//! let container = Rc::new(MemoryContainer::new());
//! let pane = OutputPane::new(
//!     &session,
//!     container.clone(),
//!     PaneViewState::new(CompilerId(1), EditorId(1)),
//!     PaneConfig::default(),
//! );
//!
//! compiler.publish(None, ResultModel::with_code(0));
//! assert_eq!(pane.content().plain_text(), "Compiler returned: 0");
//!
//! compiler.close();
//! session.run_pending();
//! assert!(pane.is_closed());
//! assert!(container.is_closed());
//! ```

pub mod compiler;
pub mod config;
pub mod container;
pub mod error;
pub mod event;
pub mod linker;
pub mod model;
pub mod pane;
pub mod projection;
pub mod session;
pub mod state;
pub mod widgets;

pub use compiler::CompilerPublisher;
pub use config::PaneConfig;
pub use container::{ContainerSize, MemoryContainer, PaneContainer};
pub use error::{ConfigError, EventError, ModelError};
pub use event::{EventKind, PaneEvent};
pub use linker::{LineLinker, LinkResponse};
pub use model::{CompilerId, CompilerMeta, EditorId, ExecResult, LineTag, OutputLine, ResultModel};
pub use pane::{CONTENT_MARGIN, LayoutFlags, OutputPane, PaneLifecycle};
pub use projection::{Projector, RenderedContent, RenderedLine, title};
pub use session::Session;
pub use state::{PaneIdentity, PaneViewState};
pub use widgets::{FontScale, ToggleState, Toggles};
