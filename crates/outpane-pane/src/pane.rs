#![forbid(unsafe_code)]

//! The output pane.
//!
//! An [`OutputPane`] shows the latest outcome of one compiler and links
//! output lines back to one editor. It knows both only by id: everything
//! flows over the session bus.
//!
//! # Lifecycle
//!
//! ```text
//! Created --(construction done)--> Active --(compilerClose / destroy)--> Closed
//! ```
//!
//! Closing emits `outputClosed`, releases every bus subscription and option
//! observer, and is idempotent. When the close is triggered by
//! `compilerClose`, removing the container from the host layout is deferred
//! to the session's next tick, since the host may still be walking its
//! layout tree when the broadcast arrives.
//!
//! # Invariants
//!
//! - Events for a different compiler id never change the pane.
//! - A closed pane emits nothing and persists nothing.
//! - No internal borrow is held while the bus or the container is called.
//!
//! # Failure Modes
//!
//! - Dropping an `OutputPane` without closing it releases its subscriptions
//!   but does not announce `outputClosed`; hosts should call
//!   [`OutputPane::on_destroy`] first.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use outpane_hub::{HubHandle, ObserverGuard, TickQueue};
use tracing::{debug, trace};

use crate::config::PaneConfig;
use crate::container::{ContainerSize, PaneContainer};
use crate::event::{EventKind, PaneEvent};
use crate::linker::{LineLinker, LinkResponse};
use crate::model::{CompilerId, CompilerMeta, EditorId, ResultModel};
use crate::projection::{self, Projector, RenderedContent, RenderedLine};
use crate::session::Session;
use crate::state::{PaneIdentity, PaneViewState};
use crate::widgets::{FontScale, ToggleState, Toggles};

/// Space kept free below the content area.
pub const CONTENT_MARGIN: u32 = 5;

/// Lifecycle state of a pane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneLifecycle {
    Created,
    Active,
    Closed,
}

/// Layout flags derived from the current options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutFlags {
    pub wrap: bool,
}

struct PaneShared {
    identity: PaneIdentity,
    config: PaneConfig,
    handle: HubHandle<PaneEvent>,
    ticks: TickQueue,
    container: Rc<dyn PaneContainer>,
    linker: LineLinker,
    toggles: Toggles,
    font_scale: FontScale,
    observers: RefCell<Vec<ObserverGuard>>,
    lifecycle: Cell<PaneLifecycle>,
    compiler_name: RefCell<Option<String>>,
    projector: RefCell<Projector>,
    content: RefCell<RenderedContent>,
    title: RefCell<String>,
    layout: Cell<LayoutFlags>,
    wrap_label: RefCell<String>,
    content_height: Cell<u32>,
}

impl PaneShared {
    fn is_closed(&self) -> bool {
        self.lifecycle.get() == PaneLifecycle::Closed
    }

    fn view_state(&self) -> PaneViewState {
        PaneViewState {
            compiler: self.identity.compiler,
            editor: self.identity.editor,
            wrap: self.toggles.wrap(),
            font_scale: self.font_scale.scale(),
        }
    }

    fn save_state(&self) {
        if self.is_closed() {
            return;
        }
        self.container.set_state(&self.view_state());
    }

    fn on_options_change(&self, options: ToggleState) {
        if self.is_closed() {
            return;
        }
        self.layout.set(LayoutFlags { wrap: options.wrap });
        let flag = if options.wrap { "ON" } else { "OFF" };
        *self.wrap_label.borrow_mut() = format!("[{flag}] {}", self.config.wrap_title);
        self.save_state();
    }

    fn update_title(&self) {
        let title = projection::title(
            self.identity.compiler,
            self.compiler_name.borrow().as_deref(),
        );
        *self.title.borrow_mut() = title.clone();
        self.container.set_title(&title);
    }

    fn on_compile_result(&self, meta: Option<&CompilerMeta>, result: &ResultModel) {
        let name = meta
            .map(|m| m.name.as_str())
            .filter(|name| !name.is_empty())
            .or_else(|| {
                result
                    .compiler_name
                    .as_deref()
                    .filter(|name| !name.is_empty())
            });
        if let Some(name) = name {
            *self.compiler_name.borrow_mut() = Some(name.to_string());
        }

        let content = self.projector.borrow_mut().project(result);
        *self.content.borrow_mut() = content;
        self.update_title();
    }

    /// Returns `false` when the pane was already closed.
    fn close(&self) -> bool {
        if self.is_closed() {
            return false;
        }
        // Mark closed before announcing: listeners of `outputClosed` may
        // re-enter through `compilerClose`.
        self.lifecycle.set(PaneLifecycle::Closed);
        let compiler = self.identity.compiler;
        self.handle.emit(PaneEvent::OutputClosed { compiler });
        let released = self.handle.unsubscribe_all();
        self.observers.borrow_mut().clear();
        debug!(%compiler, released, "output pane closed");
        true
    }
}

/// A compiler output view.
pub struct OutputPane {
    shared: Rc<PaneShared>,
}

impl std::fmt::Debug for OutputPane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputPane")
            .field("identity", &self.shared.identity)
            .field("lifecycle", &self.shared.lifecycle.get())
            .field("title", &*self.shared.title.borrow())
            .finish_non_exhaustive()
    }
}

impl OutputPane {
    /// Open a pane with stock [`AnsiMarkup`](outpane_text::AnsiMarkup) stylers.
    pub fn new(
        session: &Session,
        container: Rc<dyn PaneContainer>,
        state: PaneViewState,
        config: PaneConfig,
    ) -> Self {
        let projector = Projector::from_config(&config);
        Self::with_projector(session, container, state, config, projector)
    }

    /// Open a pane rendering through `projector`.
    pub fn with_projector(
        session: &Session,
        container: Rc<dyn PaneContainer>,
        state: PaneViewState,
        config: PaneConfig,
        projector: Projector,
    ) -> Self {
        let identity = state.identity();
        let toggles = Toggles::new(ToggleState { wrap: state.wrap });
        let font_scale = FontScale::new(state.font_scale, config.font_scale_step);
        let initial_title = projection::title(identity.compiler, None);

        let shared = Rc::new(PaneShared {
            identity,
            handle: session.handle(),
            ticks: session.ticks().clone(),
            container,
            linker: LineLinker::new(identity.editor),
            toggles,
            font_scale,
            observers: RefCell::new(Vec::new()),
            lifecycle: Cell::new(PaneLifecycle::Created),
            compiler_name: RefCell::new(None),
            projector: RefCell::new(projector),
            content: RefCell::new(RenderedContent::default()),
            title: RefCell::new(initial_title),
            layout: Cell::new(LayoutFlags { wrap: state.wrap }),
            wrap_label: RefCell::new(String::new()),
            content_height: Cell::new(0),
            config,
        });

        {
            let weak = Rc::downgrade(&shared);
            let toggles_guard = shared.toggles.subscribe(move |options| {
                if let Some(pane) = weak.upgrade() {
                    pane.on_options_change(*options);
                }
            });
            let weak = Rc::downgrade(&shared);
            let font_guard = shared.font_scale.subscribe(move |_| {
                if let Some(pane) = weak.upgrade() {
                    pane.save_state();
                }
            });
            shared
                .observers
                .borrow_mut()
                .extend([toggles_guard, font_guard]);
        }

        Self::subscribe(&shared);

        let compiler = identity.compiler;
        shared.handle.emit(PaneEvent::OutputOpened { compiler });
        shared.on_options_change(shared.toggles.get());
        shared.update_title();
        if !shared.is_closed() {
            shared.lifecycle.set(PaneLifecycle::Active);
        }
        debug!(%compiler, editor = %identity.editor, "output pane opened");

        Self { shared }
    }

    fn subscribe(shared: &Rc<PaneShared>) {
        let weak: Weak<PaneShared> = Rc::downgrade(shared);
        shared
            .handle
            .subscribe(EventKind::CompileResult, move |event| {
                let Some(pane) = weak.upgrade() else { return };
                let PaneEvent::CompileResult {
                    compiler,
                    meta,
                    result,
                } = event
                else {
                    return;
                };
                if *compiler != pane.identity.compiler {
                    trace!(%compiler, own = %pane.identity.compiler, "ignoring foreign result");
                    return;
                }
                if pane.is_closed() {
                    return;
                }
                pane.on_compile_result(meta.as_ref(), result);
            });

        let weak: Weak<PaneShared> = Rc::downgrade(shared);
        shared
            .handle
            .subscribe(EventKind::CompilerClose, move |event| {
                let Some(pane) = weak.upgrade() else { return };
                let PaneEvent::CompilerClose { compiler } = event else {
                    return;
                };
                if *compiler != pane.identity.compiler {
                    trace!(%compiler, own = %pane.identity.compiler, "ignoring foreign close");
                    return;
                }
                if pane.close() {
                    let container = Rc::clone(&pane.container);
                    pane.ticks.defer(move || container.close());
                }
            });
    }

    #[must_use]
    pub fn identity(&self) -> PaneIdentity {
        self.shared.identity
    }

    #[must_use]
    pub fn compiler(&self) -> CompilerId {
        self.shared.identity.compiler
    }

    #[must_use]
    pub fn editor(&self) -> EditorId {
        self.shared.identity.editor
    }

    #[must_use]
    pub fn lifecycle(&self) -> PaneLifecycle {
        self.shared.lifecycle.get()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.is_closed()
    }

    /// Current title, as last pushed to the container.
    #[must_use]
    pub fn title(&self) -> String {
        self.shared.title.borrow().clone()
    }

    /// Most recently observed compiler name.
    #[must_use]
    pub fn compiler_name(&self) -> Option<String> {
        self.shared.compiler_name.borrow().clone()
    }

    /// Snapshot of the displayed content.
    #[must_use]
    pub fn content(&self) -> RenderedContent {
        self.shared.content.borrow().clone()
    }

    #[must_use]
    pub fn layout(&self) -> LayoutFlags {
        self.shared.layout.get()
    }

    /// Tooltip of the wrap toggle: `"[ON] ..."` or `"[OFF] ..."`.
    #[must_use]
    pub fn wrap_label(&self) -> String {
        self.shared.wrap_label.borrow().clone()
    }

    /// Height available to the content area after the last resize.
    #[must_use]
    pub fn content_height(&self) -> u32 {
        self.shared.content_height.get()
    }

    #[must_use]
    pub fn view_state(&self) -> PaneViewState {
        self.shared.view_state()
    }

    /// The pane's toggle group; changes made through it are observed.
    #[must_use]
    pub fn toggles(&self) -> &Toggles {
        &self.shared.toggles
    }

    /// The pane's font selector; changes made through it are persisted.
    #[must_use]
    pub fn font_scale(&self) -> &FontScale {
        &self.shared.font_scale
    }

    pub fn set_wrap(&self, wrap: bool) {
        self.shared.toggles.set_wrap(wrap);
    }

    pub fn set_font_scale(&self, scale: f32) {
        self.shared.font_scale.set(scale);
    }

    fn source_line_at(&self, index: usize) -> Option<u32> {
        self.shared
            .content
            .borrow()
            .get(index)
            .and_then(RenderedLine::source_line)
    }

    /// Click on rendered line `index`.
    pub fn activate_line(&self, index: usize) -> LinkResponse {
        if self.is_closed() {
            return LinkResponse::Ignored;
        }
        let line = self.source_line_at(index);
        self.shared.linker.activate(&self.shared.handle, line)
    }

    /// Pointer entered rendered line `index`.
    pub fn hover_line(&self, index: usize) -> LinkResponse {
        if self.is_closed() {
            return LinkResponse::Ignored;
        }
        let line = self.source_line_at(index);
        self.shared.linker.hover(&self.shared.handle, line)
    }

    /// Host resized the container. Returns the new content height.
    pub fn on_resize(&self, size: ContainerSize) -> u32 {
        if self.is_closed() {
            return self.content_height();
        }
        let toolbar = size
            .toolbar_height
            .unwrap_or(self.shared.config.toolbar_height);
        let height = size
            .height
            .saturating_sub(toolbar)
            .saturating_sub(CONTENT_MARGIN);
        self.shared.content_height.set(height);
        height
    }

    /// Host showed the container.
    pub fn on_shown(&self, size: ContainerSize) -> u32 {
        self.on_resize(size)
    }

    /// Host is destroying the container. The container is not asked to
    /// close again.
    pub fn on_destroy(&self) {
        self.shared.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::MemoryContainer;
    use crate::model::OutputLine;

    fn open(session: &Session, compiler: u32) -> (OutputPane, Rc<MemoryContainer>) {
        let container = Rc::new(MemoryContainer::new());
        let pane = OutputPane::new(
            session,
            container.clone(),
            PaneViewState::new(CompilerId(compiler), EditorId(1)),
            PaneConfig::default(),
        );
        (pane, container)
    }

    #[test]
    fn construction_persists_and_titles() {
        let session = Session::new();
        let (pane, container) = open(&session, 4);
        assert_eq!(pane.lifecycle(), PaneLifecycle::Active);
        assert_eq!(container.title().as_deref(), Some("#4"));
        assert_eq!(
            container.state(),
            Some(PaneViewState::new(CompilerId(4), EditorId(1)))
        );
        assert_eq!(pane.wrap_label(), "[OFF] Wrap lines");
    }

    #[test]
    fn construction_announces_output() {
        let session = Session::new();
        let observer = session.handle();
        let opened = Rc::new(Cell::new(None));
        let o = Rc::clone(&opened);
        observer.subscribe(EventKind::OutputOpened, move |ev| o.set(ev.compiler()));
        let _pane = open(&session, 8);
        assert_eq!(opened.get(), Some(CompilerId(8)));
    }

    #[test]
    fn wrap_toggle_updates_label_and_state() {
        let session = Session::new();
        let (pane, container) = open(&session, 1);
        pane.toggles().toggle_wrap();
        assert_eq!(pane.wrap_label(), "[ON] Wrap lines");
        assert!(pane.layout().wrap);
        assert!(container.state().is_some_and(|s| s.wrap));
    }

    #[test]
    fn font_scale_change_persists() {
        let session = Session::new();
        let (pane, container) = open(&session, 1);
        pane.font_scale().increase();
        assert_eq!(
            container.state().map(|s| s.font_scale),
            Some(FontScale::DEFAULT + 1.0)
        );
    }

    #[test]
    fn resize_subtracts_toolbar_and_margin() {
        let session = Session::new();
        let (pane, _container) = open(&session, 1);
        assert_eq!(pane.on_resize(ContainerSize::new(100, 200).with_toolbar(30)), 165);
        assert_eq!(pane.on_shown(ContainerSize::new(100, 3)), 0);
        assert_eq!(pane.content_height(), 0);
    }

    #[test]
    fn destroy_does_not_close_container() {
        let session = Session::new();
        let (pane, container) = open(&session, 1);
        pane.on_destroy();
        pane.on_destroy();
        session.run_pending();
        assert!(pane.is_closed());
        assert_eq!(container.close_calls(), 0);
        assert_eq!(session.hub().subscriber_count(EventKind::CompileResult), 0);
    }

    #[test]
    fn closed_pane_ignores_clicks() {
        let session = Session::new();
        let (pane, _container) = open(&session, 1);
        session.emit(PaneEvent::CompileResult {
            compiler: CompilerId(1),
            meta: None,
            result: Rc::new(ResultModel {
                stderr: vec![OutputLine::at_line("e", 2)],
                ..ResultModel::default()
            }),
        });
        assert_eq!(pane.hover_line(0), LinkResponse::Handled);
        pane.on_destroy();
        assert_eq!(pane.activate_line(0), LinkResponse::Ignored);
    }
}
