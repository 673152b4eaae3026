#![forbid(unsafe_code)]

//! Producer side of the pane protocol.
//!
//! A [`CompilerPublisher`] stands in for a compiler view: it broadcasts
//! outcomes, replays the latest one to output panes that open late, and
//! announces its own teardown.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use outpane_hub::HubHandle;
use tracing::debug;

use crate::event::{EventKind, PaneEvent};
use crate::model::{CompilerId, CompilerMeta, ResultModel};
use crate::session::Session;

type Outcome = (Option<CompilerMeta>, Rc<ResultModel>);

struct PublisherShared {
    id: CompilerId,
    handle: HubHandle<PaneEvent>,
    latest: RefCell<Option<Outcome>>,
    outputs: Cell<usize>,
    closed: Cell<bool>,
}

impl PublisherShared {
    fn emit_latest(&self) -> usize {
        let latest = self.latest.borrow().clone();
        match latest {
            Some((meta, result)) => self.handle.emit(PaneEvent::CompileResult {
                compiler: self.id,
                meta,
                result,
            }),
            None => 0,
        }
    }
}

/// Publishes compile results for one compiler id.
pub struct CompilerPublisher {
    shared: Rc<PublisherShared>,
}

impl std::fmt::Debug for CompilerPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilerPublisher")
            .field("id", &self.shared.id)
            .field("outputs", &self.shared.outputs.get())
            .field("closed", &self.shared.closed.get())
            .finish_non_exhaustive()
    }
}

impl CompilerPublisher {
    pub fn new(session: &Session, id: CompilerId) -> Self {
        let shared = Rc::new(PublisherShared {
            id,
            handle: session.handle(),
            latest: RefCell::new(None),
            outputs: Cell::new(0),
            closed: Cell::new(false),
        });

        let weak: Weak<PublisherShared> = Rc::downgrade(&shared);
        shared.handle.subscribe(EventKind::OutputOpened, move |event| {
            let Some(publisher) = weak.upgrade() else { return };
            if event.compiler() != Some(publisher.id) {
                return;
            }
            publisher.outputs.set(publisher.outputs.get() + 1);
            publisher.emit_latest();
        });

        let weak: Weak<PublisherShared> = Rc::downgrade(&shared);
        shared.handle.subscribe(EventKind::OutputClosed, move |event| {
            let Some(publisher) = weak.upgrade() else { return };
            if event.compiler() != Some(publisher.id) {
                return;
            }
            publisher
                .outputs
                .set(publisher.outputs.get().saturating_sub(1));
        });

        Self { shared }
    }

    #[must_use]
    pub fn id(&self) -> CompilerId {
        self.shared.id
    }

    /// Output panes currently attached to this compiler.
    #[must_use]
    pub fn outputs(&self) -> usize {
        self.shared.outputs.get()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.shared.closed.get()
    }

    /// Latest published result.
    #[must_use]
    pub fn latest(&self) -> Option<Rc<ResultModel>> {
        self.shared
            .latest
            .borrow()
            .as_ref()
            .map(|(_, result)| Rc::clone(result))
    }

    /// Remember and broadcast a new outcome. Returns the handlers reached.
    pub fn publish(&self, meta: Option<CompilerMeta>, result: ResultModel) -> usize {
        if self.is_closed() {
            return 0;
        }
        let result = Rc::new(result);
        debug!(compiler = %self.shared.id, code = result.code, "publishing result");
        *self.shared.latest.borrow_mut() = Some((meta, result));
        self.shared.emit_latest()
    }

    /// Announce teardown and stop listening. Idempotent.
    pub fn close(&self) {
        if self.shared.closed.replace(true) {
            return;
        }
        let compiler = self.shared.id;
        debug!(%compiler, "compiler closing");
        self.shared.handle.emit(PaneEvent::CompilerClose { compiler });
        self.shared.handle.unsubscribe_all();
    }
}
