#![forbid(unsafe_code)]

//! Per-session plumbing shared by every view.

use outpane_hub::{EventHub, HubHandle, TickQueue};

use crate::event::PaneEvent;

/// The bus and deferred-work queue of one top-level session.
///
/// Cloning shares both. The host calls [`Session::run_pending`] once the
/// current broadcast has unwound (for example at the end of each input
/// event) to perform work views deferred to the next tick.
#[derive(Debug, Clone, Default)]
pub struct Session {
    hub: EventHub<PaneEvent>,
    ticks: TickQueue,
}

impl Session {
    /// A fresh session with no views.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The session bus.
    #[must_use]
    pub fn hub(&self) -> &EventHub<PaneEvent> {
        &self.hub
    }

    /// The deferred-work queue.
    #[must_use]
    pub fn ticks(&self) -> &TickQueue {
        &self.ticks
    }

    /// A new hub handle for a view.
    #[must_use]
    pub fn handle(&self) -> HubHandle<PaneEvent> {
        self.hub.handle()
    }

    /// Emit on the session bus without a handle (host-originated events).
    pub fn emit(&self, event: PaneEvent) -> usize {
        self.hub.emit(event)
    }

    /// Run work deferred to this tick. Returns the number of tasks run.
    pub fn run_pending(&self) -> usize {
        self.ticks.run_pending()
    }
}
