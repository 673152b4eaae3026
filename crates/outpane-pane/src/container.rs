#![forbid(unsafe_code)]

//! Host layout container seam.
//!
//! The pane never sees the host layout engine; it talks to the slot it
//! lives in through [`PaneContainer`]. Methods take `&self` because the
//! container is shared with work deferred to the next tick.

use std::cell::{Cell, RefCell};

use crate::state::PaneViewState;

/// The host slot a pane is mounted in.
pub trait PaneContainer {
    /// Persist the pane's state snapshot.
    fn set_state(&self, state: &PaneViewState);
    /// Update the visible tab title.
    fn set_title(&self, title: &str);
    /// Remove the slot from the layout.
    fn close(&self);
}

/// Dimensions reported by the host on resize or show.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerSize {
    pub width: u32,
    pub height: u32,
    /// Height of the options toolbar, when the host measures it.
    pub toolbar_height: Option<u32>,
}

impl ContainerSize {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            toolbar_height: None,
        }
    }

    #[must_use]
    pub const fn with_toolbar(mut self, toolbar_height: u32) -> Self {
        self.toolbar_height = Some(toolbar_height);
        self
    }
}

/// In-memory container that records every call.
///
/// Used by headless hosts and tests.
#[derive(Debug, Default)]
pub struct MemoryContainer {
    states: RefCell<Vec<PaneViewState>>,
    titles: RefCell<Vec<String>>,
    close_calls: Cell<usize>,
}

impl MemoryContainer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently persisted state.
    #[must_use]
    pub fn state(&self) -> Option<PaneViewState> {
        self.states.borrow().last().cloned()
    }

    /// Every persisted state, oldest first.
    #[must_use]
    pub fn states(&self) -> Vec<PaneViewState> {
        self.states.borrow().clone()
    }

    /// Current title.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        self.titles.borrow().last().cloned()
    }

    /// Every title set, oldest first.
    #[must_use]
    pub fn titles(&self) -> Vec<String> {
        self.titles.borrow().clone()
    }

    #[must_use]
    pub fn close_calls(&self) -> usize {
        self.close_calls.get()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.close_calls.get() > 0
    }
}

impl PaneContainer for MemoryContainer {
    fn set_state(&self, state: &PaneViewState) {
        self.states.borrow_mut().push(state.clone());
    }

    fn set_title(&self, title: &str) {
        self.titles.borrow_mut().push(title.to_string());
    }

    fn close(&self) {
        self.close_calls.set(self.close_calls.get() + 1);
    }
}
