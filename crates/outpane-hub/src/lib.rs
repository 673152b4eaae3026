#![forbid(unsafe_code)]

//! Event plumbing for outpane.
//!
//! Views in a multi-pane session never hold references to each other. They
//! talk through an [`EventHub`]: every view owns one [`HubHandle`], emits
//! typed events through it, and subscribes to the event kinds it cares
//! about. Dropping or clearing the handle releases everything the view
//! registered in one step.
//!
//! # Key Components
//!
//! - [`EventHub`] - one logical bus per session
//! - [`HubHandle`] - per-view subscription scope
//! - [`BusEvent`] - trait tying an event value to its routing kind
//! - [`TickQueue`] - work deferred until after the current broadcast
//! - [`Observable`] - a value that notifies subscribers when it changes
//!
//! Everything here is single-threaded (`Rc`/`RefCell`); handlers run to
//! completion inside the emitting call.

pub mod hub;
pub mod observable;
pub mod tick;

pub use hub::{BusEvent, EventHub, HandleId, HubHandle};
pub use observable::{Observable, ObserverGuard};
pub use tick::TickQueue;
