#![forbid(unsafe_code)]

//! Typed publish/subscribe bus scoped to one session.
//!
//! # Design
//!
//! An [`EventHub`] owns the subscription table for one logical bus. Views
//! never register on the hub directly: each view asks for a [`HubHandle`]
//! and subscribes through it. The handle keeps the strong reference to
//! every callback it registered while the hub only stores `Weak` entries,
//! so releasing a handle (explicitly or by dropping it) makes all of its
//! callbacks unreachable at once.
//!
//! # Invariants
//!
//! 1. `emit` invokes every handler subscribed to the event's kind at the
//!    moment the broadcast starts, in registration order.
//! 2. No internal borrow is held while a handler runs; handlers may emit,
//!    subscribe, or release handles re-entrantly.
//! 3. A handler whose handle is released mid-broadcast is not invoked for
//!    the rest of that broadcast.
//! 4. Handlers registered mid-broadcast only see later broadcasts.
//! 5. A handle only ever removes its own registrations.
//!
//! # Failure Modes
//!
//! - **No subscribers**: `emit` returns 0; not an error.
//! - **Handler panic**: propagates to the emitter. The table is not
//!   borrowed at that point so the hub stays usable.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

/// An event that can travel on an [`EventHub`].
///
/// The kind is what subscribers select on; the event value itself carries
/// the positional payload.
pub trait BusEvent: 'static {
    /// Discriminant used for routing.
    type Kind: Copy + Eq + fmt::Debug + 'static;

    /// Routing kind of this event.
    fn kind(&self) -> Self::Kind;
}

type Handler<E> = Rc<dyn Fn(&E)>;
type WeakHandler<E> = Weak<dyn Fn(&E)>;

/// Identifier of a [`HubHandle`] within its hub. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(u64);

impl HandleId {
    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

struct Registration<E: BusEvent> {
    owner: HandleId,
    kind: E::Kind,
    handler: WeakHandler<E>,
}

struct HubInner<E: BusEvent> {
    next_handle: u64,
    registrations: Vec<Registration<E>>,
}

/// Shared bus for one session.
///
/// Cloning creates another reference to the **same** bus.
pub struct EventHub<E: BusEvent> {
    inner: Rc<RefCell<HubInner<E>>>,
    emitting: Rc<Cell<u32>>,
}

impl<E: BusEvent> Clone for EventHub<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
            emitting: Rc::clone(&self.emitting),
        }
    }
}

impl<E: BusEvent> Default for EventHub<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: BusEvent> fmt::Debug for EventHub<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("EventHub")
            .field("handles_created", &inner.next_handle)
            .field("registrations", &inner.registrations.len())
            .field("emit_depth", &self.emitting.get())
            .finish()
    }
}

impl<E: BusEvent> EventHub<E> {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(HubInner {
                next_handle: 0,
                registrations: Vec::new(),
            })),
            emitting: Rc::new(Cell::new(0)),
        }
    }

    /// Create a new handle into this bus with an empty subscription set.
    #[must_use]
    pub fn handle(&self) -> HubHandle<E> {
        let id = {
            let mut inner = self.inner.borrow_mut();
            inner.next_handle += 1;
            HandleId(inner.next_handle)
        };
        HubHandle {
            hub: self.clone(),
            id,
            handlers: RefCell::new(Vec::new()),
        }
    }

    /// Deliver `event` to every live handler subscribed to its kind.
    ///
    /// Returns the number of handlers invoked.
    pub fn emit(&self, event: E) -> usize {
        let kind = event.kind();
        let targets: Vec<WeakHandler<E>> = {
            let mut inner = self.inner.borrow_mut();
            inner.registrations.retain(|r| r.handler.strong_count() > 0);
            inner
                .registrations
                .iter()
                .filter(|r| r.kind == kind)
                .map(|r| Weak::clone(&r.handler))
                .collect()
        };

        let span = tracing::trace_span!(
            "outpane.emit",
            kind = ?kind,
            depth = self.emitting.get(),
            delivered = tracing::field::Empty
        );
        let _guard = span.enter();

        let _depth = EmitDepth::enter(&self.emitting);
        let mut delivered = 0usize;
        for weak in targets {
            // Upgrade at call time so handlers released by an earlier
            // handler in this same broadcast are skipped.
            let Some(handler) = weak.upgrade() else {
                continue;
            };
            handler(&event);
            delivered += 1;
        }

        span.record("delivered", delivered);
        delivered
    }

    /// True while at least one broadcast is on the call stack.
    #[must_use]
    pub fn is_emitting(&self) -> bool {
        self.emitting.get() > 0
    }

    /// Number of live handlers subscribed to `kind` across all handles.
    #[must_use]
    pub fn subscriber_count(&self, kind: E::Kind) -> usize {
        self.inner
            .borrow()
            .registrations
            .iter()
            .filter(|r| r.kind == kind && r.handler.strong_count() > 0)
            .count()
    }

    fn release(&self, owner: HandleId) {
        self.inner
            .borrow_mut()
            .registrations
            .retain(|r| r.owner != owner);
    }
}

/// Tracks broadcast nesting; unwinds correctly if a handler panics.
struct EmitDepth<'a>(&'a Cell<u32>);

impl<'a> EmitDepth<'a> {
    fn enter(depth: &'a Cell<u32>) -> Self {
        depth.set(depth.get() + 1);
        Self(depth)
    }
}

impl Drop for EmitDepth<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}

/// A view's scoped access to an [`EventHub`].
///
/// Every subscription made through a handle belongs to it. Calling
/// [`HubHandle::unsubscribe_all`] or dropping the handle releases them all.
pub struct HubHandle<E: BusEvent> {
    hub: EventHub<E>,
    id: HandleId,
    handlers: RefCell<Vec<Handler<E>>>,
}

impl<E: BusEvent> fmt::Debug for HubHandle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HubHandle")
            .field("id", &self.id)
            .field("subscriptions", &self.subscription_count())
            .finish()
    }
}

impl<E: BusEvent> HubHandle<E> {
    /// Identifier of this handle.
    #[must_use]
    pub const fn id(&self) -> HandleId {
        self.id
    }

    /// The bus this handle belongs to.
    #[must_use]
    pub fn hub(&self) -> &EventHub<E> {
        &self.hub
    }

    /// Register `handler` for events of `kind`.
    pub fn subscribe(&self, kind: E::Kind, handler: impl Fn(&E) + 'static) {
        let strong: Handler<E> = Rc::new(handler);
        self.hub.inner.borrow_mut().registrations.push(Registration {
            owner: self.id,
            kind,
            handler: Rc::downgrade(&strong),
        });
        self.handlers.borrow_mut().push(strong);
    }

    /// Emit on the bus this handle belongs to.
    pub fn emit(&self, event: E) -> usize {
        self.hub.emit(event)
    }

    /// Release every subscription registered through this handle.
    ///
    /// Idempotent. Returns how many subscriptions were released.
    pub fn unsubscribe_all(&self) -> usize {
        let released = std::mem::take(&mut *self.handlers.borrow_mut());
        let count = released.len();
        self.hub.release(self.id);
        // Callbacks may own arbitrary state; drop them with no borrows held.
        drop(released);
        if count > 0 {
            tracing::trace!(handle = self.id.get(), released = count, "hub handle released");
        }
        count
    }

    /// Number of subscriptions currently held by this handle.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.handlers.borrow().len()
    }

    /// Whether this handle still holds at least one subscription.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.subscription_count() > 0
    }
}

impl<E: BusEvent> Drop for HubHandle<E> {
    fn drop(&mut self) {
        self.unsubscribe_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq)]
    enum Ev {
        Ping(u32),
        Pong(u32),
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum EvKind {
        Ping,
        Pong,
    }

    impl BusEvent for Ev {
        type Kind = EvKind;

        fn kind(&self) -> EvKind {
            match self {
                Self::Ping(_) => EvKind::Ping,
                Self::Pong(_) => EvKind::Pong,
            }
        }
    }

    fn recorder() -> (Rc<RefCell<Vec<String>>>, impl Fn(&str) -> Box<dyn Fn(&Ev)>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let log2 = Rc::clone(&log);
        let make = move |tag: &str| -> Box<dyn Fn(&Ev)> {
            let log = Rc::clone(&log2);
            let tag = tag.to_string();
            Box::new(move |ev: &Ev| log.borrow_mut().push(format!("{tag}:{ev:?}")))
        };
        (log, make)
    }

    #[test]
    fn emit_without_subscribers_is_noop() {
        let hub: EventHub<Ev> = EventHub::new();
        assert_eq!(hub.emit(Ev::Ping(1)), 0);
    }

    #[test]
    fn emit_reaches_all_handles_in_registration_order() {
        let hub: EventHub<Ev> = EventHub::new();
        let (log, make) = recorder();
        let a = hub.handle();
        let b = hub.handle();
        let fa = make("a");
        let fb = make("b");
        let fa2 = make("a2");
        a.subscribe(EvKind::Ping, move |e| fa(e));
        b.subscribe(EvKind::Ping, move |e| fb(e));
        a.subscribe(EvKind::Ping, move |e| fa2(e));

        assert_eq!(b.emit(Ev::Ping(7)), 3);
        assert_eq!(
            *log.borrow(),
            vec!["a:Ping(7)", "b:Ping(7)", "a2:Ping(7)"]
        );
    }

    #[test]
    fn kinds_are_routed_separately() {
        let hub: EventHub<Ev> = EventHub::new();
        let (log, make) = recorder();
        let h = hub.handle();
        let f = make("pong");
        h.subscribe(EvKind::Pong, move |e| f(e));

        assert_eq!(hub.emit(Ev::Ping(1)), 0);
        assert_eq!(hub.emit(Ev::Pong(2)), 1);
        assert_eq!(*log.borrow(), vec!["pong:Pong(2)"]);
    }

    #[test]
    fn unsubscribe_all_only_touches_own_handle() {
        let hub: EventHub<Ev> = EventHub::new();
        let a = hub.handle();
        let b = hub.handle();
        a.subscribe(EvKind::Ping, |_| {});
        a.subscribe(EvKind::Pong, |_| {});
        b.subscribe(EvKind::Ping, |_| {});

        assert_eq!(a.unsubscribe_all(), 2);
        assert_eq!(a.unsubscribe_all(), 0, "second release is a no-op");
        assert!(!a.is_active());
        assert!(b.is_active());
        assert_eq!(hub.subscriber_count(EvKind::Ping), 1);
        assert_eq!(hub.subscriber_count(EvKind::Pong), 0);
    }

    #[test]
    fn dropping_handle_releases_subscriptions() {
        let hub: EventHub<Ev> = EventHub::new();
        let hits = Rc::new(Cell::new(0));
        {
            let h = hub.handle();
            let hits = Rc::clone(&hits);
            h.subscribe(EvKind::Ping, move |_| hits.set(hits.get() + 1));
            hub.emit(Ev::Ping(0));
        }
        hub.emit(Ev::Ping(0));
        assert_eq!(hits.get(), 1);
        assert_eq!(hub.subscriber_count(EvKind::Ping), 0);
    }

    #[test]
    fn handler_released_mid_broadcast_is_skipped() {
        let hub: EventHub<Ev> = EventHub::new();
        let victim = Rc::new(hub.handle());
        let killer = hub.handle();
        let hits = Rc::new(Cell::new(0));

        let v = Rc::clone(&victim);
        killer.subscribe(EvKind::Ping, move |_| {
            v.unsubscribe_all();
        });
        let h = Rc::clone(&hits);
        victim.subscribe(EvKind::Ping, move |_| h.set(h.get() + 1));

        assert_eq!(hub.emit(Ev::Ping(1)), 1);
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn handler_can_release_its_own_handle_while_running() {
        let hub: EventHub<Ev> = EventHub::new();
        let handle = Rc::new(hub.handle());
        let hits = Rc::new(Cell::new(0));

        let weak = Rc::downgrade(&handle);
        let h = Rc::clone(&hits);
        handle.subscribe(EvKind::Ping, move |_| {
            h.set(h.get() + 1);
            if let Some(me) = weak.upgrade() {
                me.unsubscribe_all();
            }
        });

        hub.emit(Ev::Ping(1));
        hub.emit(Ev::Ping(2));
        assert_eq!(hits.get(), 1);
        assert!(!handle.is_active());
    }

    #[test]
    fn reentrant_emit_is_delivered_synchronously() {
        let hub: EventHub<Ev> = EventHub::new();
        let (log, make) = recorder();
        let h = hub.handle();
        let inner_hub = hub.clone();
        h.subscribe(EvKind::Ping, move |e| {
            if let Ev::Ping(n) = e {
                inner_hub.emit(Ev::Pong(*n + 1));
            }
        });
        let f = make("pong");
        h.subscribe(EvKind::Pong, move |e| f(e));

        hub.emit(Ev::Ping(1));
        assert_eq!(*log.borrow(), vec!["pong:Pong(2)"]);
        assert!(!hub.is_emitting());
    }

    #[test]
    fn subscriptions_added_mid_broadcast_wait_for_next_emit() {
        let hub: EventHub<Ev> = EventHub::new();
        let late = Rc::new(hub.handle());
        let hits = Rc::new(Cell::new(0));
        let h = hub.handle();

        let late2 = Rc::clone(&late);
        let hits2 = Rc::clone(&hits);
        h.subscribe(EvKind::Ping, move |_| {
            if !late2.is_active() {
                let hits = Rc::clone(&hits2);
                late2.subscribe(EvKind::Ping, move |_| hits.set(hits.get() + 1));
            }
        });

        hub.emit(Ev::Ping(1));
        assert_eq!(hits.get(), 0);
        hub.emit(Ev::Ping(2));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn handle_ids_are_unique() {
        let hub: EventHub<Ev> = EventHub::new();
        let a = hub.handle();
        let b = hub.handle();
        assert_ne!(a.id(), b.id());
        assert!(b.id().get() > a.id().get());
    }

    #[test]
    fn debug_format() {
        let hub: EventHub<Ev> = EventHub::new();
        let h = hub.handle();
        h.subscribe(EvKind::Ping, |_| {});
        assert!(format!("{hub:?}").contains("registrations: 1"));
        assert!(format!("{h:?}").contains("subscriptions: 1"));
    }
}
