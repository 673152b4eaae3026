#![forbid(unsafe_code)]

//! Work deferred to the next scheduling tick.
//!
//! Some reactions must not happen inside the broadcast that triggered them.
//! The usual case is a view asking its host to remove it while the host is
//! still walking the collection that broadcast the request. Such work goes
//! on a [`TickQueue`]; the host drains the queue once the broadcast has
//! unwound.
//!
//! # Usage
//!
//! ```
//! use outpane_hub::TickQueue;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let queue = TickQueue::new();
//! let ran = Rc::new(Cell::new(false));
//! let flag = Rc::clone(&ran);
//! queue.defer(move || flag.set(true));
//! assert!(!ran.get());
//! assert_eq!(queue.run_pending(), 1);
//! assert!(ran.get());
//! ```
//!
//! # Invariants
//!
//! 1. `defer` never runs the task synchronously.
//! 2. `run_pending` runs tasks in the order they were deferred.
//! 3. Tasks deferred while draining run in the same drain, after the
//!    tasks that were already queued.
//!
//! # Failure Modes
//!
//! - **Task panics**: remaining tasks still run. The first panic is
//!   re-raised after the queue is empty.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use web_time::Instant;

type Task = Box<dyn FnOnce()>;

/// Shared FIFO of deferred tasks. Clones refer to the same queue.
#[derive(Clone, Default)]
pub struct TickQueue {
    tasks: Rc<RefCell<VecDeque<Task>>>,
}

impl fmt::Debug for TickQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TickQueue")
            .field("pending", &self.pending())
            .finish()
    }
}

impl TickQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` for the next drain.
    pub fn defer(&self, task: impl FnOnce() + 'static) {
        self.tasks.borrow_mut().push_back(Box::new(task));
    }

    /// Number of queued tasks.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Run every queued task, including ones queued while draining.
    ///
    /// Returns the number of tasks run.
    pub fn run_pending(&self) -> usize {
        let started = Instant::now();
        let mut ran = 0usize;
        let mut first_panic: Option<Box<dyn std::any::Any + Send>> = None;

        loop {
            // Pop with the borrow released before the task runs; tasks may defer more.
            let next = self.tasks.borrow_mut().pop_front();
            let Some(task) = next else {
                break;
            };
            let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(task));
            if let Err(payload) = result
                && first_panic.is_none()
            {
                first_panic = Some(payload);
            }
            ran += 1;
        }

        if ran > 0 {
            tracing::trace!(
                ran,
                duration_us = started.elapsed().as_micros() as u64,
                "tick queue drained"
            );
        }

        if let Some(payload) = first_panic {
            std::panic::resume_unwind(payload);
        }
        ran
    }
}
