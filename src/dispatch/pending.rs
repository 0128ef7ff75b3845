//! Outcome delivery for non-blocking operations.
//!
//! A worker fills a [`Completer`]; the caller observes the matching
//! [`PendingOperation`]. Continuations registered with
//! [`PendingOperation::then`] are posted to a [`HostLoop`] and only run when
//! the thread owning that loop drains it.
use crate::error::BindingError;
use crate::mat::Mat;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use log::debug;
use parking_lot::{Condvar, Mutex};
use std::marker::PhantomData;
use std::mem;
use std::sync::Arc;
use std::time::Duration;

pub type Outcome = Result<Mat, BindingError>;

type Task = Box<dyn FnOnce() + Send + 'static>;
type Continuation = Box<dyn FnOnce(Outcome) + Send + 'static>;

/// Single-threaded queue of host callbacks.
///
/// The loop is neither `Send` nor `Sync`: callbacks run on the thread that
/// created it, one at a time.
pub struct HostLoop {
    tx: Sender<Task>,
    rx: Receiver<Task>,
    _local: PhantomData<*const ()>,
}

impl HostLoop {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            tx,
            rx,
            _local: PhantomData,
        }
    }

    fn poster(&self) -> Sender<Task> {
        self.tx.clone()
    }

    /// Number of callbacks waiting to run.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Runs one queued callback, if any.
    pub fn run_one(&self) -> bool {
        match self.rx.try_recv() {
            Ok(task) => {
                task();
                true
            }
            Err(_) => false,
        }
    }

    /// Drains the queue, including callbacks queued while draining.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.run_one() {
            ran += 1;
        }
        ran
    }

    /// Waits up to `timeout` for a callback and runs it.
    pub fn run_next_blocking(&self, timeout: Duration) -> bool {
        match self.rx.recv_timeout(timeout) {
            Ok(task) => {
                task();
                true
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => false,
        }
    }
}

impl Default for HostLoop {
    fn default() -> Self {
        Self::new()
    }
}

enum SlotState {
    Pending(Option<Continuation>),
    Ready(Outcome),
    Taken,
}

struct Slot {
    state: Mutex<SlotState>,
    ready: Condvar,
}

/// Handle to an operation running on the worker pool. Delivers exactly one
/// outcome, either by [`wait`](Self::wait)/[`try_take`](Self::try_take) or
/// to a continuation.
pub struct PendingOperation {
    operation: &'static str,
    slot: Arc<Slot>,
}

impl PendingOperation {
    pub(crate) fn new(operation: &'static str) -> (Self, Completer) {
        let slot = Arc::new(Slot {
            state: Mutex::new(SlotState::Pending(None)),
            ready: Condvar::new(),
        });
        let completer = Completer {
            operation,
            slot: Some(Arc::clone(&slot)),
        };
        (Self { operation, slot }, completer)
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn is_complete(&self) -> bool {
        matches!(*self.slot.state.lock(), SlotState::Ready(_))
    }

    /// Blocks until the outcome is available.
    pub fn wait(self) -> Outcome {
        let mut state = self.slot.state.lock();
        while matches!(*state, SlotState::Pending(_)) {
            self.slot.ready.wait(&mut state);
        }
        take_ready(&mut state)
    }

    /// The outcome if already available, otherwise the handle back.
    pub fn try_take(self) -> Result<Outcome, PendingOperation> {
        let mut state = self.slot.state.lock();
        if matches!(*state, SlotState::Ready(_)) {
            Ok(take_ready(&mut state))
        } else {
            drop(state);
            Err(self)
        }
    }

    /// Registers `continuation` to run on `host` with the outcome. If the
    /// outcome is already known it is posted immediately.
    pub fn then<F>(self, host: &HostLoop, continuation: F)
    where
        F: FnOnce(Outcome) + Send + 'static,
    {
        let poster = host.poster();
        let post: Continuation = Box::new(move |outcome| {
            let task: Task = Box::new(move || continuation(outcome));
            if poster.send(task).is_err() {
                debug!("host loop closed; continuation dropped");
            }
        });
        let mut state = self.slot.state.lock();
        match mem::replace(&mut *state, SlotState::Taken) {
            SlotState::Ready(outcome) => {
                drop(state);
                post(outcome);
            }
            SlotState::Pending(_) => *state = SlotState::Pending(Some(post)),
            SlotState::Taken => {}
        }
    }
}

fn take_ready(state: &mut SlotState) -> Outcome {
    match mem::replace(state, SlotState::Taken) {
        SlotState::Ready(outcome) => outcome,
        _ => Err(BindingError::NativeComputation(
            "operation outcome already taken".to_string(),
        )),
    }
}

impl std::fmt::Debug for PendingOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingOperation")
            .field("operation", &self.operation)
            .field("complete", &self.is_complete())
            .finish()
    }
}

/// Worker side of a [`PendingOperation`].
///
/// Dropping an unfulfilled completer delivers a `NativeComputation` error so
/// that a waiting caller is never left hanging.
pub(crate) struct Completer {
    operation: &'static str,
    slot: Option<Arc<Slot>>,
}

impl Completer {
    pub(crate) fn fulfil(mut self, outcome: Outcome) {
        if let Some(slot) = self.slot.take() {
            deliver(&slot, outcome);
        }
    }
}

impl Drop for Completer {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.take() {
            debug!("{}: completer dropped without an outcome", self.operation);
            deliver(
                &slot,
                Err(BindingError::NativeComputation(format!(
                    "{}: operation dropped without completing",
                    self.operation
                ))),
            );
        }
    }
}

fn deliver(slot: &Slot, outcome: Outcome) {
    let mut state = slot.state.lock();
    match mem::replace(&mut *state, SlotState::Taken) {
        SlotState::Pending(Some(continuation)) => {
            drop(state);
            continuation(outcome);
        }
        SlotState::Pending(None) => {
            *state = SlotState::Ready(outcome);
            slot.ready.notify_all();
        }
        other => *state = other,
    }
}
