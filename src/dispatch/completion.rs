//! Completion strategies: how a prepared job is run and its outcome handed
//! back.
use super::ops::Operation;
use super::pending::{Outcome, PendingOperation};
use crate::error::{guard_native, panic_message, BindingError};
use crate::marshal::MarshalledArgs;
use crate::mat::Mat;
use log::{log, Level};
use rayon::ThreadPool;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

/// A validated call, ready for the native routine.
pub struct Job {
    pub(crate) op: Arc<dyn Operation>,
    pub(crate) source: Mat,
    pub(crate) args: MarshalledArgs,
    pub(crate) log_timings: bool,
}

impl Job {
    pub fn operation(&self) -> &'static str {
        self.op.name()
    }

    /// Runs the native routine over the receiver, on the calling thread.
    pub fn run(self, mode: &str) -> Outcome {
        let start = Instant::now();
        let name = self.op.name();
        let header = self.source.header();
        let image = self
            .source
            .with_view(|view| guard_native(name, || self.op.run(&view, &self.args)))??;
        let out = Mat::from_native(image);
        let level = if self.log_timings {
            Level::Info
        } else {
            Level::Debug
        };
        log!(
            level,
            "{name} [{mode}] {}x{} {} -> {}x{} {} in {:.3} ms",
            header.rows,
            header.cols,
            header.mat_type,
            out.rows(),
            out.cols(),
            out.mat_type(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(out)
    }
}

pub trait Completion {
    type Output;

    fn complete(self, job: Job) -> Self::Output;
}

/// Runs inline and returns the result or failure synchronously.
pub struct Blocking;

impl Completion for Blocking {
    type Output = Outcome;

    fn complete(self, job: Job) -> Outcome {
        job.run("sync")
    }
}

/// Spawns onto the worker pool; the outcome arrives through a
/// [`PendingOperation`].
pub struct Deferred {
    pub(crate) pool: Arc<ThreadPool>,
}

impl Completion for Deferred {
    type Output = PendingOperation;

    fn complete(self, job: Job) -> PendingOperation {
        let name = job.operation();
        let (pending, completer) = PendingOperation::new(name);
        self.pool.spawn(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| job.run("async")))
                .unwrap_or_else(|payload| {
                    Err(BindingError::NativeComputation(format!(
                        "{name}: panicked: {}",
                        panic_message(payload.as_ref())
                    )))
                });
            completer.fulfil(outcome);
        });
        pending
    }
}
