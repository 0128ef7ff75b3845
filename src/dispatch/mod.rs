//! Operation dispatch.
//!
//! Every entry point funnels through [`Dispatcher::execute`]: look the
//! operation up, validate the option object against its schema, check the
//! receiver and operand shapes, then hand the prepared [`Job`] to a
//! [`Completion`] strategy. All argument and shape failures therefore surface
//! synchronously, in both blocking and non-blocking mode; native failures
//! surface wherever the strategy delivers the outcome.
mod completion;
pub mod ops;
mod pending;
mod registry;
mod surface;

pub use self::completion::{Blocking, Completion, Deferred, Job};
pub use self::ops::Operation;
pub use self::pending::{HostLoop, Outcome, PendingOperation};
pub use self::registry::OperationRegistry;

use crate::config::BindingConfig;
use crate::error::BindingError;
use crate::host::HostValue;
use crate::marshal;
use crate::mat::Mat;
use log::{debug, info};
use once_cell::sync::OnceCell;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::Arc;

static GLOBAL: OnceCell<Dispatcher> = OnceCell::new();

pub struct Dispatcher {
    registry: OperationRegistry,
    pool: Arc<ThreadPool>,
    config: BindingConfig,
}

impl Dispatcher {
    pub fn new(config: &BindingConfig) -> Result<Self, BindingError> {
        Self::with_registry(config, OperationRegistry::with_defaults())
    }

    pub fn with_registry(
        config: &BindingConfig,
        registry: OperationRegistry,
    ) -> Result<Self, BindingError> {
        let prefix = config.thread_name_prefix.clone();
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.worker_threads.unwrap_or(0))
            .thread_name(move |i| format!("{prefix}-{i}"))
            .build()
            .map_err(|e| {
                BindingError::NativeComputation(format!("failed to start worker pool: {e}"))
            })?;
        info!(
            "Dispatcher::new {} worker thread(s), operations: {}",
            pool.current_num_threads(),
            registry.names().join(", ")
        );
        Ok(Self {
            registry,
            pool: Arc::new(pool),
            config: config.clone(),
        })
    }

    /// Process-wide dispatcher, created with the default configuration on
    /// first use unless [`install`](Self::install) ran earlier.
    pub fn global() -> Result<&'static Dispatcher, BindingError> {
        GLOBAL.get_or_try_init(|| Dispatcher::new(&BindingConfig::default()))
    }

    /// Sets up the process-wide dispatcher. Fails once it exists.
    pub fn install(config: &BindingConfig) -> Result<&'static Dispatcher, BindingError> {
        let mut created = false;
        let dispatcher = GLOBAL.get_or_try_init(|| {
            created = true;
            Dispatcher::new(config)
        })?;
        if !created {
            return Err(BindingError::invalid_argument(
                "config",
                "uninitialised dispatcher",
                "the default dispatcher is already initialised",
            ));
        }
        Ok(dispatcher)
    }

    pub fn config(&self) -> &BindingConfig {
        &self.config
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    pub fn worker_threads(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Validation, receiver and shape checks. Never calls native code.
    fn prepare(&self, name: &str, receiver: &Mat, args: &[HostValue]) -> Result<Job, BindingError> {
        let op = self.registry.get(name)?;
        let args = marshal::validate(op.schema(), args)?;
        if receiver.is_released() {
            return Err(BindingError::invalid_argument(
                "this",
                "live Mat",
                "Mat has been released",
            ));
        }
        let header = receiver.header();
        if header.is_empty() {
            return Err(BindingError::invalid_argument(
                "this",
                "non-empty Mat",
                format!("{}: Mat is empty", op.name()),
            ));
        }
        op.check(&header, &args)?;
        Ok(Job {
            op: Arc::clone(op),
            source: receiver.share(),
            args,
            log_timings: self.config.log_timings,
        })
    }

    pub fn execute<C: Completion>(
        &self,
        name: &str,
        receiver: &Mat,
        args: &[HostValue],
        completion: C,
    ) -> Result<C::Output, BindingError> {
        let job = self.prepare(name, receiver, args).map_err(|err| {
            debug!("{name}: rejected before native call: {err}");
            err
        })?;
        Ok(completion.complete(job))
    }

    /// Blocking call: the result, or the first failure.
    pub fn call(
        &self,
        name: &str,
        receiver: &Mat,
        args: &[HostValue],
    ) -> Result<Mat, BindingError> {
        self.execute(name, receiver, args, Blocking)?
    }

    /// Non-blocking call. Argument and shape errors are returned here; native
    /// failures arrive through the [`PendingOperation`].
    pub fn call_async(
        &self,
        name: &str,
        receiver: &Mat,
        args: &[HostValue],
    ) -> Result<PendingOperation, BindingError> {
        self.execute(
            name,
            receiver,
            args,
            Deferred {
                pool: Arc::clone(&self.pool),
            },
        )
    }
}
