//! Containment for tasks that break their no-panic contract.

use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

/// What the worker does when a task breaks its no-panic contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanicStrategy {
    /// A panicking task is a programming error; abort the process.
    #[default]
    Abort,
    /// Swallow the panic and keep the worker running.
    Isolate,
    /// Like `Isolate`, with an `error` event carrying the panic message.
    LogAndContinue,
}

/// Runs task hooks on the worker, applying a [`PanicStrategy`] to escapes.
#[derive(Debug)]
pub struct PanicHandler {
    strategy: PanicStrategy,
    caught: AtomicUsize,
}

impl PanicHandler {
    pub fn new(strategy: PanicStrategy) -> Self {
        Self {
            strategy,
            caught: AtomicUsize::new(0),
        }
    }

    /// Calls `f`. Under `Abort` a panic never returns; otherwise it is
    /// reported as `Err`.
    pub fn execute<F, R>(&self, f: F) -> Result<R, PanicInfo>
    where
        F: FnOnce() -> R,
    {
        let payload = match catch_unwind(AssertUnwindSafe(f)) {
            Ok(value) => return Ok(value),
            Err(payload) => payload,
        };

        self.caught.fetch_add(1, Ordering::Relaxed);
        let info = PanicInfo::from_payload(payload);

        match self.strategy {
            PanicStrategy::Abort => {
                tracing::error!(message = %info, "task panicked, aborting");
                std::process::abort();
            }
            PanicStrategy::LogAndContinue => tracing::error!(message = %info, "task panicked"),
            PanicStrategy::Isolate => {}
        }

        Err(info)
    }

    /// Panics caught so far.
    pub fn panic_count(&self) -> usize {
        self.caught.load(Ordering::Relaxed)
    }
}

impl Default for PanicHandler {
    fn default() -> Self {
        Self::new(PanicStrategy::default())
    }
}

#[derive(Debug, Clone)]
pub struct PanicInfo {
    pub message: String,
}

impl PanicInfo {
    pub(crate) fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = match payload.downcast::<String>() {
            Ok(s) => *s,
            Err(payload) => payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "non-string panic payload".to_string()),
        };

        Self { message }
    }
}

impl fmt::Display for PanicInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
