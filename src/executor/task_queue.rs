use super::panic_handler::{PanicHandler, PanicInfo};
use super::task::{Entry, Job};
use super::worker::{Shared, WorkerState};
use crate::config::Config;
use crate::error::{EnqueueError, Error, Result, Status};
use crate::telemetry::MetricsSnapshot;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

/// A FIFO task queue drained by one dedicated background thread.
///
/// Producers hand over [`Entry`] values with [`enqueue`](TaskQueue::enqueue)
/// and return immediately. The worker runs entries in acceptance order with
/// the queue lock released, so a slow task never blocks producers or
/// [`purge`](TaskQueue::purge).
///
/// Every accepted task is either executed and then disposed, or purged and
/// disposed, exactly once. Dropping the queue performs a blocking
/// [`shutdown`](TaskQueue::shutdown).
pub struct TaskQueue {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
    worker_id: ThreadId,
    max_pending: Option<usize>,
}

impl TaskQueue {
    /// Starts a queue with the default 100 ms poll interval.
    pub fn new() -> Result<Self> {
        Self::with_config(Config::default())
    }

    pub fn with_poll_interval(poll_interval: Duration) -> Result<Self> {
        let config = Config::builder().poll_interval(poll_interval).build()?;
        Self::with_config(config)
    }

    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;

        let shared = Arc::new(Shared::new(
            config.poll_interval,
            PanicHandler::new(config.panic_strategy),
        ));

        let mut builder = thread::Builder::new().name(config.thread_name.clone());
        if let Some(stack_size) = config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let worker_shared = shared.clone();
        let handle = builder.spawn(move || worker_shared.run_worker())?;
        let worker_id = handle.thread().id();

        tracing::debug!(
            thread_name = %config.thread_name,
            max_pending = ?config.max_pending,
            "task queue started"
        );

        Ok(Self {
            shared,
            worker: Mutex::new(Some(handle)),
            worker_id,
            max_pending: config.max_pending,
        })
    }

    /// Hands an entry to the worker.
    ///
    /// Returns [`Status::Rejected`] once the queue has been terminated; the
    /// entry is disposed before this call returns. If the pending queue
    /// cannot store the entry, the error gives it back undisposed.
    pub fn enqueue(&self, entry: impl Into<Entry>) -> std::result::Result<Status, EnqueueError> {
        let entry = entry.into();
        let mut state = self.shared.state.lock();

        if state.terminated {
            drop(state);
            tracing::warn!(placeholder = entry.is_empty(), "enqueue after termination, disposing");
            self.shared.metrics.record_rejected();
            entry.dispose();
            return Ok(Status::Rejected);
        }

        if let Some(capacity) = self.max_pending {
            if state.pending.len() >= capacity {
                drop(state);
                return Err(self.storage_failure(EnqueueError::Full { entry, capacity }));
            }
        }

        if let Err(source) = state.pending.try_reserve(1) {
            drop(state);
            return Err(self.storage_failure(EnqueueError::Alloc { entry, source }));
        }

        let job = Job::new(entry);
        if !job.entry.is_empty() {
            self.shared.metrics.record_enqueued();
        }
        tracing::trace!(task_id = %job.id, "enqueued");
        state.pending.push_back(job);
        drop(state);

        self.shared.signal.notify_one();
        Ok(Status::Accepted)
    }

    /// Enqueues a closure.
    pub fn execute<F>(&self, f: F) -> std::result::Result<Status, EnqueueError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.enqueue(Entry::from_fn(f))
    }

    // the worker may be waiting on a signal this call would have raised
    fn storage_failure(&self, err: EnqueueError) -> EnqueueError {
        self.shared.metrics.record_enqueue_failure();
        self.shared.signal.notify_all();
        tracing::warn!(error = %err, "enqueue failed");
        err
    }

    /// Disposes every pending task without running it.
    ///
    /// A task the worker has already popped runs to completion regardless.
    pub fn purge(&self) {
        let drained = std::mem::take(&mut self.shared.state.lock().pending);
        if drained.is_empty() {
            return;
        }

        let mut disposed = 0u64;
        for job in drained {
            if let Entry::Task(task) = job.entry {
                task.dispose();
                disposed += 1;
            }
        }

        self.shared.metrics.record_purged(disposed);
        tracing::debug!(disposed, "purged pending tasks");
    }

    /// Stops accepting work and tells the worker to stop after its current
    /// task. Pending entries stay queued until [`purge`](TaskQueue::purge).
    pub fn terminate(&self) {
        let mut state = self.shared.state.lock();
        if !state.terminated {
            state.terminated = true;
            tracing::debug!(pending = state.pending.len(), "task queue terminated");
        }
        drop(state);

        self.shared.signal.notify_all();
    }

    pub fn is_terminated(&self) -> bool {
        self.shared.state.lock().terminated
    }

    /// Number of pending entries, placeholders included. Advisory only.
    pub fn size(&self) -> usize {
        self.shared.state.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn poll_interval(&self) -> Duration {
        self.shared.poll_interval()
    }

    pub fn worker_state(&self) -> WorkerState {
        self.shared.worker_state()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.shared.metrics.snapshot()
    }

    /// Terminates the queue, waits for the worker to finish its current task
    /// and stop, then purges whatever is left.
    ///
    /// Calling this again is a no-op. When called from a task running on the
    /// worker thread, the join is skipped and the worker stops as soon as
    /// that task returns.
    pub fn shutdown(&self) -> Result<()> {
        self.terminate();

        let mut result = Ok(());

        if thread::current().id() != self.worker_id {
            // held across the join so concurrent callers also wait for it
            let mut worker = self.worker.lock();
            if let Some(handle) = worker.take() {
                if let Err(payload) = handle.join() {
                    let info = PanicInfo::from_payload(payload);
                    result = Err(Error::WorkerPanic(info.message));
                }
                tracing::debug!("worker joined");
            }
        }

        self.purge();
        result
    }
}

impl Drop for TaskQueue {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::error!(error = %e, "task queue shutdown failed");
        }
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (pending, terminated) = {
            let state = self.shared.state.lock();
            (state.pending.len(), state.terminated)
        };

        f.debug_struct("TaskQueue")
            .field("pending", &pending)
            .field("terminated", &terminated)
            .field("worker_state", &self.worker_state())
            .field("poll_interval", &self.poll_interval())
            .finish()
    }
}
