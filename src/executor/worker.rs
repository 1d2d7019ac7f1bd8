// the single background worker and the state it shares with producers
use super::panic_handler::PanicHandler;
use super::task::{Entry, Job};
use crate::telemetry::Metrics;
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

/// Observable phase of the worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WorkerState {
    /// Waiting on the signal, bounded by the poll interval.
    Idle = 0,
    /// Running entries popped from the front of the queue.
    Draining = 1,
    /// Terminal. The worker thread has exited or is about to.
    Stopped = 2,
}

impl WorkerState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => WorkerState::Idle,
            1 => WorkerState::Draining,
            _ => WorkerState::Stopped,
        }
    }
}

// guarded by Shared::state
pub(crate) struct State {
    pub(crate) pending: VecDeque<Job>,
    pub(crate) terminated: bool,
}

pub(crate) struct Shared {
    pub(crate) state: Mutex<State>,
    pub(crate) signal: Condvar,
    pub(crate) metrics: Metrics,
    worker_state: AtomicU8,
    panic_handler: PanicHandler,
    poll_interval: Duration,
}

impl Shared {
    pub(crate) fn new(poll_interval: Duration, panic_handler: PanicHandler) -> Self {
        Self {
            state: Mutex::new(State {
                pending: VecDeque::new(),
                terminated: false,
            }),
            signal: Condvar::new(),
            metrics: Metrics::new(),
            worker_state: AtomicU8::new(WorkerState::Idle as u8),
            panic_handler,
            poll_interval,
        }
    }

    pub(crate) fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub(crate) fn worker_state(&self) -> WorkerState {
        WorkerState::from_u8(self.worker_state.load(Ordering::Acquire))
    }

    fn set_worker_state(&self, state: WorkerState) {
        self.worker_state.store(state as u8, Ordering::Release);
    }

    // main loop
    pub(crate) fn run_worker(&self) {
        tracing::debug!(poll_interval = ?self.poll_interval, "worker started");

        let mut state = self.state.lock();

        loop {
            if state.terminated {
                break;
            }

            if let Some(job) = state.pending.pop_front() {
                self.set_worker_state(WorkerState::Draining);
                // never hold the lock while user code runs
                MutexGuard::unlocked(&mut state, || self.run_job(job));
                continue;
            }

            self.set_worker_state(WorkerState::Idle);
            // timeout or wake: either way re-check termination and the queue
            let _ = self.signal.wait_for(&mut state, self.poll_interval);
        }

        let remaining = state.pending.len();
        self.set_worker_state(WorkerState::Stopped);
        drop(state);

        tracing::debug!(remaining, "worker stopped");
    }

    fn run_job(&self, job: Job) {
        let Job { id, entry } = job;

        let mut task = match entry {
            Entry::Task(task) => task,
            Entry::Empty => {
                tracing::trace!(task_id = %id, "skipping placeholder");
                self.metrics.record_placeholder();
                return;
            }
        };

        let start = Instant::now();
        let result = self.panic_handler.execute(|| task.execute());
        let duration_ns = start.elapsed().as_nanos() as u64;

        // dispose runs whether or not execute returned normally
        if let Err(info) = self.panic_handler.execute(move || task.dispose()) {
            tracing::debug!(task_id = %id, message = %info, "dispose panicked");
        }

        match result {
            Ok(()) => {
                tracing::trace!(task_id = %id, duration_ns, "task executed");
                self.metrics.record_task_execution(duration_ns);
            }
            Err(info) => {
                tracing::debug!(task_id = %id, message = %info, "worker continuing after task panic");
                self.metrics.record_task_panic();
            }
        }
    }
}
