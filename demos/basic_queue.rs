//! Basic queue walkthrough
//!
//! Posts sleeping tasks across a few main-thread ticks. The main thread
//! finishes before the worker catches up, so dropping the queue purges
//! whatever is still pending.
//!
//! Run with `RUST_LOG=debug cargo run --example basic_queue` to also see the
//! queue's own events.

use std::thread;
use std::time::Duration;
use taskq::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

struct SleepTask {
    id: u32,
    work_ms: u64,
}

impl SleepTask {
    fn new(id: u32, work_ms: u64) -> Self {
        info!(task = id, "construction");
        Self { id, work_ms }
    }
}

impl Task for SleepTask {
    fn execute(&mut self) {
        if self.work_ms == 0 {
            // failures are reported by the task itself
            error!(task = self.id, "nothing to do");
            return;
        }

        info!(task = self.id, "processing start");
        thread::sleep(Duration::from_millis(self.work_ms));
        info!(task = self.id, "processing end");
    }

    fn dispose(self: Box<Self>) {
        info!(task = self.id, "destruction");
    }
}

fn tick() {
    thread::sleep(Duration::from_millis(100));
    info!("--- main thread tick");
}

fn main() -> taskq::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_thread_names(true)
        .init();

    let queue = TaskQueue::with_poll_interval(Duration::from_millis(50))?;

    post(&queue, SleepTask::new(1, 100));
    tick();
    post(&queue, SleepTask::new(2, 200));
    tick();
    tick();
    post(&queue, SleepTask::new(3, 100));
    post(&queue, Entry::Empty);
    post(&queue, SleepTask::new(4, 200));
    post(&queue, SleepTask::new(5, 0));
    tick();
    post(&queue, SleepTask::new(6, 100));
    tick();

    info!(pending = queue.size(), "--- main thread termination");
    queue.shutdown()?;

    let metrics = queue.metrics();
    info!(
        executed = metrics.tasks_executed,
        purged = metrics.tasks_purged,
        skipped = metrics.placeholders_skipped,
        "queue closed"
    );

    Ok(())
}

fn post(queue: &TaskQueue, entry: impl Into<Entry>) {
    match queue.enqueue(entry) {
        Ok(Status::Accepted) => {}
        Ok(Status::Rejected) => error!("queue already terminated"),
        Err(err) => {
            error!(error = %err, "enqueue failed");
            err.into_entry().dispose();
        }
    }
}
