//! taskq - a single-worker background task queue
//!
//! Producers enqueue units of work from any thread and return immediately.
//! One dedicated worker thread drains the queue in FIFO order, running each
//! task with the queue lock released.
//!
//! # Quick Start
//!
//! ```no_run
//! use taskq::prelude::*;
//!
//! let queue = TaskQueue::new().unwrap();
//!
//! queue.execute(|| println!("hello from the worker")).unwrap();
//!
//! // placeholders are skipped without running anything
//! queue.enqueue(Entry::Empty).unwrap();
//!
//! // terminate, wait for the in-flight task, purge the rest
//! queue.shutdown().unwrap();
//! ```
//!
//! # Guarantees
//!
//! - **FIFO**: tasks run in the order `enqueue` accepted them
//! - **Exactly-once disposal**: every accepted task is disposed once, after
//!   running or when purged; tasks enqueued after termination are rejected
//!   and disposed immediately
//! - **No lock during execution**: a slow task never blocks producers
//! - **Cooperative shutdown**: termination never interrupts a running task

#![warn(missing_debug_implementations)]

pub mod config;
pub mod error;
pub mod executor;
pub mod prelude;
pub mod telemetry;

pub use config::{Config, ConfigBuilder};
pub use error::{EnqueueError, Error, Result, Status};
pub use executor::{Entry, FnTask, PanicStrategy, Task, TaskQueue, WorkerState};
