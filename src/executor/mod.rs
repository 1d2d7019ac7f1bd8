//! Task execution infrastructure.
//!
//! This module provides the task abstraction, the single background worker
//! and the queue that feeds it.

pub mod panic_handler;
pub mod task;
pub mod task_queue;
pub mod worker;

pub use panic_handler::{PanicHandler, PanicInfo, PanicStrategy};
pub use task::{Entry, FnTask, Task, TaskId};
pub use task_queue::TaskQueue;
pub use worker::WorkerState;
