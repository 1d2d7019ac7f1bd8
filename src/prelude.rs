pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{EnqueueError, Error, Result, Status};
pub use crate::executor::{Entry, FnTask, PanicStrategy, Task, TaskQueue, WorkerState};
pub use crate::telemetry::MetricsSnapshot;
