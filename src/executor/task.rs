//! Task representation and the entries stored in the pending queue.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global task ID counter
static TASK_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        TaskId(TASK_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A unit of deferred work.
///
/// The queue calls [`execute`](Task::execute) at most once and
/// [`dispose`](Task::dispose) exactly once, whether or not the task ran.
///
/// # Panics
///
/// `execute` must not panic. Failures belong to the task and have to be
/// reported through whatever channel the task owner chooses. A panic that
/// escapes is treated according to the queue's
/// [`PanicStrategy`](crate::executor::PanicStrategy), which aborts the process
/// by default.
pub trait Task: Send + 'static {
    fn execute(&mut self);

    /// Teardown hook. Runs after `execute`, or in place of it when the task
    /// is purged or rejected.
    fn dispose(self: Box<Self>) {}
}

/// Adapts a closure into a [`Task`].
pub struct FnTask<F> {
    func: Option<F>,
}

impl<F> FnTask<F>
where
    F: FnOnce() + Send + 'static,
{
    pub fn new(f: F) -> Self {
        Self { func: Some(f) }
    }
}

impl<F> Task for FnTask<F>
where
    F: FnOnce() + Send + 'static,
{
    fn execute(&mut self) {
        if let Some(f) = self.func.take() {
            f();
        }
    }
}

impl<F> fmt::Debug for FnTask<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTask")
            .field("consumed", &self.func.is_none())
            .finish()
    }
}

/// A slot in the pending queue: either owned work or a deliberate gap.
///
/// `Entry::Empty` is skipped by the worker and by purge without executing or
/// disposing anything.
pub enum Entry {
    Task(Box<dyn Task>),
    Empty,
}

impl Entry {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Entry::Task(Box::new(FnTask::new(f)))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Entry::Empty)
    }

    /// Disposes the task without running it. No-op for a placeholder.
    pub fn dispose(self) {
        if let Entry::Task(task) = self {
            task.dispose();
        }
    }
}

impl<T: Task> From<T> for Entry {
    fn from(task: T) -> Self {
        Entry::Task(Box::new(task))
    }
}

impl From<Box<dyn Task>> for Entry {
    fn from(task: Box<dyn Task>) -> Self {
        Entry::Task(task)
    }
}

impl From<Option<Box<dyn Task>>> for Entry {
    fn from(task: Option<Box<dyn Task>>) -> Self {
        match task {
            Some(task) => Entry::Task(task),
            None => Entry::Empty,
        }
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Task(_) => f.write_str("Entry::Task(..)"),
            Entry::Empty => f.write_str("Entry::Empty"),
        }
    }
}

/// An entry after it has been accepted, tagged for logging.
pub(crate) struct Job {
    pub(crate) id: TaskId,
    pub(crate) entry: Entry,
}

impl Job {
    pub(crate) fn new(entry: Entry) -> Self {
        Job {
            id: TaskId::next(),
            entry,
        }
    }
}
