use crate::executor::Entry;
use std::collections::TryReserveError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to spawn worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("worker panic: {0}")]
    WorkerPanic(String),
}

impl Error {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Error::Config(msg.into())
    }
}

/// Outcome of a call to [`TaskQueue::enqueue`](crate::TaskQueue::enqueue).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The queue took ownership of the entry.
    Accepted,
    /// The queue was already terminated; the entry has been disposed.
    Rejected,
}

impl Status {
    pub fn is_accepted(self) -> bool {
        self == Status::Accepted
    }
}

/// The pending sequence could not store an entry.
///
/// Ownership never transferred to the queue, so the entry travels back to the
/// caller inside the error, undisposed.
#[derive(Debug, thiserror::Error)]
pub enum EnqueueError {
    #[error("queue is full ({capacity} pending entries)")]
    Full { entry: Entry, capacity: usize },

    #[error("failed to grow pending queue: {source}")]
    Alloc {
        entry: Entry,
        #[source]
        source: TryReserveError,
    },
}

impl EnqueueError {
    pub fn entry(&self) -> &Entry {
        match self {
            EnqueueError::Full { entry, .. } | EnqueueError::Alloc { entry, .. } => entry,
        }
    }

    pub fn into_entry(self) -> Entry {
        match self {
            EnqueueError::Full { entry, .. } | EnqueueError::Alloc { entry, .. } => entry,
        }
    }
}
