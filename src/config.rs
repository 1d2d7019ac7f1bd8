use crate::error::{Error, Result};
use crate::executor::PanicStrategy;
use std::time::Duration;

const MIN_STACK_SIZE: usize = 16 * 1024;
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
pub struct Config {
    /// Upper bound on how long the idle worker sleeps before re-checking
    /// termination and the pending queue on its own.
    pub poll_interval: Duration,
    pub thread_name: String,
    pub stack_size: Option<usize>,
    /// Maximum number of pending entries; `None` means unbounded.
    pub max_pending: Option<usize>,
    pub panic_strategy: PanicStrategy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            thread_name: "taskq-worker".to_string(),
            stack_size: None,
            max_pending: None,
            panic_strategy: PanicStrategy::default(),
        }
    }
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::config("poll_interval must be > 0"));
        }
        if self.poll_interval > MAX_POLL_INTERVAL {
            return Err(Error::config("poll_interval too large (max 1h)"));
        }

        if self.max_pending == Some(0) {
            return Err(Error::config("max_pending must be > 0"));
        }

        if let Some(size) = self.stack_size {
            if size < MIN_STACK_SIZE {
                return Err(Error::config(format!(
                    "stack_size must be at least {} bytes",
                    MIN_STACK_SIZE
                )));
            }
        }

        if self.thread_name.is_empty() {
            return Err(Error::config("thread_name must not be empty"));
        }
        if self.thread_name.contains('\0') {
            return Err(Error::config("thread_name must not contain NUL"));
        }

        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    pub fn thread_name<S: Into<String>>(mut self, name: S) -> Self {
        self.config.thread_name = name.into();
        self
    }

    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    pub fn max_pending(mut self, max: usize) -> Self {
        self.config.max_pending = Some(max);
        self
    }

    pub fn panic_strategy(mut self, strategy: PanicStrategy) -> Self {
        self.config.panic_strategy = strategy;
        self
    }

    pub fn build(self) -> Result<Config> {
        self.config.validate()?;
        Ok(self.config)
    }
}
