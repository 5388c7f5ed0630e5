//! Runtime configuration.

use bon::bon;
use kernfuse_schedule::FuseConfig;

use crate::queue::DEFAULT_QUEUE_CAPACITY;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Instructions buffered before an implicit flush.
    pub queue_capacity: usize,
    /// Fusion applied to every flushed batch.
    pub fuse: FuseConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { queue_capacity: DEFAULT_QUEUE_CAPACITY, fuse: FuseConfig::default() }
    }
}

#[bon]
impl RuntimeConfig {
    /// Create a runtime configuration with builder pattern.
    #[builder]
    pub fn builder(
        #[builder(default = DEFAULT_QUEUE_CAPACITY)] queue_capacity: usize,
        #[builder(default)] fuse: FuseConfig,
    ) -> Self {
        Self { queue_capacity, fuse }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `KERNFUSE_QUEUE_CAPACITY` - Queue capacity (default: 1024)
    /// * Fusion variables, see [`FuseConfig::from_env`]
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// [`RuntimeConfig::from_env`] over an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let queue_capacity = match var("KERNFUSE_QUEUE_CAPACITY") {
            None => DEFAULT_QUEUE_CAPACITY,
            Some(value) => match value.trim().parse::<usize>() {
                Ok(capacity) if capacity > 0 => capacity,
                _ => {
                    tracing::warn!(%value, "invalid KERNFUSE_QUEUE_CAPACITY, using {DEFAULT_QUEUE_CAPACITY}");
                    DEFAULT_QUEUE_CAPACITY
                }
            },
        };

        Self { queue_capacity, fuse: FuseConfig::from_vars(&var) }
    }
}
