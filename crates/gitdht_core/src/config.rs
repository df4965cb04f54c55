//! Adapter configuration.

/// Configuration for a [`crate::Database`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Accumulated-byte-size threshold that triggers an automatic write
    /// buffer flush.
    pub write_buffer_size: usize,

    /// Worker threads in the network pool the builder creates when no
    /// runtime handle is supplied.
    pub worker_threads: usize,

    /// Whether the cluster topology is locality-aware. When false, the
    /// `Local` context falls back to the general quorum handle.
    pub locality_aware: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            write_buffer_size: 10 * 1024 * 1024, // 10 MiB
            worker_threads: 4,
            locality_aware: false,
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the write buffer flush threshold.
    #[must_use]
    pub const fn write_buffer_size(mut self, size: usize) -> Self {
        self.write_buffer_size = size;
        self
    }

    /// Sets the worker pool size.
    #[must_use]
    pub const fn worker_threads(mut self, count: usize) -> Self {
        self.worker_threads = count;
        self
    }

    /// Sets whether the cluster topology is locality-aware.
    #[must_use]
    pub const fn locality_aware(mut self, value: bool) -> Self {
        self.locality_aware = value;
        self
    }
}
