//! Configuration for [`ModelStore`](crate::ModelStore) instances.

use std::time::Duration;

/// What a store does after a reducer reports an inconsistent state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FaultPolicy {
    /// Stop the apply loop, fail every pending intent and reject new ones
    #[default]
    Halt,

    /// Fail only the offending intent and keep serving
    Continue,
}

/// Configuration for Store instances
///
/// # Example
///
/// ```
/// use mvi_runtime::{FaultPolicy, StoreConfig};
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_broadcast_capacity(256)
///     .with_fault_policy(FaultPolicy::Continue)
///     .with_shutdown_timeout(Duration::from_secs(1));
///
/// assert_eq!(config.broadcast_capacity, 256);
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Number of snapshots buffered per observer before it starts lagging
    pub broadcast_capacity: usize,
    /// Reaction to an inconsistent reducer
    pub fault_policy: FaultPolicy,
    /// How long `shutdown()` waits for the apply loop
    pub shutdown_timeout: Duration,
}

impl StoreConfig {
    /// Create a new configuration with custom values
    #[must_use]
    pub const fn new(
        broadcast_capacity: usize,
        fault_policy: FaultPolicy,
        shutdown_timeout: Duration,
    ) -> Self {
        Self {
            broadcast_capacity,
            fault_policy,
            shutdown_timeout,
        }
    }

    /// Set the per-observer buffer size
    #[must_use]
    pub const fn with_broadcast_capacity(mut self, capacity: usize) -> Self {
        self.broadcast_capacity = capacity;
        self
    }

    /// Set the fault policy
    #[must_use]
    pub const fn with_fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }

    /// Set the shutdown timeout
    #[must_use]
    pub const fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            broadcast_capacity: 64,
            fault_policy: FaultPolicy::Halt,
            shutdown_timeout: Duration::from_secs(5),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = StoreConfig::default();
        assert_eq!(config.broadcast_capacity, 64);
        assert_eq!(config.fault_policy, FaultPolicy::Halt);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(5));
    }

    #[test]
    fn builder_overrides() {
        let config = StoreConfig::new(1, FaultPolicy::Halt, Duration::ZERO)
            .with_broadcast_capacity(8)
            .with_fault_policy(FaultPolicy::Continue)
            .with_shutdown_timeout(Duration::from_millis(10));
        assert_eq!(config.broadcast_capacity, 8);
        assert_eq!(config.fault_policy, FaultPolicy::Continue);
        assert_eq!(config.shutdown_timeout, Duration::from_millis(10));
    }
}
