use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Number of nets a pool prepares when no size is configured.
pub const DEFAULT_POOL_SIZE: usize = 10;

/// How long `get` waits for a free net when no timeout is configured.
pub const DEFAULT_GET_TIMEOUT_MS: u64 = 30_000;

/// Configuration for a net pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
  /// Number of nets built on init.
  pub size: usize,
  /// Maximum wait for a free net, in milliseconds.
  pub get_timeout_ms: u64,
}

impl PoolConfig {
  pub fn new(size: usize, get_timeout: Duration) -> Self {
    Self {
      size,
      get_timeout_ms: u64::try_from(get_timeout.as_millis()).unwrap_or(u64::MAX),
    }
  }

  pub fn get_timeout(&self) -> Duration {
    Duration::from_millis(self.get_timeout_ms)
  }
}

impl Default for PoolConfig {
  fn default() -> Self {
    Self {
      size: DEFAULT_POOL_SIZE,
      get_timeout_ms: DEFAULT_GET_TIMEOUT_MS,
    }
  }
}
