//! Pool errors.

use chipnet_net::NetError;
use thiserror::Error;

/// Errors that can occur while preparing or handing out nets.
#[derive(Debug, Error)]
pub enum PoolError {
  #[error("net pool already initialized")]
  AlreadyInitialized,

  /// No net was released within the configured wait.
  #[error("waited for a net from the pool too long ({waited_ms} ms)")]
  Timeout { waited_ms: u64 },

  #[error("failed to build net: {0}")]
  Build(#[from] NetError),

  /// The queue had no room while `init` was filling it.
  #[error("net queue full ({capacity} slots)")]
  Full { capacity: usize },

  /// The queue's other side is gone. [`crate::NetPool`] and
  /// [`crate::NetFactory`] own both ends of their queues, so neither
  /// returns this while it is alive.
  #[error("net queue closed")]
  Closed,
}
