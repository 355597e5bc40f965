//! Fixed-capacity pool of reusable nets.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Duration;

use chipnet_config::{NetDef, PoolConfig};
use chipnet_net::{Graph, Net};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, instrument, warn};

use crate::error::PoolError;

/// A pool of nets built from one definition.
///
/// The graph is built once on [`NetPool::init`] and shared by every net in
/// the pool. Nets circulate through a bounded queue: [`NetPool::get`] takes
/// one out, and dropping the returned [`PooledNet`] resets it and puts it
/// back. Waiters are served in arrival order.
///
/// # Usage
///
/// ```ignore
/// let pool = Arc::new(NetPool::new(PoolConfig::default()));
/// pool.init(&def)?;
///
/// let mut net = pool.get().await?;
/// net.set_consumer(consumer);
/// net.start()?;
/// net.set_place("review")?;
/// // net goes back to the pool here
/// ```
pub struct NetPool {
  config: PoolConfig,
  sender: mpsc::Sender<Net>,
  receiver: Mutex<mpsc::Receiver<Net>>,
  phase: AtomicU8,
}

const UNINITIALIZED: u8 = 0;
const INITIALIZING: u8 = 1;
const INITIALIZED: u8 = 2;

impl NetPool {
  pub fn new(config: PoolConfig) -> Self {
    let (sender, receiver) = mpsc::channel(config.size.max(1));
    Self {
      config,
      sender,
      receiver: Mutex::new(receiver),
      phase: AtomicU8::new(UNINITIALIZED),
    }
  }

  /// Build `size` nets from the definition and queue them.
  ///
  /// Fails if the pool was already initialized or another `init` is in
  /// progress. A definition that fails to build leaves the pool
  /// uninitialized; [`NetPool::is_initialized`] turns true only once every
  /// net is queued.
  #[instrument(name = "net_pool_init", skip(self, def), fields(size = self.config.size, start = %def.start))]
  pub fn init(&self, def: &NetDef) -> Result<(), PoolError> {
    if self
      .phase
      .compare_exchange(UNINITIALIZED, INITIALIZING, Ordering::SeqCst, Ordering::SeqCst)
      .is_err()
    {
      return Err(PoolError::AlreadyInitialized);
    }

    let graph = match Graph::from_def(def) {
      Ok(graph) => Arc::new(graph),
      Err(e) => {
        self.phase.store(UNINITIALIZED, Ordering::SeqCst);
        warn!(error = %e, "net pool definition rejected");
        return Err(e.into());
      }
    };

    // The queue is empty before init and holds `size.max(1)` nets.
    for _ in 0..self.config.size {
      if let Err(e) = self.sender.try_send(Net::new(Arc::clone(&graph))) {
        self.phase.store(UNINITIALIZED, Ordering::SeqCst);
        return Err(match e {
          TrySendError::Full(_) => PoolError::Full {
            capacity: self.sender.max_capacity(),
          },
          TrySendError::Closed(_) => PoolError::Closed,
        });
      }
    }
    self.phase.store(INITIALIZED, Ordering::SeqCst);

    info!(
      places = graph.place_count(),
      transitions = graph.transition_count(),
      "net pool initialized"
    );
    Ok(())
  }

  /// Take a net, waiting at most the configured timeout.
  pub async fn get(&self) -> Result<PooledNet, PoolError> {
    self.get_timeout(self.config.get_timeout()).await
  }

  /// Take a net, waiting at most `timeout`.
  ///
  /// The pool owns a sender of its own queue, so the queue never closes
  /// while the pool is alive and the only failure is
  /// [`PoolError::Timeout`].
  pub async fn get_timeout(&self, timeout: Duration) -> Result<PooledNet, PoolError> {
    let received = tokio::time::timeout(timeout, async {
      let mut receiver = self.receiver.lock().await;
      receiver.recv().await
    })
    .await;

    let net = match received {
      Ok(Some(net)) => net,
      Ok(None) => return Err(PoolError::Closed),
      Err(_) => {
        let waited_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        warn!(waited_ms, "timed out waiting for a net from the pool");
        return Err(PoolError::Timeout { waited_ms });
      }
    };

    debug!(net_id = %net.id(), "net taken from pool");
    Ok(PooledNet {
      net: Some(net),
      sender: self.sender.clone(),
    })
  }

  /// Number of nets waiting in the pool.
  pub fn available(&self) -> usize {
    self.sender.max_capacity() - self.sender.capacity()
  }

  pub fn size(&self) -> usize {
    self.config.size
  }

  pub fn is_initialized(&self) -> bool {
    self.phase.load(Ordering::SeqCst) == INITIALIZED
  }
}

/// A net on loan from a [`NetPool`].
///
/// Dereferences to [`Net`]. On drop the net is reset (ledger, error
/// marker and consumer) and returned to the pool, whatever path the owner
/// leaves by.
pub struct PooledNet {
  net: Option<Net>,
  sender: mpsc::Sender<Net>,
}

impl PooledNet {
  /// Return the net to the pool now.
  pub fn close(self) {
    drop(self);
  }
}

impl fmt::Debug for PooledNet {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("PooledNet")
      .field("net", &self.net)
      .finish_non_exhaustive()
  }
}

impl Deref for PooledNet {
  type Target = Net;

  fn deref(&self) -> &Net {
    self.net.as_ref().expect("pooled net is present until drop")
  }
}

impl DerefMut for PooledNet {
  fn deref_mut(&mut self) -> &mut Net {
    self.net.as_mut().expect("pooled net is present until drop")
  }
}

impl Drop for PooledNet {
  fn drop(&mut self) {
    let Some(mut net) = self.net.take() else {
      return;
    };

    net.reset();
    let net_id = net.id().to_string();
    // The queue holds every net of the pool, so it is never full here.
    if self.sender.try_send(net).is_err() {
      debug!(net_id = %net_id, "net pool closed, dropping net");
    } else {
      debug!(net_id = %net_id, "net returned to pool");
    }
  }
}
