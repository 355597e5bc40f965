//! Background production of fresh nets.

use std::sync::Arc;

use chipnet_config::NetDef;
use chipnet_net::{Consumer, Net};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::error::PoolError;

/// Keeps a bounded queue of freshly built nets.
///
/// Every net gets its own graph and the shared consumer. Nets handed out by
/// [`NetFactory::get`] are consumed; nothing is returned to the queue.
///
/// # Usage
///
/// ```ignore
/// let factory = Arc::new(NetFactory::new(def, consumer, 16));
/// let cancel = CancellationToken::new();
/// let producer = factory.spawn(cancel.clone());
///
/// let mut net = factory.get().await?;
/// net.start()?;
///
/// cancel.cancel();
/// producer.await??;
/// ```
pub struct NetFactory {
  def: NetDef,
  consumer: Arc<dyn Consumer>,
  prepared: usize,
  sender: mpsc::Sender<Net>,
  receiver: Mutex<mpsc::Receiver<Net>>,
}

impl NetFactory {
  /// Create a factory keeping up to `prepared` nets ready.
  pub fn new(def: NetDef, consumer: Arc<dyn Consumer>, prepared: usize) -> Self {
    let prepared = prepared.max(1);
    let (sender, receiver) = mpsc::channel(prepared);
    Self {
      def,
      consumer,
      prepared,
      sender,
      receiver: Mutex::new(receiver),
    }
  }

  /// Run the production loop.
  ///
  /// Builds nets until the cancellation token fires, waiting while the
  /// queue is full. Stops with an error on the first build failure; the
  /// factory owns the receiving side, so sending never fails.
  pub async fn run(&self, cancel: CancellationToken) -> Result<(), PoolError> {
    info!(start = %self.def.start, prepared = self.prepared, "starting net factory");

    loop {
      let net = match Net::build(&self.def) {
        Ok(net) => net.with_consumer(Arc::clone(&self.consumer)),
        Err(e) => {
          error!(error = %e, "net factory failed to build net");
          return Err(e.into());
        }
      };
      let net_id = net.id().to_string();

      tokio::select! {
          biased;
          _ = cancel.cancelled() => {
              info!("net factory cancelled");
              return Ok(());
          }
          sent = self.sender.send(net) => {
              if sent.is_err() {
                  return Err(PoolError::Closed);
              }
              debug!(net_id = %net_id, "net prepared");
          }
      }
    }
  }

  /// Run the production loop on a background task.
  pub fn spawn(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<Result<(), PoolError>> {
    let factory = Arc::clone(self);
    tokio::spawn(async move { factory.run(cancel).await })
  }

  /// Take a prepared net, waiting until one is available.
  ///
  /// The factory holds the sending side of its queue, so this waits
  /// rather than failing when the production loop is not running.
  pub async fn get(&self) -> Result<Net, PoolError> {
    let mut receiver = self.receiver.lock().await;
    receiver.recv().await.ok_or(PoolError::Closed)
  }

  /// Number of nets ready to be taken.
  pub fn ready(&self) -> usize {
    self.sender.max_capacity() - self.sender.capacity()
  }

  pub fn prepared(&self) -> usize {
    self.prepared
  }
}
