//! Net instance and the firing algorithm.

use std::fmt;
use std::sync::Arc;

use chipnet_config::NetDef;
use tracing::{debug, warn};

use crate::consumer::Consumer;
use crate::element::PlaceIdx;
use crate::error::NetError;
use crate::graph::Graph;
use crate::state::State;

/// One process execution over a shared graph.
///
/// The caller drives chips explicitly with [`Net::start`] and
/// [`Net::set_place`]; the net validates every move against the topology,
/// keeps the ledger and fires transitions chosen by the attached
/// [`Consumer`]. The first failure inside a deposit poisons the net until
/// [`Net::reset`].
///
/// A net is not internally synchronized. One owner drives it at a time.
pub struct Net {
  id: String,
  graph: Arc<Graph>,
  state: State,
  consumer: Option<Arc<dyn Consumer>>,
  error: Option<NetError>,
}

impl Net {
  /// Create a fresh net over an already built graph.
  pub fn new(graph: Arc<Graph>) -> Self {
    Self {
      id: uuid::Uuid::new_v4().to_string(),
      graph,
      state: State::default(),
      consumer: None,
      error: None,
    }
  }

  /// Build a graph from a definition and create a net over it.
  pub fn build(def: &NetDef) -> Result<Self, NetError> {
    Ok(Self::new(Arc::new(Graph::from_def(def)?)))
  }

  pub fn with_consumer(mut self, consumer: Arc<dyn Consumer>) -> Self {
    self.consumer = Some(consumer);
    self
  }

  pub fn set_consumer(&mut self, consumer: Arc<dyn Consumer>) {
    self.consumer = Some(consumer);
  }

  pub fn has_consumer(&self) -> bool {
    self.consumer.is_some()
  }

  /// Unique id of this instance, used in log fields.
  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn graph(&self) -> &Arc<Graph> {
    &self.graph
  }

  pub fn state(&self) -> &State {
    &self.state
  }

  pub fn is_finished(&self) -> bool {
    self.state.finished
  }

  pub fn is_error_state(&self) -> bool {
    self.error.is_some()
  }

  /// The failure that poisoned this net.
  pub fn error(&self) -> Option<&NetError> {
    self.error.as_ref()
  }

  /// Start the net with a single chip in the start place.
  ///
  /// The ledger is cleared first, so a finished net can be started again.
  /// A poisoned net stays poisoned.
  pub fn start(&mut self) -> Result<(), NetError> {
    if self.consumer.is_none() {
      return Err(NetError::ConsumerNotSet);
    }
    if self.error.is_some() {
      return Err(NetError::NetInErrorState);
    }

    self.state = State::default();
    let start = self.graph.start_idx();
    self.enter(start).map(|_| ())
  }

  /// Move a chip into a place.
  ///
  /// Returns `true` when the place is terminal and the net is now finished.
  ///
  /// A non-start place only accepts a chip its producing transition still
  /// owes. Validation failures leave the ledger untouched. Failures while
  /// depositing poison the net and are reported as
  /// [`NetError::NetInErrorState`]; the cause is kept in [`Net::error`].
  pub fn set_place(&mut self, place_id: &str) -> Result<bool, NetError> {
    if self.consumer.is_none() {
      return Err(NetError::ConsumerNotSet);
    }
    if self.error.is_some() {
      return Err(NetError::NetInErrorState);
    }
    if self.state.finished {
      return Err(NetError::Finished);
    }

    let place_idx = self.graph.find_place(place_id)?;
    if place_idx != self.graph.start_idx() {
      let place = self.graph.place(place_idx);
      let producer = self
        .graph
        .from_transition(place)
        .ok_or_else(|| NetError::PlaceHasNoProducer {
          place_id: place_id.to_string(),
        })?;

      if self.state.chips_in_transition(producer.id()) == 0 {
        return Err(NetError::NoChipForPlace {
          place_id: place_id.to_string(),
          transition_id: producer.id().to_string(),
        });
      }
    }

    self.enter(place_idx)
  }

  /// Replace the ledger with a snapshot, e.g. to resume a persisted run.
  ///
  /// The snapshot is trusted as is; the error marker and consumer are kept.
  pub fn restore_state(&mut self, state: State) {
    self.state = state;
  }

  /// Clear the ledger and the error marker and detach the consumer.
  ///
  /// The graph is kept, so the net can be handed to another owner.
  pub fn reset(&mut self) {
    self.state = State::default();
    self.error = None;
    self.consumer = None;
  }

  /// Run a deposit and poison the net if it fails.
  fn enter(&mut self, place_idx: PlaceIdx) -> Result<bool, NetError> {
    let Some(consumer) = self.consumer.as_deref() else {
      return Err(NetError::ConsumerNotSet);
    };

    let firing = Firing {
      net_id: &self.id,
      graph: &self.graph,
      consumer,
    };

    match firing.deposit(&mut self.state, place_idx) {
      Ok(()) => Ok(self.graph.place(place_idx).is_finish()),
      Err(cause) => {
        warn!(
          net_id = %self.id,
          place_id = %self.graph.place(place_idx).id(),
          error = %cause,
          "net poisoned"
        );
        self.error = Some(cause);
        Err(NetError::NetInErrorState)
      }
    }
  }
}

/// Borrowed view used for one deposit, so the ledger can be mutated while
/// the graph and consumer are read.
struct Firing<'a> {
  net_id: &'a str,
  graph: &'a Graph,
  consumer: &'a dyn Consumer,
}

impl Firing<'_> {
  fn deposit(&self, state: &mut State, place_idx: PlaceIdx) -> Result<(), NetError> {
    let graph = self.graph;
    let place = graph.place(place_idx);

    self
      .consumer
      .before_place(place.id())
      .map_err(|source| NetError::BeforePlaceFailed {
        place_id: place.id().to_string(),
        source,
      })?;

    if place_idx != graph.start_idx() {
      if let Some(producer) = graph.from_transition(place) {
        state.take_transition_chip(producer.id());
      }
    }

    state.put_place_chip(place.id());
    self.consumer.after_place(place.id());

    debug!(
      net_id = %self.net_id,
      place_id = %place.id(),
      chips = state.chips_in_place(place.id()),
      "chip deposited"
    );

    if place.is_finish() {
      state.finished = true;
      debug!(net_id = %self.net_id, place_id = %place.id(), "net finished");
      return Ok(());
    }

    let available: Vec<_> = place
      .to_transitions()
      .iter()
      .copied()
      .filter(|&tr| self.consumer.can_transit(graph.transition(tr).id()))
      .collect();

    let [next] = available.as_slice() else {
      return Err(NetError::UnexpectedAvailableTransitions {
        place_id: place.id().to_string(),
        count: available.len(),
      });
    };
    let transition = graph.transition(*next);

    // Join: every input place must hold a chip before the transition fires.
    let waiting = transition
      .from_places()
      .iter()
      .any(|&p| state.chips_in_place(graph.place(p).id()) == 0);
    if waiting {
      debug!(
        net_id = %self.net_id,
        transition_id = %transition.id(),
        "transition waiting for inputs"
      );
      return Ok(());
    }

    self
      .consumer
      .before_transit(transition.id())
      .map_err(|source| NetError::BeforeTransitFailed {
        transition_id: transition.id().to_string(),
        source,
      })?;

    for &input in transition.from_places() {
      state.take_place_chip(graph.place(input).id());
    }
    // Chips are only owed to the outputs; the caller moves them with set_place.
    let credits = u32::try_from(transition.to_places().len()).unwrap_or(u32::MAX);
    state.credit_transition(transition.id(), credits);
    self.consumer.after_transit(transition.id());

    debug!(
      net_id = %self.net_id,
      transition_id = %transition.id(),
      credits,
      "transition fired"
    );

    Ok(())
  }
}

impl fmt::Debug for Net {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Net")
      .field("id", &self.id)
      .field("state", &self.state)
      .field("has_consumer", &self.consumer.is_some())
      .field("error", &self.error)
      .finish_non_exhaustive()
  }
}
