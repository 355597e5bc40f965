//! Places and transitions.
//!
//! Elements reference each other through arena handles owned by a
//! [`Graph`](crate::Graph), so the topology has no ownership cycles and can
//! be shared read-only between nets.

use crate::error::NetError;

/// Handle of a place inside its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceIdx(pub(crate) usize);

/// Handle of a transition inside its graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionIdx(pub(crate) usize);

impl PlaceIdx {
  pub fn index(self) -> usize {
    self.0
  }
}

impl TransitionIdx {
  pub fn index(self) -> usize {
    self.0
  }
}

/// A place that can hold a chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
  id: String,
  /// Transitions this place may feed. More than one is an exclusive choice.
  to_transitions: Vec<TransitionIdx>,
  /// The single transition producing chips for this place.
  from_transition: Option<TransitionIdx>,
  is_finish: bool,
}

impl Place {
  pub(crate) fn new(id: impl Into<String>, is_finish: bool) -> Self {
    Self {
      id: id.into(),
      to_transitions: Vec::new(),
      from_transition: None,
      is_finish,
    }
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  pub fn to_transitions(&self) -> &[TransitionIdx] {
    &self.to_transitions
  }

  pub fn from_transition(&self) -> Option<TransitionIdx> {
    self.from_transition
  }

  /// Terminal place: a chip here finishes the net.
  pub fn is_finish(&self) -> bool {
    self.is_finish
  }

  pub(crate) fn add_to_transition(
    &mut self,
    transition: TransitionIdx,
    transition_id: &str,
  ) -> Result<(), NetError> {
    if self.to_transitions.contains(&transition) {
      return Err(NetError::ToTransitionAlreadyRegistered {
        transition_id: transition_id.to_string(),
        place_id: self.id.clone(),
      });
    }
    self.to_transitions.push(transition);
    Ok(())
  }

  pub(crate) fn set_from_transition(&mut self, transition: TransitionIdx) -> Result<(), NetError> {
    if self.from_transition.is_some() {
      return Err(NetError::FromTransitionAlreadyRegistered {
        place_id: self.id.clone(),
      });
    }
    self.from_transition = Some(transition);
    Ok(())
  }
}

/// A transition consuming one chip from every input place and crediting
/// one pending chip per output place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
  id: String,
  from_places: Vec<PlaceIdx>,
  to_places: Vec<PlaceIdx>,
}

impl Transition {
  pub(crate) fn new(id: impl Into<String>, to_places: Vec<PlaceIdx>) -> Self {
    Self {
      id: id.into(),
      from_places: Vec::new(),
      to_places,
    }
  }

  pub fn id(&self) -> &str {
    &self.id
  }

  /// Input places. Several inputs make this transition a join.
  pub fn from_places(&self) -> &[PlaceIdx] {
    &self.from_places
  }

  /// Output places. Several outputs make this transition a fork.
  pub fn to_places(&self) -> &[PlaceIdx] {
    &self.to_places
  }

  pub fn is_join(&self) -> bool {
    self.from_places.len() > 1
  }

  pub fn is_fork(&self) -> bool {
    self.to_places.len() > 1
  }

  pub(crate) fn push_from_place(&mut self, place: PlaceIdx) {
    self.from_places.push(place);
  }
}
