//! Graph construction.

use std::collections::{HashMap, HashSet};

use chipnet_config::NetDef;

use crate::element::{Place, PlaceIdx, Transition, TransitionIdx};
use crate::error::NetError;
use crate::graph::Graph;

/// Incrementally links places and transitions into a [`Graph`].
///
/// Every call checks its arguments before touching the builder, so a
/// rejected call leaves it exactly as it was.
#[derive(Debug, Default)]
pub struct GraphBuilder {
  places: Vec<Place>,
  transitions: Vec<Transition>,
  place_registry: HashMap<String, PlaceIdx>,
  transition_registry: HashMap<String, TransitionIdx>,
  start: Option<PlaceIdx>,
}

impl GraphBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build a graph from a declarative definition.
  pub fn from_def(def: &NetDef) -> Result<Graph, NetError> {
    let finish: HashSet<&str> = def.finish.iter().map(String::as_str).collect();

    let mut builder = Self::new();
    for place_id in &def.places {
      builder.add_place(place_id, finish.contains(place_id.as_str()))?;
    }

    if let Some(unknown) = def.finish.iter().find(|id| !builder.has_place(id)) {
      return Err(NetError::place_not_registered(unknown.as_str()));
    }

    builder.set_start(&def.start)?;

    for (transition_id, transition) in &def.transitions {
      builder.add_transition(
        transition_id,
        transition.from.as_slice(),
        transition.to.as_slice(),
      )?;
    }

    builder.build()
  }

  pub fn has_place(&self, place_id: &str) -> bool {
    self.place_registry.contains_key(place_id)
  }

  pub fn add_place(&mut self, place_id: &str, is_finish: bool) -> Result<PlaceIdx, NetError> {
    if self.has_place(place_id) {
      return Err(NetError::PlaceAlreadyRegistered {
        place_id: place_id.to_string(),
      });
    }

    let idx = PlaceIdx(self.places.len());
    self.places.push(Place::new(place_id, is_finish));
    self.place_registry.insert(place_id.to_string(), idx);
    Ok(idx)
  }

  pub fn set_start(&mut self, place_id: &str) -> Result<(), NetError> {
    self.start = Some(self.find_place(place_id)?);
    Ok(())
  }

  /// Link a transition between its input and output places.
  ///
  /// The transition becomes the sole producer of every output place and an
  /// outgoing transition of every input place.
  pub fn add_transition<S: AsRef<str>>(
    &mut self,
    transition_id: &str,
    from: &[S],
    to: &[S],
  ) -> Result<TransitionIdx, NetError> {
    let to_places = self.resolve_outputs(to)?;

    if self.transition_registry.contains_key(transition_id) {
      return Err(NetError::TransitionAlreadyRegistered {
        transition_id: transition_id.to_string(),
      });
    }

    let from_places = self.resolve_inputs(transition_id, from)?;

    let idx = TransitionIdx(self.transitions.len());
    for place in &to_places {
      self.places[place.0].set_from_transition(idx)?;
    }
    self
      .transition_registry
      .insert(transition_id.to_string(), idx);
    self.transitions.push(Transition::new(transition_id, to_places));
    for place in from_places {
      self.places[place.0].add_to_transition(idx, transition_id)?;
      self.transitions[idx.0].push_from_place(place);
    }

    Ok(idx)
  }

  pub fn build(self) -> Result<Graph, NetError> {
    let start = self.start.ok_or(NetError::MissingStartPlace)?;
    Ok(Graph {
      places: self.places,
      transitions: self.transitions,
      place_registry: self.place_registry,
      transition_registry: self.transition_registry,
      start,
    })
  }

  /// Output places, each unknown to any producer so far.
  fn resolve_outputs<S: AsRef<str>>(&self, to: &[S]) -> Result<Vec<PlaceIdx>, NetError> {
    let mut places = Vec::with_capacity(to.len());
    for place_id in to {
      let place = self.find_place(place_id.as_ref())?;
      if self.places[place.0].from_transition().is_some() || places.contains(&place) {
        return Err(NetError::FromTransitionAlreadyRegistered {
          place_id: place_id.as_ref().to_string(),
        });
      }
      places.push(place);
    }
    Ok(places)
  }

  /// Input places, each listed once.
  fn resolve_inputs<S: AsRef<str>>(
    &self,
    transition_id: &str,
    from: &[S],
  ) -> Result<Vec<PlaceIdx>, NetError> {
    let mut places = Vec::with_capacity(from.len());
    for place_id in from {
      let place = self.find_place(place_id.as_ref())?;
      if places.contains(&place) {
        return Err(NetError::ToTransitionAlreadyRegistered {
          transition_id: transition_id.to_string(),
          place_id: place_id.as_ref().to_string(),
        });
      }
      places.push(place);
    }
    Ok(places)
  }

  fn find_place(&self, place_id: &str) -> Result<PlaceIdx, NetError> {
    self
      .place_registry
      .get(place_id)
      .copied()
      .ok_or_else(|| NetError::place_not_registered(place_id))
  }
}
