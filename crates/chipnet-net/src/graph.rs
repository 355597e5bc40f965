use std::collections::HashMap;

use chipnet_config::NetDef;

use crate::builder::GraphBuilder;
use crate::element::{Place, PlaceIdx, Transition, TransitionIdx};
use crate::error::NetError;

/// Immutable, linked topology of a net.
///
/// Places and transitions live in arenas and refer to each other by
/// handle. A graph is built once and shared (behind an `Arc`) by every net
/// instance created from it; nets keep their token ledgers separately.
#[derive(Debug, Clone)]
pub struct Graph {
  pub(crate) places: Vec<Place>,
  pub(crate) transitions: Vec<Transition>,
  pub(crate) place_registry: HashMap<String, PlaceIdx>,
  pub(crate) transition_registry: HashMap<String, TransitionIdx>,
  pub(crate) start: PlaceIdx,
}

impl Graph {
  /// Build and link a graph from a declarative definition.
  ///
  /// Any structural violation fails the whole build.
  pub fn from_def(def: &NetDef) -> Result<Self, NetError> {
    GraphBuilder::from_def(def)
  }

  pub fn start(&self) -> &Place {
    self.place(self.start)
  }

  pub fn start_idx(&self) -> PlaceIdx {
    self.start
  }

  /// Get a place by handle.
  ///
  /// Handles are only valid for the graph that issued them.
  pub fn place(&self, idx: PlaceIdx) -> &Place {
    &self.places[idx.0]
  }

  pub fn transition(&self, idx: TransitionIdx) -> &Transition {
    &self.transitions[idx.0]
  }

  pub fn place_idx(&self, place_id: &str) -> Option<PlaceIdx> {
    self.place_registry.get(place_id).copied()
  }

  pub fn transition_idx(&self, transition_id: &str) -> Option<TransitionIdx> {
    self.transition_registry.get(transition_id).copied()
  }

  /// Look up a place by id, failing if it is not registered.
  pub fn find_place(&self, place_id: &str) -> Result<PlaceIdx, NetError> {
    self
      .place_idx(place_id)
      .ok_or_else(|| NetError::place_not_registered(place_id))
  }

  pub fn get_place(&self, place_id: &str) -> Option<&Place> {
    self.place_idx(place_id).map(|idx| self.place(idx))
  }

  pub fn get_transition(&self, transition_id: &str) -> Option<&Transition> {
    self.transition_idx(transition_id).map(|idx| self.transition(idx))
  }

  /// The transition that produces chips for a place, if any.
  pub fn from_transition(&self, place: &Place) -> Option<&Transition> {
    place.from_transition().map(|idx| self.transition(idx))
  }

  pub fn places(&self) -> impl Iterator<Item = &Place> {
    self.places.iter()
  }

  pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
    self.transitions.iter()
  }

  pub fn finish_places(&self) -> impl Iterator<Item = &Place> {
    self.places.iter().filter(|p| p.is_finish())
  }

  pub fn place_count(&self) -> usize {
    self.places.len()
  }

  pub fn transition_count(&self) -> usize {
    self.transitions.len()
  }
}
