use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Token ledger of one net.
///
/// Place chips count deposited chips; transition chips count output credits
/// a fired transition still owes to its output places.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
  #[serde(default)]
  pub place_chips: HashMap<String, u32>,
  #[serde(default)]
  pub transition_chips: HashMap<String, u32>,
  #[serde(default)]
  pub finished: bool,
}

impl State {
  pub fn chips_in_place(&self, place_id: &str) -> u32 {
    self.place_chips.get(place_id).copied().unwrap_or(0)
  }

  pub fn chips_in_transition(&self, transition_id: &str) -> u32 {
    self.transition_chips.get(transition_id).copied().unwrap_or(0)
  }

  /// True when no chip sits anywhere and the net is not finished.
  pub fn is_empty(&self) -> bool {
    !self.finished
      && self.place_chips.values().all(|&c| c == 0)
      && self.transition_chips.values().all(|&c| c == 0)
  }

  pub(crate) fn put_place_chip(&mut self, place_id: &str) {
    *self.place_chips.entry(place_id.to_string()).or_default() += 1;
  }

  pub(crate) fn take_place_chip(&mut self, place_id: &str) {
    if let Some(chips) = self.place_chips.get_mut(place_id) {
      *chips = chips.saturating_sub(1);
    }
  }

  pub(crate) fn credit_transition(&mut self, transition_id: &str, chips: u32) {
    *self
      .transition_chips
      .entry(transition_id.to_string())
      .or_default() += chips;
  }

  pub(crate) fn take_transition_chip(&mut self, transition_id: &str) {
    if let Some(chips) = self.transition_chips.get_mut(transition_id) {
      *chips = chips.saturating_sub(1);
    }
  }
}
