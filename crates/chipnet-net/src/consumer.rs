//! The consumer contract.
//!
//! A consumer is the external policy a net consults on every state change.
//! The net validates and accounts chips; the consumer decides which branch
//! of an exclusive choice is taken and may veto places and transitions.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

use crate::error::HookError;

/// Decision and notification hooks called by a net, in this order per
/// deposit: `before_place`, `after_place`, `can_transit` for every outgoing
/// transition, then `before_transit` and `after_transit` if one fires.
///
/// Hooks take `&self` so one consumer can be shared by many nets; stateful
/// implementations use interior mutability.
pub trait Consumer: Send + Sync {
  /// Called before a chip is deposited. An error aborts the deposit and
  /// poisons the net.
  fn before_place(&self, _place_id: &str) -> Result<(), HookError> {
    Ok(())
  }

  /// Called after a chip is deposited.
  fn after_place(&self, _place_id: &str) {}

  /// Whether a transition may fire now. Exactly one outgoing transition of
  /// a non-terminal place must answer true.
  fn can_transit(&self, transition_id: &str) -> bool;

  /// Called before a ready transition fires. An error poisons the net.
  fn before_transit(&self, _transition_id: &str) -> Result<(), HookError> {
    Ok(())
  }

  /// Called after a transition fired.
  fn after_transit(&self, _transition_id: &str) {}
}

/// A consumer that enables every transition.
///
/// Only suitable for nets without exclusive choices: a place with several
/// outgoing transitions poisons the net.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Consumer for AllowAll {
  fn can_transit(&self, _transition_id: &str) -> bool {
    true
  }
}

/// A rule-driven consumer routing chips through an allow-list of transitions.
///
/// Routes can be changed while a net runs, e.g. to pick a branch right
/// before depositing into the choice place. Places and transitions can be
/// blocked, which makes the matching `before_*` hook fail.
#[derive(Debug, Default)]
pub struct RouteConsumer {
  routes: RwLock<HashSet<String>>,
  blocked_places: RwLock<HashSet<String>>,
  blocked_transitions: RwLock<HashSet<String>>,
}

impl RouteConsumer {
  pub fn new() -> Self {
    Self::default()
  }

  /// Create a consumer with an initial set of allowed transitions.
  pub fn with_routes<I, S>(routes: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      routes: RwLock::new(routes.into_iter().map(Into::into).collect()),
      ..Self::default()
    }
  }

  pub fn allow(&self, transition_id: impl Into<String>) {
    write(&self.routes).insert(transition_id.into());
  }

  pub fn disallow(&self, transition_id: &str) {
    write(&self.routes).remove(transition_id);
  }

  /// Replace one route by another, typically at an exclusive choice.
  pub fn switch(&self, from: &str, to: impl Into<String>) {
    let mut routes = write(&self.routes);
    routes.remove(from);
    routes.insert(to.into());
  }

  pub fn is_allowed(&self, transition_id: &str) -> bool {
    read(&self.routes).contains(transition_id)
  }

  pub fn block_place(&self, place_id: impl Into<String>) {
    write(&self.blocked_places).insert(place_id.into());
  }

  pub fn block_transition(&self, transition_id: impl Into<String>) {
    write(&self.blocked_transitions).insert(transition_id.into());
  }

  pub fn unblock_place(&self, place_id: &str) {
    write(&self.blocked_places).remove(place_id);
  }

  pub fn unblock_transition(&self, transition_id: &str) {
    write(&self.blocked_transitions).remove(transition_id);
  }
}

impl Consumer for RouteConsumer {
  fn before_place(&self, place_id: &str) -> Result<(), HookError> {
    if read(&self.blocked_places).contains(place_id) {
      return Err(HookError::new(format!("place '{place_id}' is blocked")));
    }
    Ok(())
  }

  fn can_transit(&self, transition_id: &str) -> bool {
    self.is_allowed(transition_id)
  }

  fn before_transit(&self, transition_id: &str) -> Result<(), HookError> {
    if read(&self.blocked_transitions).contains(transition_id) {
      return Err(HookError::new(format!(
        "transition '{transition_id}' is blocked"
      )));
    }
    Ok(())
  }
}

fn read(lock: &RwLock<HashSet<String>>) -> std::sync::RwLockReadGuard<'_, HashSet<String>> {
  lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(lock: &RwLock<HashSet<String>>) -> std::sync::RwLockWriteGuard<'_, HashSet<String>> {
  lock.write().unwrap_or_else(PoisonError::into_inner)
}
