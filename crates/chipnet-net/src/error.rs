//! Net errors.

use serde::Serialize;
use thiserror::Error;

/// Stable discriminant of a [`NetError`], for callers that match on kind
/// rather than on payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
  PlaceAlreadyRegistered,
  TransitionAlreadyRegistered,
  PlaceNotRegistered,
  MissingStartPlace,
  UnexpectedAvailableTransitions,
  NoChipForPlace,
  PlaceHasNoProducer,
  NetInErrorState,
  BeforePlaceFailed,
  BeforeTransitFailed,
  Finished,
  FromTransitionAlreadyRegistered,
  ToTransitionAlreadyRegistered,
  ConsumerNotSet,
}

/// Errors that can occur while building or driving a net.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetError {
  /// Two places were declared with one id.
  #[error("place '{place_id}' already registered")]
  PlaceAlreadyRegistered { place_id: String },

  /// Two transitions were declared with one id.
  #[error("transition '{transition_id}' already registered")]
  TransitionAlreadyRegistered { transition_id: String },

  /// A definition or a caller referenced an unknown place.
  #[error("place '{place_id}' not registered")]
  PlaceNotRegistered { place_id: String },

  /// The builder was finished without a start place.
  #[error("start place not set")]
  MissingStartPlace,

  /// The consumer enabled zero or several outgoing transitions of a place.
  #[error(
    "unexpected number of available transitions after place '{place_id}', expected 1, got {count}"
  )]
  UnexpectedAvailableTransitions { place_id: String, count: usize },

  /// The producing transition of a place holds no pending output chip.
  #[error("no chip available for place '{place_id}' from its producing transition '{transition_id}'")]
  NoChipForPlace {
    place_id: String,
    transition_id: String,
  },

  /// A non-start place that no transition produces can never receive a chip.
  #[error("place '{place_id}' has no producing transition")]
  PlaceHasNoProducer { place_id: String },

  /// The net was poisoned by an earlier failure; see `Net::error`.
  #[error("net in error state")]
  NetInErrorState,

  #[error("before-place hook rejected place '{place_id}'")]
  BeforePlaceFailed {
    place_id: String,
    #[source]
    source: HookError,
  },

  #[error("before-transit hook rejected transition '{transition_id}'")]
  BeforeTransitFailed {
    transition_id: String,
    #[source]
    source: HookError,
  },

  /// A terminal place was reached; the net accepts no more chips.
  #[error("net is finished")]
  Finished,

  /// The place is already the output of another transition.
  #[error("from-transition already registered for place '{place_id}'")]
  FromTransitionAlreadyRegistered { place_id: String },

  /// The transition is already listed as an outgoing transition of the place.
  #[error("to-transition '{transition_id}' already registered for place '{place_id}'")]
  ToTransitionAlreadyRegistered {
    transition_id: String,
    place_id: String,
  },

  #[error("consumer not set")]
  ConsumerNotSet,
}

impl NetError {
  pub fn code(&self) -> ErrorCode {
    match self {
      Self::PlaceAlreadyRegistered { .. } => ErrorCode::PlaceAlreadyRegistered,
      Self::TransitionAlreadyRegistered { .. } => ErrorCode::TransitionAlreadyRegistered,
      Self::PlaceNotRegistered { .. } => ErrorCode::PlaceNotRegistered,
      Self::MissingStartPlace => ErrorCode::MissingStartPlace,
      Self::UnexpectedAvailableTransitions { .. } => ErrorCode::UnexpectedAvailableTransitions,
      Self::NoChipForPlace { .. } => ErrorCode::NoChipForPlace,
      Self::PlaceHasNoProducer { .. } => ErrorCode::PlaceHasNoProducer,
      Self::NetInErrorState => ErrorCode::NetInErrorState,
      Self::BeforePlaceFailed { .. } => ErrorCode::BeforePlaceFailed,
      Self::BeforeTransitFailed { .. } => ErrorCode::BeforeTransitFailed,
      Self::Finished => ErrorCode::Finished,
      Self::FromTransitionAlreadyRegistered { .. } => ErrorCode::FromTransitionAlreadyRegistered,
      Self::ToTransitionAlreadyRegistered { .. } => ErrorCode::ToTransitionAlreadyRegistered,
      Self::ConsumerNotSet => ErrorCode::ConsumerNotSet,
    }
  }

  pub fn is(&self, code: ErrorCode) -> bool {
    self.code() == code
  }

  pub(crate) fn place_not_registered(place_id: impl Into<String>) -> Self {
    Self::PlaceNotRegistered {
      place_id: place_id.into(),
    }
  }
}

/// Error returned by a consumer hook to veto a place or a transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HookError {
  message: String,
}

impl HookError {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }

  pub fn message(&self) -> &str {
    &self.message
  }
}
