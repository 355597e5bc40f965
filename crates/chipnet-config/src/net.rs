use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Declarative definition of a net.
///
/// ```json
/// {
///   "start": "placeStart",
///   "finish": ["placeFinish"],
///   "places": ["placeStart", "placeFinish"],
///   "transitions": {
///     "start__finish": { "from": ["placeStart"], "to": ["placeFinish"] }
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetDef {
  /// Place that receives the single chip when a net starts.
  pub start: String,
  /// Terminal places. Depositing a chip here finishes the net.
  #[serde(default)]
  pub finish: Vec<String>,
  /// Every place of the net, in declaration order.
  pub places: Vec<String>,
  /// Transitions keyed by id. Ordered so that builds are deterministic.
  #[serde(default)]
  pub transitions: BTreeMap<String, TransitionDef>,
}

/// Input and output places of one transition.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionDef {
  #[serde(default)]
  pub from: Vec<String>,
  #[serde(default)]
  pub to: Vec<String>,
}

impl TransitionDef {
  pub fn new<F, T>(from: F, to: T) -> Self
  where
    F: IntoIterator,
    F::Item: Into<String>,
    T: IntoIterator,
    T::Item: Into<String>,
  {
    Self {
      from: from.into_iter().map(Into::into).collect(),
      to: to.into_iter().map(Into::into).collect(),
    }
  }
}

impl NetDef {
  pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
    Ok(serde_json::from_str(json)?)
  }

  pub fn from_json_slice(json: &[u8]) -> Result<Self, ConfigError> {
    Ok(serde_json::from_slice(json)?)
  }

  /// Read and parse a JSON definition file.
  pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json_slice(&content)
  }

  /// Check whether a place id is listed as terminal.
  pub fn is_finish(&self, place_id: &str) -> bool {
    self.finish.iter().any(|p| p == place_id)
  }
}
