//! Chipnet Net
//!
//! This crate provides the execution engine for workflow-style process
//! graphs modeled as a restricted Petri net.
//!
//! # Architecture
//!
//! ```text
//! NetDef ──GraphBuilder──▶ Arc<Graph> (places, transitions, read-only)
//!                              │
//!                              ▼
//!                            Net ◀── Consumer (policy hooks)
//!                            ├── start()
//!                            ├── set_place(id) -> finished?
//!                            ├── state() / error()
//!                            └── reset()
//! ```
//!
//! Places hold at most one chip at a time in practice. A fired transition
//! owes one chip to each output place; the caller moves each of them with
//! `set_place`, and the net rejects deposits its producing transition does
//! not owe. When a place feeds several transitions the consumer must
//! enable exactly one of them.
//!
//! Not supported: OR-joins and more than one chip in the start place.
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use chipnet_net::{AllowAll, Net};
//!
//! let mut net = Net::build(&def)?.with_consumer(Arc::new(AllowAll));
//! net.start()?;
//! net.set_place("branch1Place1")?;
//! let finished = net.set_place("placeFinish")?;
//! ```

mod builder;
mod consumer;
mod element;
mod error;
mod graph;
mod net;
mod state;

pub use builder::GraphBuilder;
pub use consumer::{AllowAll, Consumer, RouteConsumer};
pub use element::{Place, PlaceIdx, Transition, TransitionIdx};
pub use error::{ErrorCode, HookError, NetError};
pub use graph::Graph;
pub use net::Net;
pub use state::State;
