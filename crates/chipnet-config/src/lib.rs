//! Chipnet Config
//!
//! This crate contains the serializable definition types for chipnet.
//! These types describe a net before it is built into a linked graph by
//! `chipnet-net`.
//!
//! Definitions can be loaded from:
//! - JSON files (via CLI with `chipnet run net.json`)
//! - Any JSON blob (database storage, embedded strings)
//!
//! The builder takes a [`NetDef`], validates its structure and resolves it
//! into an immutable graph that many net instances can share.

mod error;
mod net;
mod pool;

pub use error::ConfigError;
pub use net::{NetDef, TransitionDef};
pub use pool::{DEFAULT_GET_TIMEOUT_MS, DEFAULT_POOL_SIZE, PoolConfig};
