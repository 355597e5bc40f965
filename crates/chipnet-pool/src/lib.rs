//! Chipnet Pool
//!
//! Two strategies for handing out ready-to-drive nets:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                         NetPool                          │
//! │  - init(def) builds the graph once, `size` nets over it  │
//! │  - get() waits at most `get_timeout` for a free net      │
//! │  - PooledNet resets and returns the net on drop          │
//! └──────────────────────────────────────────────────────────┘
//!
//! ┌──────────────────────────────────────────────────────────┐
//! │                        NetFactory                        │
//! │  - run(cancel) keeps a bounded queue of fresh nets full  │
//! │  - get() waits until a net is prepared                   │
//! │  - nets are consumed, never returned                     │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Both are `Send + Sync` and meant to be shared through an `Arc`.

mod error;
mod factory;
mod pool;

pub use error::PoolError;
pub use factory::NetFactory;
pub use pool::{NetPool, PooledNet};
