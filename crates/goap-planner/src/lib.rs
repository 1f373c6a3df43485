//! Goal-oriented action planner.
//!
//! A [`Planner`] owns the injected goals and actions, picks the highest-priority goal that has a
//! workable plan, and drives that plan one action per tick. Search runs through one of two
//! [`Backend`]s: a synchronous backward-chaining search, or a precomputed action/condition graph
//! searched in parallel on a rayon pool.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

mod active;
pub mod backend;
pub mod behaviors;
pub mod config;
pub mod error;
pub mod host;
pub mod planner;
pub mod scratch;

pub use backend::graph::{GraphBackend, GraphIndex};
pub use backend::sequential::SequentialBackend;
pub use backend::Backend;
pub use behaviors::BehaviorSet;
pub use config::{BackendKind, LogConfig, PlannerConfig, SearchMode, TickConfig};
pub use error::{GoapError, Result};
pub use host::Host;
pub use planner::Planner;
pub use scratch::{SearchNode, StateDelta};
