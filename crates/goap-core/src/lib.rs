//! Fact store, canonical facts, pooling and behavior contracts for GOAP planning.
//!
//! Nothing in this crate searches; it only describes the world (`WorldState`), what behaviors
//! need and provide (`Action`, `Goal`), and the reusable scratch storage the planners build on.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod facts;
pub mod goal;
pub mod math;
pub mod plan;
pub mod pool;
pub mod state;
pub mod world;

pub use action::{Action, ActionBehavior, ActionId, StaticAction};
pub use facts::{FactMap, GlobalStates, StateSet};
pub use goal::{Goal, GoalBehavior, GoalData, GoalId, StaticGoal};
pub use math::Vec3;
pub use plan::Plan;
pub use pool::{Handle, ListPool, Pool, Poolable};
pub use state::State;
pub use world::WorldState;
