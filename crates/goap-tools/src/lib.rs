//! Tracing and inspection primitives for the GOAP planner.
//!
//! External observers (visualizers, inspectors, replay tools) consume what this crate defines;
//! the planner itself only emits into a `TraceSink`.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod snapshot;
pub mod trace;

pub use snapshot::PlannerSnapshot;
pub use trace::{
    NullTraceSink, SharedTraceLog, TraceEvent, TraceKind, TraceLog, TraceSink, VecTraceSink,
};
