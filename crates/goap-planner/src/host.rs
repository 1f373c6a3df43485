//! State the planner shares with whatever embeds it.

use std::fmt;

use goap_core::WorldState;
use goap_tools::{NullTraceSink, TraceEvent, TraceKind, TraceSink};

use crate::PlannerConfig;

/// The embedding side of a planner: the live fact store, configuration, the activation flag,
/// and where update/reload notifications go.
pub struct Host {
    pub world: WorldState,
    config: PlannerConfig,
    is_active: bool,
    sink: Box<dyn TraceSink>,
    tick: u64,
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("world", &self.world)
            .field("config", &self.config)
            .field("is_active", &self.is_active)
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}

impl Host {
    pub fn new(world: WorldState, config: PlannerConfig) -> Self {
        let is_active = config.starts_active();
        Self {
            world,
            config,
            is_active,
            sink: Box::new(NullTraceSink),
            tick: 0,
        }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    pub fn tick_count(&self) -> u64 {
        self.tick
    }

    pub(crate) fn advance_tick(&mut self) {
        self.tick += 1;
    }

    pub fn set_sink(&mut self, sink: Box<dyn TraceSink>) {
        self.sink = sink;
    }

    pub fn log_active(&self) -> bool {
        self.config.log.active
    }

    pub fn log_search(&self) -> bool {
        self.config.log.search
    }

    pub fn log_fail(&self) -> bool {
        self.config.log.fail
    }

    pub fn emit(&mut self, kind: TraceKind, goal: Option<&str>, action: Option<&str>) {
        let mut event = TraceEvent::new(self.tick, kind);
        if let Some(goal) = goal {
            event = event.with_goal(goal);
        }
        if let Some(action) = action {
            event = event.with_action(action);
        }
        self.sink.emit(event);
    }
}
