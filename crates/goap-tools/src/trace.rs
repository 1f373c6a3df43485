#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TraceKind {
    /// The active goal, plan or running action changed.
    PlanUpdated,
    /// The injected goal/action sets were replaced.
    BehaviorsReloaded,
    /// The active goal's conditions were met.
    PlanCompleted,
    /// The active plan was dropped before completion.
    PlanAborted,
}

/// A planner notification.
///
/// Plain data so it can be recorded during simulation and rendered later.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceEvent {
    pub tick: u64,
    pub kind: TraceKind,
    pub goal: Option<String>,
    pub action: Option<String>,
}

impl TraceEvent {
    pub fn new(tick: u64, kind: TraceKind) -> Self {
        Self {
            tick,
            kind,
            goal: None,
            action: None,
        }
    }

    pub fn with_goal(mut self, goal: impl Into<String>) -> Self {
        self.goal = Some(goal.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

#[derive(Debug, Default)]
pub struct NullTraceSink;

impl TraceSink for NullTraceSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

#[derive(Debug, Default)]
pub struct VecTraceSink {
    pub events: Vec<TraceEvent>,
}

impl TraceSink for VecTraceSink {
    fn emit(&mut self, event: TraceEvent) {
        self.events.push(event);
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TraceLog {
    pub events: Vec<TraceEvent>,
}

impl TraceLog {
    pub fn push(&mut self, event: TraceEvent) {
        self.events.push(event);
    }

    pub fn count(&self, kind: TraceKind) -> usize {
        self.events.iter().filter(|e| e.kind == kind).count()
    }

    pub fn last(&self) -> Option<&TraceEvent> {
        self.events.last()
    }
}

/// A `TraceLog` the planner writes into while the caller keeps a handle to read it.
#[derive(Debug, Default, Clone)]
pub struct SharedTraceLog {
    inner: Arc<Mutex<TraceLog>>,
}

impl SharedTraceLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recovers the log from a poisoned lock.
    fn lock(&self) -> MutexGuard<'_, TraceLog> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of everything recorded so far.
    pub fn snapshot(&self) -> TraceLog {
        self.lock().clone()
    }

    pub fn clear(&self) {
        self.lock().events.clear();
    }
}

impl TraceSink for SharedTraceLog {
    fn emit(&mut self, event: TraceEvent) {
        self.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poison(log: &SharedTraceLog) {
        let inner = Arc::clone(&log.inner);
        let _ = std::thread::spawn(move || {
            let _guard = inner.lock().expect("lock");
            panic!("poison the trace log");
        })
        .join();
        assert!(log.inner.is_poisoned());
    }

    #[test]
    fn poisoned_log_keeps_recording() {
        let mut log = SharedTraceLog::new();
        log.emit(TraceEvent::new(1, TraceKind::BehaviorsReloaded));
        poison(&log);

        log.emit(TraceEvent::new(2, TraceKind::PlanUpdated));
        assert_eq!(log.snapshot().events.len(), 2);

        log.clear();
        assert!(log.snapshot().events.is_empty());
    }
}
