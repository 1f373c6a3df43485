use std::sync::Arc;

use goap_core::{Action, ActionId, Goal, GoalData, GoalId, Plan, WorldState};
use goap_tools::{PlannerSnapshot, TraceKind, TraceSink};
use tracing::info;

use crate::{
    Backend, BackendKind, BehaviorSet, GoapError, GraphBackend, Host, PlannerConfig, Result,
    SequentialBackend,
};

/// Picks a goal, finds a plan for it and runs the plan, one tick at a time.
///
/// Call [`Planner::update`] then [`Planner::late_update`] once per frame, or [`Planner::tick`]
/// for both. The sequential backend does all of its work in `update`; the graph backend submits
/// its searches in `update` and applies them in `late_update`.
pub struct Planner {
    host: Host,
    backend: Box<dyn Backend>,
}

impl std::fmt::Debug for Planner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Planner")
            .field("host", &self.host)
            .field("backend", &self.backend.kind())
            .field("active_goal", &self.backend.active_goal())
            .finish()
    }
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Result<Self> {
        let world = WorldState::with_default_false(config.default_false);
        Self::with_world(world, config)
    }

    /// Use an existing fact store, for example one bound to a shared global scope.
    pub fn with_world(world: WorldState, config: PlannerConfig) -> Result<Self> {
        let backend: Box<dyn Backend> = match config.backend {
            BackendKind::Sequential => Box::new(SequentialBackend::new()),
            BackendKind::Graph => {
                let pool = match config.worker_threads {
                    Some(threads) => Some(Arc::new(
                        rayon::ThreadPoolBuilder::new()
                            .num_threads(threads)
                            .thread_name(|i| format!("goap-search-{i}"))
                            .build()?,
                    )),
                    None => None,
                };
                Box::new(GraphBackend::new(pool))
            }
        };
        Ok(Self {
            host: Host::new(world, config),
            backend,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        self.host.config()
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn world(&self) -> &WorldState {
        &self.host.world
    }

    pub fn world_mut(&mut self) -> &mut WorldState {
        &mut self.host.world
    }

    /// Receives update, completion and reload notifications.
    pub fn set_trace_sink(&mut self, sink: impl TraceSink + 'static) {
        self.host.set_sink(Box::new(sink));
    }

    pub fn behaviors(&self) -> &BehaviorSet {
        self.backend.behaviors()
    }

    /// Replace every goal. Aborts the running plan first.
    pub fn inject_goals(&mut self, goals: impl IntoIterator<Item = Goal>) {
        self.backend.abort_active_plan(&mut self.host);
        self.backend
            .behaviors_mut()
            .replace_goals(goals, &mut self.host.world);
        self.reloaded();
    }

    /// Replace every action. Aborts the running plan first.
    pub fn inject_actions(&mut self, actions: impl IntoIterator<Item = Action>) {
        self.backend.abort_active_plan(&mut self.host);
        self.backend
            .behaviors_mut()
            .replace_actions(actions, &mut self.host.world);
        self.reloaded();
    }

    pub fn inject(
        &mut self,
        goals: impl IntoIterator<Item = Goal>,
        actions: impl IntoIterator<Item = Action>,
    ) {
        self.backend.abort_active_plan(&mut self.host);
        let behaviors = self.backend.behaviors_mut();
        behaviors.replace_goals(goals, &mut self.host.world);
        behaviors.replace_actions(actions, &mut self.host.world);
        self.reloaded();
    }

    fn reloaded(&mut self) {
        self.backend.on_behaviors_injected(&mut self.host);
        if self.host.log_active() {
            let behaviors = self.backend.behaviors();
            info!(
                goals = behaviors.goals().len(),
                actions = behaviors.actions().len(),
                "behaviors injected"
            );
        }
        self.host.emit(TraceKind::BehaviorsReloaded, None, None);
    }

    pub fn update(&mut self) {
        self.host.advance_tick();
        self.backend.update(&mut self.host);
    }

    pub fn late_update(&mut self) {
        self.backend.late_update(&mut self.host);
    }

    pub fn tick(&mut self) {
        self.update();
        self.late_update();
    }

    pub fn is_active(&self) -> bool {
        self.host.is_active()
    }

    pub fn manual_activate(&mut self) {
        self.backend.manual_activate(&mut self.host);
    }

    pub fn abort_active_plan(&mut self) {
        self.backend.abort_active_plan(&mut self.host);
    }

    /// Wait for any search still running in the background.
    pub fn disable(&mut self) {
        self.backend.disable(&mut self.host);
    }

    pub fn goal_id(&self, name: &str) -> Result<GoalId> {
        self.behaviors()
            .goal_id(name)
            .ok_or_else(|| GoapError::UnknownGoal(name.to_string()))
    }

    pub fn action_id(&self, name: &str) -> Result<ActionId> {
        self.behaviors()
            .action_id(name)
            .ok_or_else(|| GoapError::UnknownAction(name.to_string()))
    }

    pub fn active_goal_id(&self) -> Option<GoalId> {
        self.backend.active_goal()
    }

    pub fn active_goal(&self) -> Option<&Goal> {
        self.active_goal_id().map(|id| self.behaviors().goal(id))
    }

    pub fn active_plan(&self) -> Option<&Plan> {
        self.backend.active_plan()
    }

    pub fn active_action_index(&self) -> usize {
        self.backend.active_action_index()
    }

    pub fn active_action(&self) -> Option<&Action> {
        self.backend.active_goal()?;
        let action = self.active_plan()?.active_action()?;
        Some(self.behaviors().action(action))
    }

    /// Names of the active plan's steps, first step first.
    pub fn active_plan_names(&self) -> Vec<String> {
        self.active_plan()
            .map(|plan| {
                plan.steps()
                    .iter()
                    .map(|id| self.behaviors().action(*id).name().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// One entry per goal, highest priority first.
    pub fn sorted_goal_data(&self) -> Vec<GoalData> {
        self.behaviors().sorted_goal_data(&self.host.world)
    }

    pub fn snapshot(&self) -> PlannerSnapshot {
        PlannerSnapshot {
            tick: self.host.tick_count(),
            goals: self.sorted_goal_data(),
            active_goal: self.active_goal().map(|g| g.name().to_string()),
            active_plan: self.active_plan_names(),
            active_action_index: self.active_action_index(),
        }
    }
}
