//! Search strategies.
//!
//! The planner only talks to the [`Backend`] trait; each backend owns the injected behaviors, the
//! running plan and whatever scratch state its search needs.

pub mod graph;
pub mod sequential;

use goap_core::{GoalId, Plan};

use crate::{BackendKind, BehaviorSet, Host};

pub trait Backend {
    fn kind(&self) -> BackendKind;

    fn behaviors(&self) -> &BehaviorSet;

    fn behaviors_mut(&mut self) -> &mut BehaviorSet;

    fn active_goal(&self) -> Option<GoalId>;

    fn active_plan(&self) -> Option<&Plan>;

    fn active_action_index(&self) -> usize {
        self.active_plan().map_or(0, Plan::active_index)
    }

    /// Re-enable a planner configured for manual activation.
    fn manual_activate(&mut self, host: &mut Host);

    /// Tick goals and the active plan, then search (or submit searches).
    fn update(&mut self, host: &mut Host);

    /// Synchronize outstanding searches and apply their result.
    fn late_update(&mut self, _host: &mut Host) {}

    /// Deactivate the running action and goal and drop the plan.
    fn abort_active_plan(&mut self, host: &mut Host);

    /// Called after the goal or action set was replaced.
    fn on_behaviors_injected(&mut self, _host: &mut Host) {}

    /// Force-complete anything still running in the background.
    fn disable(&mut self, _host: &mut Host) {}
}
