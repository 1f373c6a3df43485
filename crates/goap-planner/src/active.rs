//! The running (goal, plan) pair and the per-tick checks both backends apply to it.

use goap_core::{ActionId, GoalId, Plan, WorldState};
use goap_tools::TraceKind;
use tracing::info;

use crate::{BehaviorSet, Host};

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct StepPolicy {
    /// Jump forward instead of failing when the current step can no longer run.
    pub skip_ahead: bool,
    /// After ticking, move to the furthest later step that can already run.
    pub advance: bool,
}

#[derive(Debug)]
pub(crate) enum TickOutcome {
    Idle,
    Running { moved: bool },
    Ended(Plan),
}

#[derive(Debug, Default)]
pub(crate) struct ActivePlan {
    goal: Option<GoalId>,
    plan: Option<Plan>,
}

impl ActivePlan {
    pub fn goal(&self) -> Option<GoalId> {
        self.goal
    }

    pub fn plan(&self) -> Option<&Plan> {
        self.plan.as_ref()
    }

    pub fn action(&self) -> Option<ActionId> {
        self.goal?;
        self.plan.as_ref()?.active_action()
    }

    pub fn is_running(&self) -> bool {
        self.action().is_some()
    }

    pub fn tick(
        &mut self,
        behaviors: &mut BehaviorSet,
        host: &mut Host,
        policy: StepPolicy,
    ) -> TickOutcome {
        let (Some(goal), Some(mut current)) = (self.goal, self.action()) else {
            return TickOutcome::Idle;
        };

        if !behaviors.goal(goal).preconditions_satisfied(&host.world) {
            if host.log_active() {
                info!(
                    goal = behaviors.goal(goal).name(),
                    "goal failed as its preconditions are no longer satisfied"
                );
            }
            return self.ended(behaviors, host, TraceKind::PlanAborted);
        }

        let mut moved = false;
        if !behaviors.action(current).preconditions_satisfied(&host.world) {
            let next = if policy.skip_ahead {
                self.later_runnable_step(behaviors, &host.world, false)
            } else {
                None
            };
            let Some(next) = next.and_then(|index| self.move_to(index, behaviors, host)) else {
                if host.log_active() {
                    info!(
                        action = behaviors.action(current).name(),
                        "action failed as its preconditions are no longer satisfied"
                    );
                }
                return self.ended(behaviors, host, TraceKind::PlanAborted);
            };
            current = next;
            moved = true;
        }

        behaviors.action_mut(current).tick(&mut host.world);

        if behaviors.goal(goal).conditions_satisfied(&host.world) {
            if host.log_active() {
                info!(goal = behaviors.goal(goal).name(), "goal completed");
            }
            return self.ended(behaviors, host, TraceKind::PlanCompleted);
        }

        if policy.advance {
            if let Some(index) = self.later_runnable_step(behaviors, &host.world, true) {
                moved = self.move_to(index, behaviors, host).is_some();
            }
        }
        TickOutcome::Running { moved }
    }

    /// Index of a step after the cursor whose preconditions hold: the furthest one when
    /// `furthest` is set, otherwise the nearest.
    fn later_runnable_step(
        &self,
        behaviors: &BehaviorSet,
        world: &WorldState,
        furthest: bool,
    ) -> Option<usize> {
        let plan = self.plan.as_ref()?;
        let runnable = |i: &usize| {
            behaviors
                .action(plan.steps()[*i])
                .preconditions_satisfied(world)
        };
        let mut later = plan.active_index() + 1..plan.len();
        if furthest {
            later.rev().find(runnable)
        } else {
            later.find(runnable)
        }
    }

    fn move_to(
        &mut self,
        index: usize,
        behaviors: &mut BehaviorSet,
        host: &mut Host,
    ) -> Option<ActionId> {
        let plan = self.plan.as_mut()?;
        let next = *plan.steps().get(index)?;
        if let Some(previous) = plan.active_action() {
            if host.log_active() {
                info!(action = behaviors.action(previous).name(), "stopping action");
            }
            behaviors.action_mut(previous).deactivate(&mut host.world);
        }
        plan.set_active_index(index);
        if host.log_active() {
            info!(action = behaviors.action(next).name(), "moving to new action");
        }
        behaviors.action_mut(next).activate(&mut host.world);
        self.notify(behaviors, host, TraceKind::PlanUpdated);
        Some(next)
    }

    fn ended(&mut self, behaviors: &mut BehaviorSet, host: &mut Host, kind: TraceKind) -> TickOutcome {
        match self.finish(behaviors, host, kind) {
            Some(plan) => TickOutcome::Ended(plan),
            None => TickOutcome::Idle,
        }
    }

    /// Deactivate the running action and goal and clear both. Returns the plan for recycling.
    pub fn finish(
        &mut self,
        behaviors: &mut BehaviorSet,
        host: &mut Host,
        kind: TraceKind,
    ) -> Option<Plan> {
        let goal = self.goal.take();
        let plan = self.plan.take();
        if let Some(action) = plan.as_ref().and_then(Plan::active_action) {
            behaviors.action_mut(action).deactivate(&mut host.world);
        }
        if let Some(goal) = goal {
            behaviors.goal_mut(goal).deactivate(&mut host.world);
            host.emit(kind, Some(behaviors.goal(goal).name()), None);
        }
        plan
    }

    /// Replace the running pair. The previous goal and action are deactivated, then the new goal
    /// and the plan's first step are activated. Returns the previous plan for recycling.
    pub fn start(
        &mut self,
        goal: GoalId,
        plan: Plan,
        behaviors: &mut BehaviorSet,
        host: &mut Host,
    ) -> Option<Plan> {
        if let Some(previous) = self.goal {
            behaviors.goal_mut(previous).deactivate(&mut host.world);
        }
        if let Some(action) = self.plan.as_ref().and_then(Plan::active_action) {
            behaviors.action_mut(action).deactivate(&mut host.world);
        }
        let previous = self.plan.replace(plan);
        self.goal = Some(goal);

        if host.log_active() {
            info!(goal = behaviors.goal(goal).name(), "starting new plan");
        }
        behaviors.goal_mut(goal).activate(&mut host.world);
        if let Some(first) = self.plan.as_ref().and_then(Plan::first) {
            if host.log_active() {
                info!(action = behaviors.action(first).name(), "starting action");
            }
            behaviors.action_mut(first).activate(&mut host.world);
        }
        self.notify(behaviors, host, TraceKind::PlanUpdated);
        previous
    }

    /// Keep the goal but swap in a new plan, restarting at its first step.
    pub fn switch_plan(
        &mut self,
        plan: Plan,
        behaviors: &mut BehaviorSet,
        host: &mut Host,
    ) -> Option<Plan> {
        if let Some(action) = self.action() {
            behaviors.action_mut(action).deactivate(&mut host.world);
        }
        let previous = self.plan.replace(plan);
        if let Some(first) = self.plan.as_ref().and_then(Plan::first) {
            if host.log_active() {
                info!(action = behaviors.action(first).name(), "starting action");
            }
            behaviors.action_mut(first).activate(&mut host.world);
        }
        self.notify(behaviors, host, TraceKind::PlanUpdated);
        previous
    }

    fn notify(&self, behaviors: &BehaviorSet, host: &mut Host, kind: TraceKind) {
        let goal = self.goal.map(|g| behaviors.goal(g).name());
        let action = self.action().map(|a| behaviors.action(a).name());
        host.emit(kind, goal, action);
    }
}
