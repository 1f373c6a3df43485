use goap_core::{Action, ActionId, Goal, GoalData, GoalId, WorldState};

/// The goals and actions injected into a planner.
///
/// Ids are indices into these lists and stay valid until the next injection.
#[derive(Debug, Default)]
pub struct BehaviorSet {
    pub(crate) goals: Vec<Goal>,
    pub(crate) actions: Vec<Action>,
}

impl BehaviorSet {
    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn goal(&self, id: GoalId) -> &Goal {
        &self.goals[id.0]
    }

    pub fn goal_mut(&mut self, id: GoalId) -> &mut Goal {
        &mut self.goals[id.0]
    }

    pub fn action(&self, id: ActionId) -> &Action {
        &self.actions[id.0]
    }

    pub fn action_mut(&mut self, id: ActionId) -> &mut Action {
        &mut self.actions[id.0]
    }

    pub fn goal_id(&self, name: &str) -> Option<GoalId> {
        self.goals.iter().position(|g| g.name() == name).map(GoalId)
    }

    pub fn action_id(&self, name: &str) -> Option<ActionId> {
        self.actions
            .iter()
            .position(|a| a.name() == name)
            .map(ActionId)
    }

    pub fn replace_goals(&mut self, goals: impl IntoIterator<Item = Goal>, world: &mut WorldState) {
        self.goals.clear();
        for mut goal in goals {
            goal.init(world);
            self.goals.push(goal);
        }
    }

    pub fn replace_actions(
        &mut self,
        actions: impl IntoIterator<Item = Action>,
        world: &mut WorldState,
    ) {
        self.actions.clear();
        for mut action in actions {
            action.init(world);
            self.actions.push(action);
        }
    }

    pub fn tick_goals(&mut self, world: &mut WorldState) {
        for goal in &mut self.goals {
            goal.tick(world);
        }
    }

    /// Goals that may be considered right now, highest priority first. Equal priorities keep
    /// injection order.
    pub fn runnable_goals(&self, world: &WorldState, out: &mut Vec<GoalId>) {
        out.clear();
        out.extend(
            self.goals
                .iter()
                .enumerate()
                .filter(|(_, g)| g.preconditions_satisfied(world))
                .map(|(i, _)| GoalId(i)),
        );
        out.sort_by(|a, b| {
            self.goal(*b)
                .priority(world)
                .total_cmp(&self.goal(*a).priority(world))
        });
    }

    /// One entry per goal, highest priority first.
    pub fn sorted_goal_data(&self, world: &WorldState) -> Vec<GoalData> {
        let mut data: Vec<GoalData> = self.goals.iter().map(|g| g.data(world)).collect();
        data.sort_by(|a, b| b.priority.total_cmp(&a.priority));
        data
    }
}
