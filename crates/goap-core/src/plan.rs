use crate::ActionId;

/// An ordered action sequence plus the cursor of the step currently running.
///
/// Steps refer to actions by index; the actions themselves stay owned by the planner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    steps: Vec<ActionId>,
    active_index: usize,
}

impl Plan {
    pub fn new(steps: Vec<ActionId>) -> Self {
        Self {
            steps,
            active_index: 0,
        }
    }

    pub fn steps(&self) -> &[ActionId] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active_index
    }

    pub fn active_action(&self) -> Option<ActionId> {
        self.steps.get(self.active_index).copied()
    }

    pub fn first(&self) -> Option<ActionId> {
        self.steps.first().copied()
    }

    /// Move the cursor. Out-of-range indices are ignored.
    pub fn set_active_index(&mut self, index: usize) -> bool {
        if index >= self.steps.len() {
            return false;
        }
        self.active_index = index;
        true
    }

    pub fn into_steps(self) -> Vec<ActionId> {
        self.steps
    }
}
