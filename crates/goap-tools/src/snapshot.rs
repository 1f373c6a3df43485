use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use goap_core::GoalData;

/// Read-only view of a planner for debug tooling.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PlannerSnapshot {
    pub tick: u64,
    /// Sorted by descending priority.
    pub goals: Vec<GoalData>,
    pub active_goal: Option<String>,
    pub active_plan: Vec<String>,
    pub active_action_index: usize,
}

impl PlannerSnapshot {
    pub fn active_action(&self) -> Option<&str> {
        if self.active_goal.is_none() {
            return None;
        }
        self.active_plan
            .get(self.active_action_index)
            .map(String::as_str)
    }
}

impl fmt::Display for PlannerSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tick {}", self.tick)?;
        for goal in &self.goals {
            let marker = if Some(&goal.name) == self.active_goal.as_ref() {
                '*'
            } else if goal.can_run {
                '+'
            } else {
                ' '
            };
            writeln!(f, " {marker} {:<24} {:>8.2}", goal.name, goal.priority)?;
        }
        match &self.active_goal {
            Some(goal) => {
                write!(f, "plan for {goal}:")?;
                for (i, step) in self.active_plan.iter().enumerate() {
                    if i == self.active_action_index {
                        write!(f, " [{step}]")?;
                    } else {
                        write!(f, " {step}")?;
                    }
                }
                Ok(())
            }
            None => write!(f, "idle"),
        }
    }
}
