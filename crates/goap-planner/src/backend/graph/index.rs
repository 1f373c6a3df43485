use std::collections::HashMap;

use goap_core::{ActionId, GoalId, State};

use crate::BehaviorSet;

/// Bipartite connectivity between behaviors and the facts they require.
///
/// Node `i` is action `i` for `i < action_count`; goal `j` is node `action_count + j`. A node
/// links to every condition it requires (action preconditions, goal conditions), and a
/// condition links to every action whose effects produce it.
#[derive(Debug, Clone, Default)]
pub struct GraphIndex {
    action_count: usize,
    goal_count: usize,
    conditions: Vec<State>,
    node_conditions: Vec<Vec<usize>>,
    condition_connections: Vec<Vec<usize>>,
}

impl GraphIndex {
    pub fn build(behaviors: &BehaviorSet) -> Self {
        let actions = behaviors.actions();
        let goals = behaviors.goals();

        let mut conditions: Vec<State> = Vec::new();
        let mut lookup: HashMap<State, usize> = HashMap::new();
        let mut intern = |state: &State| -> usize {
            *lookup.entry(state.clone()).or_insert_with(|| {
                conditions.push(state.clone());
                conditions.len() - 1
            })
        };

        let mut node_conditions = Vec::with_capacity(actions.len() + goals.len());
        for action in actions {
            node_conditions.push(action.precondition_states().iter().map(&mut intern).collect());
        }
        for goal in goals {
            node_conditions.push(goal.condition_states().iter().map(&mut intern).collect());
        }

        let mut condition_connections: Vec<Vec<usize>> = vec![Vec::new(); conditions.len()];
        for (node, action) in actions.iter().enumerate() {
            for effect in action.effect_states() {
                if let Some(condition) = lookup.get(effect) {
                    condition_connections[*condition].push(node);
                }
            }
        }

        Self {
            action_count: actions.len(),
            goal_count: goals.len(),
            conditions,
            node_conditions,
            condition_connections,
        }
    }

    pub fn node_count(&self) -> usize {
        self.action_count + self.goal_count
    }

    pub fn action_count(&self) -> usize {
        self.action_count
    }

    pub fn goal_node(&self, goal: GoalId) -> usize {
        self.action_count + goal.0
    }

    pub fn action_at(&self, node: usize) -> Option<ActionId> {
        (node < self.action_count).then_some(ActionId(node))
    }

    /// Distinct required facts, indexed by condition.
    pub fn conditions(&self) -> &[State] {
        &self.conditions
    }

    pub fn node_conditions(&self, node: usize) -> &[usize] {
        &self.node_conditions[node]
    }

    /// Actions whose effects produce `condition`.
    pub fn condition_connections(&self, condition: usize) -> &[usize] {
        &self.condition_connections[condition]
    }
}
