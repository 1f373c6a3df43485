//! Pooled structures used during a single sequential search pass.

use goap_core::{ActionId, FactMap, Handle, Poolable};

/// One link in a backward chain: an action and the node it was chained in front of.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchNode {
    pub parent: Option<Handle<SearchNode>>,
    pub action: ActionId,
}

impl Poolable for SearchNode {
    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Facts still required at some point of a backward chain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateDelta {
    pub states: FactMap,
}

impl StateDelta {
    pub fn copy_from(&mut self, other: &StateDelta) {
        self.states.clone_from(&other.states);
    }

    /// Drop every required fact that `effects` produces with the same value.
    pub fn delete_intersection(&mut self, effects: &FactMap) {
        self.states
            .retain(|name, value| effects.get(name) != Some(value));
    }

    /// Merge `preconditions` in. Returns `false` at the first fact that is already required with
    /// the opposite value; entries merged before the conflict stay merged.
    pub fn try_join(&mut self, preconditions: &FactMap) -> bool {
        for (name, value) in preconditions {
            match self.states.get(name) {
                Some(existing) if existing != value => return false,
                Some(_) => {}
                None => {
                    self.states.insert(name.clone(), *value);
                }
            }
        }
        true
    }
}

impl Poolable for StateDelta {
    fn reset(&mut self) {
        self.states.clear();
    }
}
