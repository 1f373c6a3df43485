//! Boolean fact sets.
//!
//! A fact is a named boolean. Both scopes of a `WorldState` are built from the types in this
//! module: `StateSet` is owned by a single world, `GlobalStates` is a cheaply cloneable handle to a
//! concurrent map that several worlds (and therefore several planners) can share.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;

/// Named boolean requirements/effects, iterated in a stable (sorted) order.
pub type FactMap = BTreeMap<String, bool>;

/// Build a `FactMap` from `(name, value)` pairs.
pub fn fact_map<I, K>(pairs: I) -> FactMap
where
    I: IntoIterator<Item = (K, bool)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSet {
    states: BTreeMap<String, bool>,
    default_false: bool,
}

impl Default for StateSet {
    fn default() -> Self {
        Self::new(true)
    }
}

impl StateSet {
    /// `default_false`: an absent key is treated the same as `key = false`.
    pub fn new(default_false: bool) -> Self {
        Self {
            states: BTreeMap::new(),
            default_false,
        }
    }

    pub fn default_false(&self) -> bool {
        self.default_false
    }

    pub fn add_state(&mut self, name: impl Into<String>, value: bool) {
        self.states.insert(name.into(), value);
    }

    pub fn remove_state(&mut self, name: &str) -> Option<bool> {
        self.states.remove(name)
    }

    pub fn get_state(&self, name: &str) -> bool {
        self.states.get(name).copied().unwrap_or(false)
    }

    pub fn in_states(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    pub fn in_set(&self, name: &str, value: bool) -> bool {
        match self.states.get(name) {
            Some(stored) => *stored == value,
            None => self.default_false && !value,
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.states.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// Fact scope shared between worlds.
///
/// Cloning the handle shares the underlying map. Writes are expected from the orchestrating thread
/// between ticks; concurrent readers are fine.
#[derive(Debug, Clone)]
pub struct GlobalStates {
    states: Arc<DashMap<String, bool>>,
    default_false: bool,
}

impl Default for GlobalStates {
    fn default() -> Self {
        Self::new(true)
    }
}

impl GlobalStates {
    pub fn new(default_false: bool) -> Self {
        Self {
            states: Arc::new(DashMap::new()),
            default_false,
        }
    }

    pub fn add_state(&self, name: impl Into<String>, value: bool) {
        self.states.insert(name.into(), value);
    }

    pub fn remove_state(&self, name: &str) -> Option<bool> {
        self.states.remove(name).map(|(_, v)| v)
    }

    pub fn get_state(&self, name: &str) -> bool {
        self.states.get(name).map(|v| *v).unwrap_or(false)
    }

    pub fn in_states(&self, name: &str) -> bool {
        self.states.contains_key(name)
    }

    pub fn in_set(&self, name: &str, value: bool) -> bool {
        match self.states.get(name) {
            Some(stored) => *stored == value,
            None => self.default_false && !value,
        }
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Whether two handles point at the same shared map.
    pub fn ptr_eq(&self, other: &GlobalStates) -> bool {
        Arc::ptr_eq(&self.states, &other.states)
    }
}
