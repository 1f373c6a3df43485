use std::collections::BTreeMap;
use std::fmt;

use crate::{FactMap, GlobalStates, StateSet, Vec3};

/// Callback invoked with `(name, value)` whenever a fact is written.
pub type StateListener = Box<dyn FnMut(&str, bool)>;

/// The facts known to one planner host.
///
/// Facts live in a local `StateSet` owned by this world and an optional `GlobalStates` scope
/// shared with other worlds. Reads consult the global scope first when it holds the name, and the
/// local scope otherwise.
///
/// The world also carries the spatial inputs the graph backend uses for costs: an origin (the
/// host's own position) and per-behavior targets keyed by behavior name.
pub struct WorldState {
    local: StateSet,
    global: Option<GlobalStates>,
    origin: Option<Vec3>,
    targets: BTreeMap<String, Vec3>,
    listeners: Vec<StateListener>,
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WorldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorldState")
            .field("local", &self.local)
            .field("global", &self.global)
            .field("origin", &self.origin)
            .field("targets", &self.targets)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl WorldState {
    pub fn new() -> Self {
        Self::with_default_false(true)
    }

    pub fn with_default_false(default_false: bool) -> Self {
        Self {
            local: StateSet::new(default_false),
            global: None,
            origin: None,
            targets: BTreeMap::new(),
            listeners: Vec::new(),
        }
    }

    pub fn with_global(mut self, global: GlobalStates) -> Self {
        self.global = Some(global);
        self
    }

    pub fn set_global(&mut self, global: Option<GlobalStates>) {
        self.global = global;
    }

    pub fn local(&self) -> &StateSet {
        &self.local
    }

    pub fn global(&self) -> Option<&GlobalStates> {
        self.global.as_ref()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&str, bool) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn set_state(&mut self, name: &str, value: bool) {
        self.local.add_state(name, value);
        self.notify(name, value);
    }

    /// Write into the shared scope. Without one, the fact lands in the local scope.
    pub fn set_global_state(&mut self, name: &str, value: bool) {
        match &self.global {
            Some(global) => global.add_state(name, value),
            None => {
                tracing::warn!(fact = name, "no global fact scope bound; writing locally");
                self.local.add_state(name, value);
            }
        }
        self.notify(name, value);
    }

    pub fn remove_state(&mut self, name: &str) {
        if let Some(global) = self.global_holding(name) {
            global.remove_state(name);
        } else {
            self.local.remove_state(name);
        }
    }

    pub fn remove_local_state(&mut self, name: &str) {
        self.local.remove_state(name);
    }

    pub fn get_state(&self, name: &str) -> bool {
        match self.global_holding(name) {
            Some(global) => global.get_state(name),
            None => self.local.get_state(name),
        }
    }

    pub fn get_local_state(&self, name: &str) -> bool {
        self.local.get_state(name)
    }

    pub fn in_set(&self, name: &str, value: bool) -> bool {
        match self.global_holding(name) {
            Some(global) => global.in_set(name, value),
            None => self.local.in_set(name, value),
        }
    }

    pub fn in_local_set(&self, name: &str, value: bool) -> bool {
        self.local.in_set(name, value)
    }

    /// True iff every requirement holds. Empty requirements always hold.
    pub fn is_subset(&self, requirements: &FactMap) -> bool {
        requirements
            .iter()
            .all(|(name, value)| self.in_set(name, *value))
    }

    pub fn origin(&self) -> Option<Vec3> {
        self.origin
    }

    pub fn set_origin(&mut self, origin: Vec3) {
        self.origin = Some(origin);
    }

    pub fn clear_origin(&mut self) {
        self.origin = None;
    }

    pub fn register_target(&mut self, behavior: impl Into<String>, target: Vec3) {
        self.targets.insert(behavior.into(), target);
    }

    pub fn unregister_target(&mut self, behavior: &str) -> Option<Vec3> {
        self.targets.remove(behavior)
    }

    pub fn resolve_target(&self, behavior: &str) -> Option<Vec3> {
        self.targets.get(behavior).copied()
    }

    fn global_holding(&self, name: &str) -> Option<&GlobalStates> {
        self.global.as_ref().filter(|g| g.in_states(name))
    }

    fn notify(&mut self, name: &str, value: bool) {
        for listener in self.listeners.iter_mut() {
            listener(name, value);
        }
    }
}
