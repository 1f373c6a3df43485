use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::FactMap;

const ON: &str = "_on";
const OFF: &str = "_off";

/// A canonical `(name, value)` fact.
///
/// Equality, ordering and hashing go through the derived identity key (`"<name>_on"` /
/// `"<name>_off"`), so two `State`s built from equal entries are interchangeable inside search
/// structures. Clones share their strings.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "StateRepr", into = "StateRepr"))]
pub struct State {
    key: Arc<str>,
    value: bool,
    unique_id: Arc<str>,
}

impl State {
    pub fn new(key: &str, value: bool) -> Self {
        let suffix = if value { ON } else { OFF };
        Self {
            key: Arc::from(key),
            value,
            unique_id: Arc::from(format!("{key}{suffix}")),
        }
    }

    pub fn from_entry((key, value): (&String, &bool)) -> Self {
        Self::new(key, *value)
    }

    /// Canonical facts for every entry of a map, in the map's order.
    pub fn from_map(map: &FactMap) -> Vec<State> {
        map.iter().map(State::from_entry).collect()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> bool {
        self.value
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    /// The same fact with the opposite value.
    pub fn negated(&self) -> State {
        State::new(&self.key, !self.value)
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.unique_id == other.unique_id
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.unique_id.hash(state);
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        self.unique_id.cmp(&other.unique_id)
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "State({}={})", self.key, self.value)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.unique_id)
    }
}

#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
struct StateRepr {
    key: String,
    value: bool,
}

#[cfg(feature = "serde")]
impl From<StateRepr> for State {
    fn from(repr: StateRepr) -> Self {
        State::new(&repr.key, repr.value)
    }
}

#[cfg(feature = "serde")]
impl From<State> for StateRepr {
    fn from(state: State) -> Self {
        StateRepr {
            key: state.key.to_string(),
            value: state.value,
        }
    }
}
