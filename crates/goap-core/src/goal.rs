use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{FactMap, State, WorldState};

/// Index of a goal inside the planner's injected goal set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GoalId(pub usize);

/// User-supplied part of a goal.
///
/// `on_tick` runs every planner cycle whether or not the goal is active, which makes goals the
/// natural place for sensors that write facts.
pub trait GoalBehavior: 'static {
    fn name(&self) -> &str;

    /// Declare what must hold to consider the goal and what must hold for it to be complete.
    fn setup(&mut self, world: &mut WorldState, preconditions: &mut FactMap, conditions: &mut FactMap);

    /// Higher wins. May change between calls.
    fn priority(&self, _world: &WorldState) -> f32 {
        0.0
    }

    fn on_tick(&mut self, _world: &mut WorldState) {}

    fn on_activate(&mut self, _world: &mut WorldState) {}

    fn on_deactivate(&mut self, _world: &mut WorldState) {}
}

pub struct Goal {
    behavior: Box<dyn GoalBehavior>,
    preconditions: FactMap,
    conditions: FactMap,
    condition_states: Vec<State>,
}

impl fmt::Debug for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Goal")
            .field("name", &self.name())
            .field("preconditions", &self.preconditions)
            .field("conditions", &self.conditions)
            .finish()
    }
}

impl Goal {
    pub fn new(behavior: impl GoalBehavior) -> Self {
        Self::from_boxed(Box::new(behavior))
    }

    pub fn from_boxed(behavior: Box<dyn GoalBehavior>) -> Self {
        Self {
            behavior,
            preconditions: FactMap::new(),
            conditions: FactMap::new(),
            condition_states: Vec::new(),
        }
    }

    pub fn init(&mut self, world: &mut WorldState) {
        self.preconditions.clear();
        self.conditions.clear();
        self.behavior
            .setup(world, &mut self.preconditions, &mut self.conditions);
        self.condition_states = State::from_map(&self.conditions);
    }

    pub fn name(&self) -> &str {
        self.behavior.name()
    }

    pub fn behavior(&self) -> &dyn GoalBehavior {
        self.behavior.as_ref()
    }

    pub fn preconditions(&self) -> &FactMap {
        &self.preconditions
    }

    pub fn conditions(&self) -> &FactMap {
        &self.conditions
    }

    pub fn condition_states(&self) -> &[State] {
        &self.condition_states
    }

    pub fn priority(&self, world: &WorldState) -> f32 {
        self.behavior.priority(world)
    }

    pub fn preconditions_satisfied(&self, world: &WorldState) -> bool {
        world.is_subset(&self.preconditions)
    }

    pub fn conditions_satisfied(&self, world: &WorldState) -> bool {
        world.is_subset(&self.conditions)
    }

    pub fn tick(&mut self, world: &mut WorldState) {
        self.behavior.on_tick(world);
    }

    pub fn activate(&mut self, world: &mut WorldState) {
        self.behavior.on_activate(world);
    }

    pub fn deactivate(&mut self, world: &mut WorldState) {
        self.behavior.on_deactivate(world);
    }

    pub fn data(&self, world: &WorldState) -> GoalData {
        GoalData {
            name: self.name().to_string(),
            priority: self.priority(world),
            can_run: self.preconditions_satisfied(world),
        }
    }
}

/// Goal summary for inspection tooling.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GoalData {
    pub name: String,
    pub priority: f32,
    pub can_run: bool,
}

type SensorFn = Box<dyn FnMut(&mut WorldState)>;

/// Data-only goal with an optional sensor callback.
pub struct StaticGoal {
    name: String,
    priority: f32,
    preconditions: FactMap,
    conditions: FactMap,
    sensor: Option<SensorFn>,
}

impl StaticGoal {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            priority: 0.0,
            preconditions: FactMap::new(),
            conditions: FactMap::new(),
            sensor: None,
        }
    }

    pub fn with_priority(mut self, priority: f32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_precondition(mut self, name: impl Into<String>, value: bool) -> Self {
        self.preconditions.insert(name.into(), value);
        self
    }

    pub fn with_condition(mut self, name: impl Into<String>, value: bool) -> Self {
        self.conditions.insert(name.into(), value);
        self
    }

    pub fn with_sensor(mut self, f: impl FnMut(&mut WorldState) + 'static) -> Self {
        self.sensor = Some(Box::new(f));
        self
    }
}

impl GoalBehavior for StaticGoal {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, _world: &mut WorldState, preconditions: &mut FactMap, conditions: &mut FactMap) {
        preconditions.extend(self.preconditions.iter().map(|(k, v)| (k.clone(), *v)));
        conditions.extend(self.conditions.iter().map(|(k, v)| (k.clone(), *v)));
    }

    fn priority(&self, _world: &WorldState) -> f32 {
        self.priority
    }

    fn on_tick(&mut self, world: &mut WorldState) {
        if let Some(sensor) = self.sensor.as_mut() {
            sensor(world);
        }
    }
}
