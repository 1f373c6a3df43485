use std::fmt;

use crate::{FactMap, State, Vec3, WorldState};

/// Index of an action inside the planner's injected action set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionId(pub usize);

/// User-supplied part of an action: what it needs, what it produces, and how it runs.
///
/// The planner owns the `Action` wrapping this behavior for the whole session. `setup` and
/// `setup_effects` run on every injection; the lifecycle callbacks run only while the action is
/// the current step of the active plan.
pub trait ActionBehavior: 'static {
    fn name(&self) -> &str;

    /// Declare preconditions. May also register a spatial target on the world.
    fn setup(&mut self, _world: &mut WorldState, _preconditions: &mut FactMap) {}

    /// Declare effects. Re-run before every query when `recompute_effects_each_query` is set.
    fn setup_effects(&mut self, world: &WorldState, effects: &mut FactMap);

    fn recompute_effects_each_query(&self) -> bool {
        false
    }

    /// Non-negative, compared only against other action costs.
    fn cost(&self, _world: &WorldState) -> f32 {
        0.0
    }

    fn on_activate(&mut self, _world: &mut WorldState) {}

    fn on_tick(&mut self, _world: &mut WorldState) {}

    fn on_deactivate(&mut self, _world: &mut WorldState) {}
}

pub struct Action {
    behavior: Box<dyn ActionBehavior>,
    preconditions: FactMap,
    effects: FactMap,
    precondition_states: Vec<State>,
    effect_states: Vec<State>,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name())
            .field("preconditions", &self.preconditions)
            .field("effects", &self.effects)
            .finish()
    }
}

impl Action {
    pub fn new(behavior: impl ActionBehavior) -> Self {
        Self::from_boxed(Box::new(behavior))
    }

    pub fn from_boxed(behavior: Box<dyn ActionBehavior>) -> Self {
        Self {
            behavior,
            preconditions: FactMap::new(),
            effects: FactMap::new(),
            precondition_states: Vec::new(),
            effect_states: Vec::new(),
        }
    }

    /// Bind to `world`: rebuild preconditions/effects and their canonical facts.
    pub fn init(&mut self, world: &mut WorldState) {
        self.preconditions.clear();
        self.effects.clear();
        self.behavior.setup(world, &mut self.preconditions);
        self.behavior.setup_effects(world, &mut self.effects);
        self.precondition_states = State::from_map(&self.preconditions);
        self.effect_states = State::from_map(&self.effects);
    }

    pub fn name(&self) -> &str {
        self.behavior.name()
    }

    pub fn behavior(&self) -> &dyn ActionBehavior {
        self.behavior.as_ref()
    }

    pub fn preconditions(&self) -> &FactMap {
        &self.preconditions
    }

    pub fn effects(&self) -> &FactMap {
        &self.effects
    }

    pub fn precondition_states(&self) -> &[State] {
        &self.precondition_states
    }

    pub fn effect_states(&self) -> &[State] {
        &self.effect_states
    }

    pub fn has_dynamic_effects(&self) -> bool {
        self.behavior.recompute_effects_each_query()
    }

    pub fn cost(&self, world: &WorldState) -> f32 {
        self.behavior.cost(world).max(0.0)
    }

    /// Re-run `setup_effects` if the behavior declares dynamic effects.
    pub fn refresh_effects(&mut self, world: &WorldState) {
        if !self.has_dynamic_effects() {
            return;
        }
        self.effects.clear();
        self.behavior.setup_effects(world, &mut self.effects);
        self.effect_states = State::from_map(&self.effects);
    }

    /// Whether this action can be chained in front of `required`.
    ///
    /// Refreshes dynamic effects first, then applies `effects_satisfy`.
    pub fn satisfies_conditions(&mut self, world: &WorldState, required: &FactMap) -> bool {
        self.refresh_effects(world);
        self.effects_satisfy(required)
    }

    /// True when at least one required fact is produced with the same value, no effect
    /// contradicts a required fact, and no precondition contradicts a required fact unless the
    /// effects restore it.
    pub fn effects_satisfy(&self, required: &FactMap) -> bool {
        let mut satisfied = 0usize;
        for (name, value) in required {
            match self.effects.get(name) {
                None => continue,
                Some(effect) if effect != value => return false,
                Some(_) => satisfied += 1,
            }
        }
        if satisfied == 0 {
            return false;
        }

        // Requirement [a:1, c:0]; an action giving a:1 but needing c:1 would ask for both c:0 and
        // c:1 unless it also produces c:0 itself.
        for (name, pre) in &self.preconditions {
            if let Some(required_value) = required.get(name) {
                if pre != required_value && self.effects.get(name) != Some(required_value) {
                    return false;
                }
            }
        }
        true
    }

    pub fn preconditions_satisfied(&self, world: &WorldState) -> bool {
        world.is_subset(&self.preconditions)
    }

    pub fn activate(&mut self, world: &mut WorldState) {
        self.behavior.on_activate(world);
    }

    pub fn tick(&mut self, world: &mut WorldState) {
        self.behavior.on_tick(world);
    }

    pub fn deactivate(&mut self, world: &mut WorldState) {
        self.behavior.on_deactivate(world);
    }
}

type TickFn = Box<dyn FnMut(&mut WorldState)>;

/// Data-only action: fixed facts and cost, with an optional tick callback.
pub struct StaticAction {
    name: String,
    cost: f32,
    preconditions: FactMap,
    effects: FactMap,
    target: Option<Vec3>,
    apply_effects_on_tick: bool,
    on_tick: Option<TickFn>,
}

impl StaticAction {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cost: 0.0,
            preconditions: FactMap::new(),
            effects: FactMap::new(),
            target: None,
            apply_effects_on_tick: false,
            on_tick: None,
        }
    }

    pub fn with_cost(mut self, cost: f32) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_precondition(mut self, name: impl Into<String>, value: bool) -> Self {
        self.preconditions.insert(name.into(), value);
        self
    }

    pub fn with_effect(mut self, name: impl Into<String>, value: bool) -> Self {
        self.effects.insert(name.into(), value);
        self
    }

    /// Register a spatial target for this action under its name.
    pub fn with_target(mut self, target: Vec3) -> Self {
        self.target = Some(target);
        self
    }

    /// Write every declared effect into the world each time the action ticks.
    pub fn applying_effects(mut self) -> Self {
        self.apply_effects_on_tick = true;
        self
    }

    pub fn on_tick(mut self, f: impl FnMut(&mut WorldState) + 'static) -> Self {
        self.on_tick = Some(Box::new(f));
        self
    }
}

impl ActionBehavior for StaticAction {
    fn name(&self) -> &str {
        &self.name
    }

    fn setup(&mut self, world: &mut WorldState, preconditions: &mut FactMap) {
        preconditions.extend(self.preconditions.iter().map(|(k, v)| (k.clone(), *v)));
        if let Some(target) = self.target {
            world.register_target(self.name.clone(), target);
        }
    }

    fn setup_effects(&mut self, _world: &WorldState, effects: &mut FactMap) {
        effects.extend(self.effects.iter().map(|(k, v)| (k.clone(), *v)));
    }

    fn cost(&self, _world: &WorldState) -> f32 {
        self.cost
    }

    fn on_tick(&mut self, world: &mut WorldState) {
        if let Some(f) = self.on_tick.as_mut() {
            f(world);
        }
        if self.apply_effects_on_tick {
            for (name, value) in &self.effects {
                world.set_state(name, *value);
            }
        }
    }
}
