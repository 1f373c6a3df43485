//! The camp sample: agents follow a wandering player, idle next to them, and walk home to rest
//! once their energy runs out.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::Result;
use goap_core::{Action, ActionBehavior, FactMap, Goal, GoalBehavior, Vec3, WorldState};
use goap_planner::{Planner, PlannerConfig};

/// Squared distance under which an agent counts as next to the player.
const FOLLOW_DISTANCE_SQ: f32 = 4.0;
/// Squared distance under which an agent counts as arrived at a resting spot.
const ARRIVE_DISTANCE_SQ: f32 = 1.0;
const MAX_ENERGY: u32 = 100;

/// Fixed places every agent knows about. The player moves; home and tent do not.
#[derive(Debug)]
pub struct Scene {
    pub player: Cell<Vec3>,
    pub home: Vec3,
    pub tent: Vec3,
}

impl Scene {
    pub fn new(home: Vec3, tent: Vec3) -> Rc<Self> {
        Rc::new(Self {
            player: Cell::new(Vec3::ZERO),
            home,
            tent,
        })
    }

    /// Walk the player around a circle so followers keep losing track of them.
    pub fn move_player(&self, time: f32) {
        let angle = time * 0.1;
        self.player.set(Vec3::new(6.0 * angle.cos(), 0.0, 6.0 * angle.sin()));
    }
}

#[derive(Debug)]
pub struct Body {
    pub position: Vec3,
    pub destination: Option<Vec3>,
    pub stopped: bool,
    pub energy: u32,
}

type SharedBody = Rc<RefCell<Body>>;

fn energy_left(body: &SharedBody) -> bool {
    body.borrow().energy > 0
}

fn near(body: &SharedBody, target: Vec3, distance_sq: f32) -> bool {
    body.borrow().position.distance_squared(target) < distance_sq
}

struct FollowPlayer {
    body: SharedBody,
    scene: Rc<Scene>,
}

impl GoalBehavior for FollowPlayer {
    fn name(&self) -> &str {
        "FollowPlayer"
    }

    fn setup(&mut self, _world: &mut WorldState, preconditions: &mut FactMap, conditions: &mut FactMap) {
        preconditions.insert("HaveEnergy".into(), true);
        preconditions.insert("InDistance".into(), false);
        conditions.insert("InDistance".into(), true);
    }

    fn priority(&self, _world: &WorldState) -> f32 {
        1.0
    }

    fn on_tick(&mut self, world: &mut WorldState) {
        world.set_state(
            "InDistance",
            near(&self.body, self.scene.player.get(), FOLLOW_DISTANCE_SQ),
        );
    }
}

struct IdleCloseToPlayer {
    body: SharedBody,
    scene: Rc<Scene>,
}

impl GoalBehavior for IdleCloseToPlayer {
    fn name(&self) -> &str {
        "IdleCloseToPlayer"
    }

    fn setup(&mut self, _world: &mut WorldState, _preconditions: &mut FactMap, conditions: &mut FactMap) {
        conditions.insert("Idle".into(), true);
    }

    fn priority(&self, _world: &WorldState) -> f32 {
        1.0
    }

    fn on_tick(&mut self, world: &mut WorldState) {
        world.set_state(
            "InDistance",
            near(&self.body, self.scene.player.get(), FOLLOW_DISTANCE_SQ),
        );
        world.set_state("HaveEnergy", energy_left(&self.body));
    }
}

struct RestoreEnergy {
    body: SharedBody,
}

impl GoalBehavior for RestoreEnergy {
    fn name(&self) -> &str {
        "RestoreEnergy"
    }

    fn setup(&mut self, _world: &mut WorldState, preconditions: &mut FactMap, conditions: &mut FactMap) {
        preconditions.insert("HaveEnergy".into(), false);
        conditions.insert("HaveEnergy".into(), true);
    }

    fn priority(&self, _world: &WorldState) -> f32 {
        0.5
    }

    fn on_tick(&mut self, world: &mut WorldState) {
        world.set_state("HaveEnergy", energy_left(&self.body));
    }
}

struct GoToPlayer {
    body: SharedBody,
    scene: Rc<Scene>,
}

impl ActionBehavior for GoToPlayer {
    fn name(&self) -> &str {
        "GoToPlayer"
    }

    fn setup(&mut self, _world: &mut WorldState, preconditions: &mut FactMap) {
        preconditions.insert("HaveEnergy".into(), true);
        preconditions.insert("InDistance".into(), false);
    }

    fn setup_effects(&mut self, _world: &WorldState, effects: &mut FactMap) {
        effects.insert("InDistance".into(), true);
    }

    fn cost(&self, _world: &WorldState) -> f32 {
        10.0
    }

    fn on_tick(&mut self, _world: &mut WorldState) {
        self.body.borrow_mut().destination = Some(self.scene.player.get());
    }
}

struct Idle;

impl ActionBehavior for Idle {
    fn name(&self) -> &str {
        "Idle"
    }

    fn setup(&mut self, _world: &mut WorldState, preconditions: &mut FactMap) {
        preconditions.insert("Idle".into(), false);
        preconditions.insert("InDistance".into(), true);
        preconditions.insert("HaveEnergy".into(), true);
    }

    fn setup_effects(&mut self, _world: &WorldState, effects: &mut FactMap) {
        effects.insert("Idle".into(), true);
    }
}

/// Walk to a resting spot; `CanRest` turns true on arrival.
struct GoToRestingSpot {
    name: &'static str,
    spot: Vec3,
    cost: f32,
    body: SharedBody,
}

impl ActionBehavior for GoToRestingSpot {
    fn name(&self) -> &str {
        self.name
    }

    fn setup(&mut self, world: &mut WorldState, preconditions: &mut FactMap) {
        preconditions.insert("CanRest".into(), false);
        world.register_target(self.name, self.spot);
    }

    fn setup_effects(&mut self, _world: &WorldState, effects: &mut FactMap) {
        effects.insert("CanRest".into(), true);
    }

    fn cost(&self, _world: &WorldState) -> f32 {
        self.cost
    }

    fn on_tick(&mut self, world: &mut WorldState) {
        self.body.borrow_mut().destination = Some(self.spot);
        world.set_state("CanRest", near(&self.body, self.spot, ARRIVE_DISTANCE_SQ));
    }
}

struct HaveARest {
    wait_time: f32,
    timer: f32,
    dt: f32,
    body: SharedBody,
}

impl ActionBehavior for HaveARest {
    fn name(&self) -> &str {
        "HaveARest"
    }

    fn setup(&mut self, _world: &mut WorldState, preconditions: &mut FactMap) {
        preconditions.insert("CanRest".into(), true);
        preconditions.insert("HaveEnergy".into(), false);
    }

    fn setup_effects(&mut self, _world: &WorldState, effects: &mut FactMap) {
        effects.insert("HaveEnergy".into(), true);
    }

    fn on_activate(&mut self, _world: &mut WorldState) {
        self.timer = 0.0;
        self.body.borrow_mut().stopped = true;
    }

    fn on_tick(&mut self, world: &mut WorldState) {
        self.timer += self.dt;
        if self.timer >= self.wait_time {
            self.timer = 0.0;
            self.body.borrow_mut().energy = MAX_ENERGY;
            world.set_state("HaveEnergy", true);
        }
    }

    fn on_deactivate(&mut self, world: &mut WorldState) {
        self.body.borrow_mut().stopped = false;
        world.set_state("CanRest", false);
    }
}

/// One camp agent: a body in the scene and the planner driving it.
#[derive(Debug)]
pub struct CampAgent {
    pub planner: Planner,
    body: SharedBody,
}

impl CampAgent {
    pub fn new(config: PlannerConfig, scene: &Rc<Scene>, position: Vec3, dt: f32) -> Result<Self> {
        let body = Rc::new(RefCell::new(Body {
            position,
            destination: None,
            stopped: false,
            energy: MAX_ENERGY,
        }));

        let mut planner = Planner::new(config)?;
        planner.world_mut().set_origin(position);
        planner.inject(
            [
                Goal::new(FollowPlayer {
                    body: body.clone(),
                    scene: scene.clone(),
                }),
                Goal::new(IdleCloseToPlayer {
                    body: body.clone(),
                    scene: scene.clone(),
                }),
                Goal::new(RestoreEnergy { body: body.clone() }),
            ],
            [
                Action::new(GoToPlayer {
                    body: body.clone(),
                    scene: scene.clone(),
                }),
                Action::new(Idle),
                Action::new(GoToRestingSpot {
                    name: "GoToHome",
                    spot: scene.home,
                    cost: 1.0,
                    body: body.clone(),
                }),
                Action::new(GoToRestingSpot {
                    name: "GoToTent",
                    spot: scene.tent,
                    cost: 1.0,
                    body: body.clone(),
                }),
                Action::new(HaveARest {
                    wait_time: 5.0,
                    timer: 0.0,
                    dt,
                    body: body.clone(),
                }),
            ],
        );

        Ok(Self { planner, body })
    }

    pub fn body(&self) -> std::cell::Ref<'_, Body> {
        self.body.borrow()
    }

    pub fn lose_energy(&self) {
        let mut body = self.body.borrow_mut();
        body.energy = body.energy.saturating_sub(1);
    }

    /// Move towards the current destination and report the new position to the planner.
    pub fn step(&mut self, speed: f32, dt: f32) {
        let position = {
            let mut body = self.body.borrow_mut();
            if let (false, Some(destination)) = (body.stopped, body.destination) {
                body.position = body.position.move_towards(destination, speed * dt);
            }
            body.position
        };
        self.planner.world_mut().set_origin(position);
    }
}

/// Spread `count` agents over a disc around the camp.
pub fn spawn_position(index: usize, count: usize) -> Vec3 {
    const GOLDEN_ANGLE: f32 = 2.399_963;
    let radius = 10.0 * ((index + 1) as f32 / count.max(1) as f32).sqrt();
    let angle = index as f32 * GOLDEN_ANGLE;
    Vec3::new(radius * angle.cos(), 0.0, radius * angle.sin())
}
