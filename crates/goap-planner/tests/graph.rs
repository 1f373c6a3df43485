use goap_core::{Action, GlobalStates, Goal, StaticAction, StaticGoal, Vec3, WorldState};
use goap_planner::{Planner, PlannerConfig, TickConfig};

fn active_goal_name(planner: &Planner) -> Option<String> {
    planner.active_goal().map(|g| g.name().to_string())
}

fn eat() -> (Goal, Action) {
    (
        Goal::new(StaticGoal::new("Eat").with_condition("Fed", true)),
        Action::new(StaticAction::new("Snack").with_effect("Fed", true)),
    )
}

#[test]
fn manual_activation_is_applied_on_the_next_update() {
    let config = PlannerConfig {
        tick: TickConfig {
            manual_activate_planner: true,
            ..TickConfig::default()
        },
        ..PlannerConfig::graph()
    };
    let mut planner = Planner::new(config).expect("planner");
    let (goal, action) = eat();
    planner.inject([goal], [action]);

    planner.manual_activate();
    assert!(!planner.is_active());
    planner.update();
    assert!(planner.is_active());
    assert!(planner.active_goal().is_none());
    planner.late_update();
    assert_eq!(active_goal_name(&planner).as_deref(), Some("Eat"));
}

#[test]
fn searches_on_a_dedicated_worker_pool() {
    let config = PlannerConfig {
        worker_threads: Some(2),
        ..PlannerConfig::graph()
    };
    let mut planner = Planner::new(config).expect("planner");
    let (goal, action) = eat();
    planner.inject([goal], [action]);
    planner.tick();
    assert_eq!(planner.active_plan_names(), ["Snack"]);
}

#[test]
fn distance_to_targets_steers_the_search() {
    let mut planner = Planner::new(PlannerConfig::graph()).expect("planner");
    planner.world_mut().set_origin(Vec3::ZERO);
    planner.inject(
        [Goal::new(StaticGoal::new("Eat").with_condition("Fed", true))],
        [
            Action::new(
                StaticAction::new("FarFood")
                    .with_effect("Fed", true)
                    .with_cost(1.0)
                    .with_target(Vec3::new(100.0, 0.0, 0.0)),
            ),
            Action::new(
                StaticAction::new("NearFood")
                    .with_effect("Fed", true)
                    .with_cost(1.0)
                    .with_target(Vec3::new(1.0, 0.0, 0.0)),
            ),
        ],
    );
    assert!(planner.world().resolve_target("NearFood").is_some());

    planner.tick();
    assert_eq!(planner.active_plan_names(), ["NearFood"]);
}

#[test]
fn disable_joins_outstanding_searches() {
    let mut planner = Planner::new(PlannerConfig::graph()).expect("planner");
    let (goal, action) = eat();
    planner.inject([goal], [action]);

    planner.update();
    planner.disable();
    planner.late_update();
    assert_eq!(active_goal_name(&planner).as_deref(), Some("Eat"));
}

#[test]
fn planners_share_a_global_scope() {
    let global = GlobalStates::new(true);
    let mut guard = Planner::with_world(
        WorldState::new().with_global(global.clone()),
        PlannerConfig::graph(),
    )
    .expect("planner");
    let mut sentry = Planner::with_world(
        WorldState::new().with_global(global.clone()),
        PlannerConfig::graph(),
    )
    .expect("planner");

    for planner in [&mut guard, &mut sentry] {
        planner.inject(
            [Goal::new(
                StaticGoal::new("Defend")
                    .with_precondition("Alarm", true)
                    .with_condition("Defended", true),
            )],
            [Action::new(StaticAction::new("Man the walls").with_effect("Defended", true))],
        );
    }

    guard.tick();
    sentry.tick();
    assert!(guard.active_goal().is_none());

    sentry.world_mut().set_global_state("Alarm", true);
    guard.tick();
    sentry.tick();
    assert_eq!(active_goal_name(&guard).as_deref(), Some("Defend"));
    assert_eq!(active_goal_name(&sentry).as_deref(), Some("Defend"));
}

#[test]
fn reinjection_discards_searches_still_in_flight() {
    let mut planner = Planner::new(PlannerConfig::graph()).expect("planner");
    let (goal, action) = eat();
    planner.inject([goal], [action]);

    // Jobs for the first behavior set are submitted but not joined yet.
    planner.update();
    planner.inject(
        [Goal::new(StaticGoal::new("Drink").with_condition("Hydrated", true))],
        [Action::new(StaticAction::new("Sip").with_effect("Hydrated", true))],
    );
    planner.late_update();
    assert!(planner.active_goal().is_none());
    assert!(planner.active_plan().is_none());

    planner.tick();
    assert_eq!(active_goal_name(&planner).as_deref(), Some("Drink"));
    assert_eq!(planner.active_plan_names(), ["Sip"]);
}
