use std::cell::Cell;
use std::rc::Rc;

use goap_core::{Action, ActionBehavior, FactMap, Goal, StaticAction, StaticGoal, WorldState};
use goap_planner::{BackendKind, Planner, PlannerConfig, SearchMode, TickConfig};
use goap_tools::{SharedTraceLog, TraceKind};

/// Finishes `Done` only while `Distracted` is false; otherwise it advertises no effects at all.
struct FocusedWork {
    ticks: Rc<Cell<u32>>,
}

impl ActionBehavior for FocusedWork {
    fn name(&self) -> &str {
        "FocusedWork"
    }

    fn setup_effects(&mut self, world: &WorldState, effects: &mut FactMap) {
        effects.clear();
        if !world.get_state("Distracted") {
            effects.insert("Done".to_string(), true);
        }
    }

    fn recompute_effects_each_query(&self) -> bool {
        true
    }

    fn on_tick(&mut self, _world: &mut WorldState) {
        self.ticks.set(self.ticks.get() + 1);
    }
}

fn active_goal_name(planner: &Planner) -> Option<String> {
    planner.active_goal().map(|g| g.name().to_string())
}

#[test]
fn lower_priority_goal_preempts_when_the_active_goal_loses_its_plan() {
    let ticks = Rc::new(Cell::new(0));
    let mut planner = Planner::new(PlannerConfig::default()).expect("planner");
    planner.inject(
        [
            Goal::new(
                StaticGoal::new("Work")
                    .with_priority(10.0)
                    .with_condition("Done", true),
            ),
            Goal::new(
                StaticGoal::new("Loaf")
                    .with_priority(1.0)
                    .with_condition("Loafing", true),
            ),
        ],
        [
            Action::new(FocusedWork {
                ticks: Rc::clone(&ticks),
            }),
            Action::new(StaticAction::new("Nap").with_effect("Loafing", true)),
        ],
    );

    planner.tick();
    assert_eq!(active_goal_name(&planner).as_deref(), Some("Work"));

    // Work still runs this tick, but no plan for it can be found any more.
    planner.world_mut().set_state("Distracted", true);
    planner.tick();
    assert_eq!(ticks.get(), 1);
    assert_eq!(active_goal_name(&planner).as_deref(), Some("Loaf"));
    assert_eq!(planner.active_plan_names(), ["Nap"]);
}

/// A goal that never completes, and an urgent one gated behind `Alarm`.
fn alarm_planner(backend: BackendKind, mode: SearchMode) -> Planner {
    let config = PlannerConfig::default()
        .with_backend(backend)
        .with_search_mode(mode);
    let mut planner = Planner::new(config).expect("planner");
    planner.inject(
        [
            Goal::new(
                StaticGoal::new("Chores")
                    .with_priority(0.1)
                    .with_condition("ChoresDone", true),
            ),
            Goal::new(
                StaticGoal::new("Escape")
                    .with_priority(5.0)
                    .with_precondition("Alarm", true)
                    .with_condition("Safe", true),
            ),
        ],
        [
            Action::new(StaticAction::new("Sweep").with_effect("ChoresDone", true)),
            Action::new(StaticAction::new("Flee").with_effect("Safe", true)),
        ],
    );
    planner
}

#[test]
fn search_mode_gates_replanning_while_a_plan_runs() {
    let cases = [
        (SearchMode::Always, "Escape"),
        (SearchMode::OnActionComplete, "Chores"),
        (SearchMode::OnPlanComplete, "Chores"),
    ];
    for backend in [BackendKind::Sequential, BackendKind::Graph] {
        for (mode, expected) in cases {
            let mut planner = alarm_planner(backend, mode);
            planner.tick();
            assert_eq!(active_goal_name(&planner).as_deref(), Some("Chores"));

            planner.world_mut().set_state("Alarm", true);
            planner.tick();
            assert_eq!(
                active_goal_name(&planner).as_deref(),
                Some(expected),
                "{backend:?} {mode:?}"
            );
        }
    }
}

#[test]
fn abort_lets_a_gated_search_run_again() {
    let mut planner = alarm_planner(BackendKind::Sequential, SearchMode::OnPlanComplete);
    planner.tick();
    planner.world_mut().set_state("Alarm", true);
    planner.tick();
    assert_eq!(active_goal_name(&planner).as_deref(), Some("Chores"));

    planner.abort_active_plan();
    assert!(planner.active_goal().is_none());
    planner.tick();
    assert_eq!(active_goal_name(&planner).as_deref(), Some("Escape"));
}

fn camp_with_skip(backend: BackendKind, skip_ahead: bool) -> (Planner, SharedTraceLog) {
    let config = PlannerConfig {
        backend,
        skip_ahead,
        ..PlannerConfig::default()
    };
    let mut planner = Planner::new(config).expect("planner");
    let log = SharedTraceLog::new();
    planner.set_trace_sink(log.clone());
    planner.inject(
        [Goal::new(StaticGoal::new("Camp").with_condition("Rested", true))],
        [
            Action::new(
                StaticAction::new("GoToTent")
                    .with_precondition("CanRest", false)
                    .with_effect("CanRest", true),
            ),
            Action::new(
                StaticAction::new("HaveARest")
                    .with_precondition("CanRest", true)
                    .with_effect("Rested", true)
                    .applying_effects(),
            ),
        ],
    );
    (planner, log)
}

#[test]
fn skip_ahead_jumps_to_the_next_runnable_step() {
    for backend in [BackendKind::Sequential, BackendKind::Graph] {
        let (mut planner, log) = camp_with_skip(backend, true);
        planner.tick();
        assert_eq!(
            planner.active_plan_names(),
            ["GoToTent", "HaveARest"],
            "{backend:?}"
        );

        planner.world_mut().set_state("CanRest", true);
        planner.tick();

        // Skipped to HaveARest, ran it, and finished the goal in the same tick.
        assert!(planner.world().get_state("Rested"), "{backend:?}");
        assert!(planner.active_goal().is_none(), "{backend:?}");
        let events = log.snapshot();
        assert_eq!(events.count(TraceKind::PlanAborted), 0, "{backend:?}");
        assert_eq!(events.count(TraceKind::PlanCompleted), 1, "{backend:?}");
    }
}

#[test]
fn without_skip_ahead_the_plan_is_abandoned() {
    for backend in [BackendKind::Sequential, BackendKind::Graph] {
        let (mut planner, log) = camp_with_skip(backend, false);
        planner.tick();
        planner.world_mut().set_state("CanRest", true);
        planner.tick();
        assert_eq!(log.snapshot().count(TraceKind::PlanAborted), 1, "{backend:?}");
        assert!(!planner.world().get_state("Rested"), "{backend:?}");
    }
}

#[test]
fn manual_activation_runs_until_nothing_new_is_adopted() {
    for backend in [BackendKind::Sequential, BackendKind::Graph] {
        let config = PlannerConfig {
            backend,
            tick: TickConfig {
                manual_activate_planner: true,
                ..TickConfig::default()
            },
            ..PlannerConfig::default()
        };
        let mut planner = Planner::new(config).expect("planner");
        planner.inject(
            [Goal::new(StaticGoal::new("Chores").with_condition("ChoresDone", true))],
            [Action::new(StaticAction::new("Sweep").with_effect("ChoresDone", true))],
        );

        assert!(!planner.is_active());
        planner.tick();
        assert!(planner.active_goal().is_none(), "{backend:?}");

        planner.manual_activate();
        planner.tick();
        assert!(planner.is_active(), "{backend:?}");
        assert_eq!(active_goal_name(&planner).as_deref(), Some("Chores"));

        planner.tick();
        assert!(!planner.is_active(), "{backend:?}");
        assert_eq!(active_goal_name(&planner).as_deref(), Some("Chores"));
    }
}

#[test]
fn manual_goal_updates_leave_sensors_to_the_host() {
    let sensed = Rc::new(Cell::new(0));
    let config = PlannerConfig {
        tick: TickConfig {
            manual_update_goal: true,
            ..TickConfig::default()
        },
        ..PlannerConfig::default()
    };
    let mut planner = Planner::new(config).expect("planner");
    let counter = Rc::clone(&sensed);
    planner.inject_goals([Goal::new(
        StaticGoal::new("Watch").with_sensor(move |_| counter.set(counter.get() + 1)),
    )]);

    planner.tick();
    planner.tick();
    assert_eq!(sensed.get(), 0);
}

#[test]
fn reinjection_aborts_and_replans_with_the_new_set() {
    for backend in [BackendKind::Sequential, BackendKind::Graph] {
        let mut planner = alarm_planner(backend, SearchMode::Always);
        let log = SharedTraceLog::new();
        planner.set_trace_sink(log.clone());
        planner.tick();
        assert_eq!(active_goal_name(&planner).as_deref(), Some("Chores"));

        planner.inject(
            [Goal::new(StaticGoal::new("Eat").with_condition("Fed", true))],
            [Action::new(StaticAction::new("Snack").with_effect("Fed", true))],
        );
        assert!(planner.active_goal().is_none());

        planner.tick();
        assert_eq!(active_goal_name(&planner).as_deref(), Some("Eat"), "{backend:?}");
        assert_eq!(planner.active_plan_names(), ["Snack"]);

        let events = log.snapshot();
        assert_eq!(events.count(TraceKind::PlanAborted), 1);
        assert_eq!(events.count(TraceKind::BehaviorsReloaded), 1);
    }
}
