use std::io;
use std::sync::{Arc, Mutex};

use goap_core::{Action, Goal, StaticAction, StaticGoal};
use goap_planner::{BackendKind, LogConfig, Planner, PlannerConfig};
use goap_tools::{SharedTraceLog, TraceKind};

const BACKENDS: [BackendKind; 2] = [BackendKind::Sequential, BackendKind::Graph];

fn planner(backend: BackendKind) -> (Planner, SharedTraceLog) {
    let mut planner =
        Planner::new(PlannerConfig::default().with_backend(backend)).expect("planner");
    let log = SharedTraceLog::new();
    planner.set_trace_sink(log.clone());
    (planner, log)
}

fn active_goal_name(planner: &Planner) -> Option<String> {
    planner.active_goal().map(|g| g.name().to_string())
}

#[test]
fn rest_goal_runs_sleep_then_returns_to_idle() {
    for backend in BACKENDS {
        let (mut planner, log) = planner(backend);
        planner.world_mut().set_state("HaveEnergy", false);
        planner.inject(
            [Goal::new(StaticGoal::new("Rest").with_condition("HaveEnergy", true))],
            [Action::new(
                StaticAction::new("Sleep")
                    .with_effect("HaveEnergy", true)
                    .with_cost(1.0)
                    .applying_effects(),
            )],
        );

        planner.tick();
        assert_eq!(active_goal_name(&planner).as_deref(), Some("Rest"), "{backend:?}");
        assert_eq!(planner.active_plan_names(), ["Sleep"], "{backend:?}");
        assert_eq!(planner.active_action_index(), 0);

        planner.tick();
        assert!(planner.world().get_state("HaveEnergy"));
        assert!(planner.active_goal().is_none(), "{backend:?}");
        assert!(planner.active_plan().is_none(), "{backend:?}");

        planner.tick();
        assert!(planner.active_goal().is_none(), "{backend:?} restarted a finished goal");

        let events = log.snapshot();
        assert_eq!(events.count(TraceKind::BehaviorsReloaded), 1);
        assert_eq!(events.count(TraceKind::PlanUpdated), 1);
        assert_eq!(events.count(TraceKind::PlanCompleted), 1);
    }
}

#[test]
fn higher_priority_goal_wins() {
    for backend in BACKENDS {
        let (mut planner, _) = planner(backend);
        planner.inject(
            [
                Goal::new(
                    StaticGoal::new("Wander")
                        .with_priority(0.5)
                        .with_condition("Wandered", true),
                ),
                Goal::new(
                    StaticGoal::new("Rest")
                        .with_priority(1.0)
                        .with_condition("HaveEnergy", true),
                ),
            ],
            [
                Action::new(StaticAction::new("Walk").with_effect("Wandered", true)),
                Action::new(StaticAction::new("Sleep").with_effect("HaveEnergy", true)),
            ],
        );

        planner.tick();
        assert_eq!(active_goal_name(&planner).as_deref(), Some("Rest"), "{backend:?}");
        assert_eq!(planner.active_plan_names(), ["Sleep"]);
    }
}

fn camp(go_to_tent_applies_effects: bool) -> (Goal, Vec<Action>) {
    let mut go_to_tent = StaticAction::new("GoToTent")
        .with_precondition("CanRest", false)
        .with_effect("CanRest", true);
    if go_to_tent_applies_effects {
        go_to_tent = go_to_tent.applying_effects();
    }
    (
        Goal::new(StaticGoal::new("Camp").with_condition("Rested", true)),
        vec![
            Action::new(go_to_tent),
            Action::new(
                StaticAction::new("HaveARest")
                    .with_precondition("CanRest", true)
                    .with_effect("Rested", true)
                    .applying_effects(),
            ),
        ],
    )
}

#[test]
fn plan_moves_on_once_the_next_step_can_run() {
    for backend in BACKENDS {
        let (mut planner, log) = planner(backend);
        let (goal, actions) = camp(true);
        planner.inject([goal], actions);

        planner.tick();
        assert_eq!(
            planner.active_action().map(|a| a.name()),
            Some("GoToTent"),
            "{backend:?}"
        );

        planner.tick();
        assert_eq!(
            planner.active_action().map(|a| a.name()),
            Some("HaveARest"),
            "{backend:?}"
        );
        assert_eq!(active_goal_name(&planner).as_deref(), Some("Camp"));

        planner.tick();
        assert!(planner.world().get_state("Rested"));
        assert!(planner.active_goal().is_none(), "{backend:?}");
        assert_eq!(log.snapshot().count(TraceKind::PlanAborted), 0);
    }
}

#[test]
fn invalidated_step_aborts_the_plan() {
    let (mut planner, log) = planner(BackendKind::Sequential);
    let (goal, actions) = camp(false);
    planner.inject([goal], actions);

    planner.tick();
    assert_eq!(planner.active_plan_names(), ["GoToTent", "HaveARest"]);

    // GoToTent needs CanRest:false, so it can no longer run.
    planner.world_mut().set_state("CanRest", true);
    planner.tick();

    let events = log.snapshot();
    assert_eq!(events.count(TraceKind::PlanAborted), 1);
    // Replanned from the new world state.
    assert_eq!(planner.active_plan_names(), ["HaveARest"]);
    assert_eq!(planner.active_action_index(), 0);
}

#[test]
fn unreachable_goal_leaves_planner_idle() {
    for backend in BACKENDS {
        let (mut planner, log) = planner(backend);
        planner.inject(
            [Goal::new(StaticGoal::new("Fly").with_condition("Flying", true))],
            [Action::new(StaticAction::new("Walk").with_effect("Moving", true))],
        );

        for _ in 0..3 {
            planner.tick();
        }
        assert!(planner.active_goal().is_none(), "{backend:?}");
        assert!(planner.is_active());
        assert_eq!(log.snapshot().count(TraceKind::PlanUpdated), 0);
    }
}

/// Formatted log output written by the test's scoped subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().expect("lock")).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().expect("lock").extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn unreachable_goal_logs_no_path_found() {
    for backend in BACKENDS {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let config = PlannerConfig::default()
                .with_backend(backend)
                .with_log(LogConfig {
                    fail: true,
                    ..LogConfig::default()
                });
            let mut planner = Planner::new(config).expect("planner");
            planner.inject(
                [Goal::new(StaticGoal::new("Fly").with_condition("Flying", true))],
                [Action::new(StaticAction::new("Walk").with_effect("Moving", true))],
            );
            planner.tick();
            assert!(planner.active_goal().is_none(), "{backend:?}");
        });

        assert!(logs.text().contains("no path found"), "{backend:?}: {}", logs.text());
    }
}

#[test]
fn sorted_goal_data_lists_every_goal_by_priority() {
    let (mut planner, _) = planner(BackendKind::Sequential);
    planner.inject_goals([
        Goal::new(StaticGoal::new("Low").with_priority(0.5)),
        Goal::new(StaticGoal::new("High").with_priority(2.0)),
        Goal::new(
            StaticGoal::new("Mid")
                .with_priority(1.0)
                .with_precondition("Ready", true),
        ),
    ]);

    let data = planner.sorted_goal_data();
    let names: Vec<&str> = data.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, ["High", "Mid", "Low"]);
    assert!(data.windows(2).all(|w| w[0].priority > w[1].priority));
    assert!(!data[1].can_run);
    assert!(data[0].can_run && data[2].can_run);
}

#[test]
fn snapshot_reflects_the_running_plan() {
    let (mut planner, _) = planner(BackendKind::Sequential);
    let (goal, actions) = camp(true);
    planner.inject([goal], actions);
    planner.tick();

    let snapshot = planner.snapshot();
    assert_eq!(snapshot.tick, 1);
    assert_eq!(snapshot.active_goal.as_deref(), Some("Camp"));
    assert_eq!(snapshot.active_plan, ["GoToTent", "HaveARest"]);
    assert_eq!(snapshot.active_action(), Some("GoToTent"));

    let json = serde_json::to_value(&snapshot).expect("json");
    assert_eq!(json["active_goal"], "Camp");
}

#[test]
fn lookups_report_unknown_names() {
    let (mut planner, _) = planner(BackendKind::Sequential);
    let (goal, actions) = camp(true);
    planner.inject([goal], actions);

    assert_eq!(planner.goal_id("Camp").expect("goal").0, 0);
    assert_eq!(planner.action_id("HaveARest").expect("action").0, 1);
    let err = planner.goal_id("Nope").unwrap_err();
    assert_eq!(err.to_string(), "no goal named Nope");
}
