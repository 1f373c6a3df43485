use criterion::{black_box, criterion_group, criterion_main, Criterion};
use goap_core::{Action, Goal, StaticAction, StaticGoal};
use goap_planner::{BackendKind, Planner, PlannerConfig};

/// A chain `Step0 -> Step1 -> ... -> StepN` where each step needs the previous one's fact, plus
/// decoy actions producing facts nobody needs.
fn chain_planner(backend: BackendKind, len: usize) -> Planner {
    let mut planner =
        Planner::new(PlannerConfig::default().with_backend(backend)).expect("planner");
    let mut actions = Vec::with_capacity(len * 2);
    for i in 0..len {
        let mut step = StaticAction::new(format!("Step{i}"))
            .with_effect(format!("Fact{i}"), true)
            .with_cost(1.0);
        if i > 0 {
            step = step.with_precondition(format!("Fact{}", i - 1), true);
        }
        actions.push(Action::new(step));
        actions.push(Action::new(
            StaticAction::new(format!("Decoy{i}")).with_effect(format!("Noise{i}"), true),
        ));
    }
    planner.inject(
        [Goal::new(
            StaticGoal::new("Finish").with_condition(format!("Fact{}", len - 1), true),
        )],
        actions,
    );
    planner
}

fn bench_planners(c: &mut Criterion) {
    for backend in [BackendKind::Sequential, BackendKind::Graph] {
        c.bench_function(&format!("goap-planner/{backend:?}/chain(len=8)"), |b| {
            b.iter_batched(
                || chain_planner(backend, 8),
                |mut planner| {
                    planner.tick();
                    black_box(planner.active_plan().map(|p| p.len()));
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
}

criterion_group!(benches, bench_planners);
criterion_main!(benches);
