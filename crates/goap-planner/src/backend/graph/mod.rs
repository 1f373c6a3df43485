//! Precomputed action/condition graph searched in parallel.
//!
//! The graph is rebuilt lazily after every injection. Each tick, `update` snapshots what the
//! world currently satisfies into a `RunData` and submits one job per runnable goal;
//! `late_update` joins the jobs, takes the best result and decides whether to switch goal or
//! action. Only the first action of a found chain runs; the chain is searched again next tick.

mod index;
mod job;
mod runner;

use std::sync::Arc;

use goap_core::{ActionId, GoalId, Plan};
use goap_tools::TraceKind;
use rayon::ThreadPool;
use tracing::debug;

pub use index::GraphIndex;
pub use job::{resolve, RunData};
pub use runner::{Completion, JobRunner};

use crate::active::{ActivePlan, StepPolicy, TickOutcome};
use crate::{Backend, BackendKind, BehaviorSet, Host, SearchMode};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    goal: GoalId,
    chain: Vec<ActionId>,
}

impl Candidate {
    fn action(&self) -> Option<ActionId> {
        self.chain.first().copied()
    }
}

#[derive(Debug)]
pub struct GraphBackend {
    behaviors: BehaviorSet,
    active: ActivePlan,
    runner: Option<JobRunner>,
    pool: Option<Arc<ThreadPool>>,
    dirty: bool,
    activate_flag: bool,
    candidate_goals: Vec<GoalId>,
    candidate: Option<Candidate>,
}

impl Default for GraphBackend {
    fn default() -> Self {
        Self::new(None)
    }
}

impl GraphBackend {
    /// Jobs go to `pool`, or to rayon's global pool when `None`.
    pub fn new(pool: Option<Arc<ThreadPool>>) -> Self {
        Self {
            behaviors: BehaviorSet::default(),
            active: ActivePlan::default(),
            runner: None,
            pool,
            dirty: true,
            activate_flag: false,
            candidate_goals: Vec::new(),
            candidate: None,
        }
    }

    /// The graph searched this tick; `None` before the first update after an injection.
    pub fn graph(&self) -> Option<&GraphIndex> {
        self.runner.as_ref().map(JobRunner::graph)
    }

    /// Runnable goals of the last update, highest priority first.
    pub fn candidate_goals(&self) -> &[GoalId] {
        &self.candidate_goals
    }

    pub fn candidate_goal(&self) -> Option<GoalId> {
        self.candidate.as_ref().map(|c| c.goal)
    }

    fn rebuild(&mut self) {
        if let Some(mut runner) = self.runner.take() {
            runner.dispose();
        }
        let graph = GraphIndex::build(&self.behaviors);
        self.runner = Some(JobRunner::new(graph, self.pool.clone()));
    }

    fn run_data(&self, host: &Host, graph: &GraphIndex) -> RunData {
        let world = &host.world;
        let origin = world.origin();
        let actions = self.behaviors.actions();

        let mut data = RunData {
            start: 0,
            is_executable: vec![false; graph.node_count()],
            conditions_met: graph
                .conditions()
                .iter()
                .map(|state| world.in_set(state.key(), state.value()))
                .collect(),
            positions: vec![origin; graph.node_count()],
            costs: vec![0.0; graph.node_count()],
            distance_multiplier: host.config().distance_multiplier,
        };
        for (node, action) in actions.iter().enumerate() {
            data.is_executable[node] = action.preconditions_satisfied(world);
            data.costs[node] = action.cost(world);
            data.positions[node] = world.resolve_target(action.name()).or(origin);
        }
        data
    }

    fn submit(&mut self, host: &Host) {
        let Some(runner) = self.runner.as_ref() else {
            return;
        };
        let data = self.run_data(host, runner.graph());
        if let Some(runner) = self.runner.as_mut() {
            runner.run(&self.candidate_goals, &data);
        }
    }

    fn apply(&mut self, completion: Completion, host: &Host) {
        match completion {
            Completion::Idle => {}
            Completion::Empty => {
                self.candidate = None;
                if host.log_fail() {
                    debug!("no path found for any candidate goal");
                }
            }
            Completion::Found { goal, chain } => {
                if host.log_search() {
                    if self.candidate_goal() != Some(goal) {
                        debug!(goal = self.behaviors.goal(goal).name(), "set candidate goal");
                    }
                    let previous = self.candidate.as_ref().and_then(Candidate::action);
                    if let Some(action) = chain.first().filter(|a| Some(**a) != previous) {
                        debug!(action = self.behaviors.action(*action).name(), "set candidate action");
                    }
                }
                self.candidate = Some(Candidate { goal, chain });
            }
        }
    }
}

impl Backend for GraphBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Graph
    }

    fn behaviors(&self) -> &BehaviorSet {
        &self.behaviors
    }

    fn behaviors_mut(&mut self) -> &mut BehaviorSet {
        &mut self.behaviors
    }

    fn active_goal(&self) -> Option<GoalId> {
        self.active.goal()
    }

    fn active_plan(&self) -> Option<&Plan> {
        self.active.plan()
    }

    /// Deferred: takes effect at the start of the next `update`.
    fn manual_activate(&mut self, _host: &mut Host) {
        self.activate_flag = true;
    }

    fn update(&mut self, host: &mut Host) {
        if self.activate_flag {
            host.set_active(true);
            self.activate_flag = false;
        }
        if self.dirty {
            self.dirty = false;
            self.rebuild();
        }
        if !host.is_active() {
            return;
        }

        if !host.config().tick.manual_update_goal {
            self.behaviors.tick_goals(&mut host.world);
        }
        // Only the chain's first step runs; the next search picks the following one.
        let policy = StepPolicy {
            skip_ahead: host.config().skip_ahead,
            advance: false,
        };
        let outcome = self.active.tick(&mut self.behaviors, host, policy);
        if let TickOutcome::Ended(_) = outcome {
            self.candidate = None;
        }

        self.behaviors
            .runnable_goals(&host.world, &mut self.candidate_goals);
        if self.candidate_goals.is_empty() {
            if host.log_fail() {
                debug!("no runnable goals");
            }
            self.candidate = None;
            return;
        }
        if host.log_search() {
            for goal in &self.candidate_goals {
                debug!(goal = self.behaviors.goal(*goal).name(), "add candidate goal");
            }
        }
        if self.active.is_running() && host.config().search_mode >= SearchMode::OnActionComplete {
            return;
        }
        self.submit(host);
    }

    fn late_update(&mut self, host: &mut Host) {
        if !host.is_active() {
            return;
        }
        let completion = match self.runner.as_mut() {
            Some(runner) => runner.complete(),
            None => Completion::Idle,
        };
        self.apply(completion, host);

        let mut changed = false;
        if let Some(candidate) = self.candidate.clone() {
            if self.active.goal() != Some(candidate.goal) {
                // Any goal other than the running one preempts it, whatever its priority.
                self.active
                    .start(candidate.goal, Plan::new(candidate.chain), &mut self.behaviors, host);
                changed = true;
            } else if candidate.action().is_some() && candidate.action() != self.active.action() {
                self.active
                    .switch_plan(Plan::new(candidate.chain), &mut self.behaviors, host);
                changed = true;
            }
        }

        if !changed && host.config().tick.manual_activate_planner {
            host.set_active(false);
            if host.log_search() {
                debug!("manual plan updating ends, waiting for activation");
            }
        }
    }

    fn abort_active_plan(&mut self, host: &mut Host) {
        self.active
            .finish(&mut self.behaviors, host, TraceKind::PlanAborted);
        self.candidate = None;
    }

    fn on_behaviors_injected(&mut self, _host: &mut Host) {
        if let Some(runner) = self.runner.as_mut() {
            runner.dispose();
        }
        self.candidate = None;
        self.candidate_goals.clear();
        self.dirty = true;
    }

    fn disable(&mut self, host: &mut Host) {
        if let Some(completion) = self.runner.as_mut().map(JobRunner::complete) {
            self.apply(completion, host);
        }
    }
}
