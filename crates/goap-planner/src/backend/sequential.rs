//! Backward-chaining search on the calling thread.
//!
//! For a goal, every action that supplies part of the goal's conditions is a possible entry
//! point. Entry points are tried cheapest first; from each, the search keeps an open list of
//! candidate links and a closed list of accepted ones, and repeatedly accepts the cheapest open
//! link that fits the requirement left over by some accepted chain. A chain succeeds once its
//! remaining requirement already holds in the world.

use goap_core::{Action, ActionId, FactMap, GoalId, Handle, ListPool, Plan, Pool, WorldState};
use goap_tools::TraceKind;
use tracing::{debug, trace};

use crate::active::{ActivePlan, StepPolicy, TickOutcome};
use crate::scratch::{SearchNode, StateDelta};
use crate::{Backend, BackendKind, BehaviorSet, Host, SearchMode};

const CAPACITY: usize = 10;

#[derive(Debug, Clone, Copy)]
struct SearchLog {
    search: bool,
    fail: bool,
}

impl SearchLog {
    fn from_host(host: &Host) -> Self {
        Self {
            search: host.log_search(),
            fail: host.log_fail(),
        }
    }
}

#[derive(Debug)]
pub struct SequentialBackend {
    behaviors: BehaviorSet,
    active: ActivePlan,
    scratch: Scratch,
    plans: ListPool<ActionId>,
}

impl Default for SequentialBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SequentialBackend {
    pub fn new() -> Self {
        Self {
            behaviors: BehaviorSet::default(),
            active: ActivePlan::default(),
            scratch: Scratch::new(),
            plans: ListPool::new(CAPACITY),
        }
    }

    /// Live search nodes. Zero between searches.
    pub fn live_search_nodes(&self) -> usize {
        self.scratch.nodes.live_len()
    }

    /// The highest-priority goal whose preconditions hold, whose conditions do not hold yet,
    /// and that has a plan.
    ///
    /// Goals are visited in injection order; a later goal replaces the current choice only with
    /// a strictly higher priority, so ties go to the goal injected first.
    pub fn highest_priority_goal(&mut self, host: &Host) -> Option<(GoalId, Vec<ActionId>)> {
        let log = SearchLog::from_host(host);
        let world = &host.world;
        let BehaviorSet { goals, actions } = &mut self.behaviors;
        if goals.is_empty() {
            if log.fail {
                debug!("no goals found");
            }
            return None;
        }

        let mut chosen: Option<(GoalId, f32, Vec<ActionId>)> = None;
        for (i, goal) in goals.iter().enumerate() {
            if !goal.preconditions_satisfied(world) {
                if log.fail {
                    debug!(goal = goal.name(), "goal not valid as its preconditions are not satisfied");
                }
                continue;
            }
            if goal.conditions_satisfied(world) {
                if log.fail {
                    debug!(goal = goal.name(), "goal skipped as its conditions already hold");
                }
                continue;
            }
            let priority = goal.priority(world);
            if let Some((best, best_priority, _)) = &chosen {
                if priority.total_cmp(best_priority).is_le() {
                    continue;
                }
                if log.search {
                    debug!(goal = goal.name(), over = goals[best.0].name(), "goal has higher priority");
                }
            }

            if log.search {
                debug!(goal = goal.name(), "searching for plan");
            }
            let path = self
                .scratch
                .optimal_path(goal.conditions(), actions, world, &mut self.plans, log);
            if let Some(path) = path {
                if log.search {
                    debug!(goal = goal.name(), "path found, chosen goal updated");
                }
                if let Some((_, _, replaced)) = chosen.replace((GoalId(i), priority, path)) {
                    self.plans.give(replaced);
                }
            }
        }
        chosen.map(|(goal, _, path)| (goal, path))
    }

    fn recycle(&mut self, plan: Option<Plan>) {
        if let Some(plan) = plan {
            self.plans.give(plan.into_steps());
        }
    }

    fn should_search(&self, host: &Host, moved: bool) -> bool {
        match host.config().search_mode {
            SearchMode::Always => true,
            SearchMode::OnActionComplete => !self.active.is_running() || moved,
            SearchMode::OnPlanComplete => !self.active.is_running(),
        }
    }
}

impl Backend for SequentialBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Sequential
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

    fn manual_activate(&mut self, host: &mut Host) {
        host.set_active(true);
    }

    fn update(&mut self, host: &mut Host) {
        if !host.is_active() {
            return;
        }
        if !host.config().tick.manual_update_goal {
            self.behaviors.tick_goals(&mut host.world);
        }

        let policy = StepPolicy {
            skip_ahead: host.config().skip_ahead,
            advance: true,
        };
        let moved = match self.active.tick(&mut self.behaviors, host, policy) {
            TickOutcome::Ended(plan) => {
                self.recycle(Some(plan));
                false
            }
            TickOutcome::Running { moved } => moved,
            TickOutcome::Idle => false,
        };

        let candidate = if self.should_search(host, moved) {
            self.highest_priority_goal(host)
        } else {
            None
        };
        match candidate {
            // Any goal other than the running one preempts it, whatever its priority.
            Some((goal, steps)) if self.active.goal() != Some(goal) => {
                let previous = self
                    .active
                    .start(goal, Plan::new(steps), &mut self.behaviors, host);
                self.recycle(previous);
            }
            unchanged => {
                if let Some((_, steps)) = unchanged {
                    self.plans.give(steps);
                }
                if host.config().tick.manual_activate_planner {
                    host.set_active(false);
                    if host.log_search() {
                        debug!("manual plan updating ends, waiting for activation");
                    }
                }
            }
        }
    }

    fn abort_active_plan(&mut self, host: &mut Host) {
        let plan = self
            .active
            .finish(&mut self.behaviors, host, TraceKind::PlanAborted);
        self.recycle(plan);
    }
}

#[derive(Debug)]
struct Scratch {
    nodes: Pool<SearchNode>,
    deltas: Pool<StateDelta>,
    open: Vec<Handle<SearchNode>>,
    closed: Vec<Handle<SearchNode>>,
    start_actions: Vec<ActionId>,
    linked: Vec<ActionId>,
}

impl Scratch {
    fn new() -> Self {
        Self {
            nodes: Pool::with_capacity(CAPACITY),
            deltas: Pool::with_capacity(CAPACITY),
            open: Vec::with_capacity(CAPACITY),
            closed: Vec::with_capacity(CAPACITY),
            start_actions: Vec::with_capacity(CAPACITY),
            linked: Vec::with_capacity(CAPACITY),
        }
    }

    fn optimal_path(
        &mut self,
        conditions: &FactMap,
        actions: &mut [Action],
        world: &WorldState,
        plans: &mut ListPool<ActionId>,
        log: SearchLog,
    ) -> Option<Vec<ActionId>> {
        self.start_actions.clear();
        for (i, action) in actions.iter_mut().enumerate() {
            if action.satisfies_conditions(world, conditions) {
                if log.search {
                    debug!(action = action.name(), "action satisfies goal conditions");
                }
                self.start_actions.push(ActionId(i));
            }
        }
        if self.start_actions.is_empty() {
            if log.fail {
                debug!("no path found, no action satisfies the goal conditions");
            }
            return None;
        }
        self.start_actions
            .sort_by(|a, b| actions[a.0].cost(world).total_cmp(&actions[b.0].cost(world)));

        for n in 0..self.start_actions.len() {
            let start = self.start_actions[n];
            if let Some(path) = self.search_from(start, conditions, actions, world, plans, log) {
                return Some(path);
            }
            if log.fail {
                debug!(action = actions[start.0].name(), "no path from start action");
            }
        }
        if log.fail {
            debug!("no path found");
        }
        None
    }

    fn search_from(
        &mut self,
        start: ActionId,
        conditions: &FactMap,
        actions: &mut [Action],
        world: &WorldState,
        plans: &mut ListPool<ActionId>,
        log: SearchLog,
    ) -> Option<Vec<ActionId>> {
        let root = self.deltas.acquire();
        self.deltas[root].states.clone_from(conditions);
        self.push_open(None, start);

        let mut path = None;
        while !self.open.is_empty() {
            let Some(current) = self.next_node(root, actions, world, log) else {
                if log.fail {
                    trace!("no open action fits the remaining requirement");
                }
                break;
            };

            let remaining = self.deltas.acquire();
            copy_delta(&mut self.deltas, root, remaining);
            append_state(&mut self.deltas[remaining], current, &self.nodes, actions, log);
            self.closed.push(current);
            self.open.retain(|node| *node != current);

            if world.is_subset(&self.deltas[remaining].states) {
                self.deltas.release(remaining);
                path = Some(self.generate_path(current, plans));
                break;
            }

            let current_action = self.nodes[current].action;
            let linked_to = log.search.then(|| actions[current_action.0].name().to_string());
            self.linked.clear();
            let required = &self.deltas[remaining].states;
            for (i, action) in actions.iter_mut().enumerate() {
                if action.satisfies_conditions(world, required) {
                    if let Some(to) = &linked_to {
                        debug!(action = action.name(), to = to.as_str(), "action is linked");
                    }
                    self.linked.push(ActionId(i));
                } else if log.fail {
                    trace!(action = action.name(), "action does not satisfy the remaining requirement");
                }
            }
            self.deltas.release(remaining);

            for n in 0..self.linked.len() {
                let action = self.linked[n];
                if !self.is_listed(action) {
                    self.push_open(Some(current), action);
                }
            }
        }

        self.release(root);
        path
    }

    /// The cheapest open node that fits the remaining requirement of some accepted chain. Before
    /// anything is accepted, the goal conditions themselves are the requirement.
    fn next_node(
        &mut self,
        root: Handle<StateDelta>,
        actions: &mut [Action],
        world: &WorldState,
        log: SearchLog,
    ) -> Option<Handle<SearchNode>> {
        if self.closed.is_empty() {
            let required = &self.deltas[root].states;
            let picked = cheapest_fit(required, &self.open, &self.nodes, actions, world, log);
            if let Some((node, cost)) = picked {
                if log.search {
                    let action = actions[self.nodes[node].action.0].name();
                    debug!(action, cost, "action satisfies with min cost");
                }
            }
            return picked.map(|(node, _)| node);
        }

        let mut best: Option<(Handle<SearchNode>, f32)> = None;
        for i in 0..self.closed.len() {
            let replay = self.deltas.acquire();
            copy_delta(&mut self.deltas, root, replay);
            append_state(&mut self.deltas[replay], self.closed[i], &self.nodes, actions, log);
            let picked = cheapest_fit(
                &self.deltas[replay].states,
                &self.open,
                &self.nodes,
                actions,
                world,
                log,
            );
            self.deltas.release(replay);
            if let Some((node, cost)) = picked {
                if best.is_none_or(|(_, best_cost)| cost < best_cost) {
                    best = Some((node, cost));
                }
            }
        }

        match best {
            Some((node, _)) if log.search => {
                debug!(action = actions[self.nodes[node].action.0].name(), "selected action");
            }
            None if log.fail => debug!("could not find next action"),
            _ => {}
        }
        best.map(|(node, _)| node)
    }

    fn push_open(&mut self, parent: Option<Handle<SearchNode>>, action: ActionId) {
        let node = self.nodes.acquire();
        self.nodes[node] = SearchNode { parent, action };
        self.open.push(node);
    }

    fn is_listed(&self, action: ActionId) -> bool {
        self.open
            .iter()
            .chain(&self.closed)
            .any(|node| self.nodes[*node].action == action)
    }

    /// Actions from `current` back to the start action; the first entry runs first.
    fn generate_path(
        &self,
        current: Handle<SearchNode>,
        plans: &mut ListPool<ActionId>,
    ) -> Vec<ActionId> {
        let mut path = plans.take();
        let mut next = Some(current);
        while let Some(handle) = next {
            let node = self.nodes[handle];
            path.push(node.action);
            next = node.parent;
        }
        path
    }

    fn release(&mut self, root: Handle<StateDelta>) {
        for node in self.open.drain(..).chain(self.closed.drain(..)) {
            self.nodes.release(node);
        }
        self.deltas.release(root);
    }
}

fn copy_delta(deltas: &mut Pool<StateDelta>, from: Handle<StateDelta>, to: Handle<StateDelta>) {
    let source = std::mem::take(&mut deltas[from]);
    deltas[to].copy_from(&source);
    deltas[from] = source;
}

/// Replay a chain from its start: each action removes what it produces from the requirement and
/// adds what it needs.
fn append_state(
    delta: &mut StateDelta,
    node: Handle<SearchNode>,
    nodes: &Pool<SearchNode>,
    actions: &[Action],
    log: SearchLog,
) {
    let SearchNode { parent, action } = nodes[node];
    if let Some(parent) = parent {
        append_state(delta, parent, nodes, actions, log);
    }
    let action = &actions[action.0];
    delta.delete_intersection(action.effects());
    // Conflicting preconditions are merged permissively; the replay keeps going.
    if !delta.try_join(action.preconditions()) && log.fail {
        trace!(action = action.name(), "precondition conflicts with the remaining requirement");
    }
}

fn cheapest_fit(
    required: &FactMap,
    open: &[Handle<SearchNode>],
    nodes: &Pool<SearchNode>,
    actions: &mut [Action],
    world: &WorldState,
    log: SearchLog,
) -> Option<(Handle<SearchNode>, f32)> {
    let mut best: Option<(Handle<SearchNode>, f32)> = None;
    for node in open {
        let action = &mut actions[nodes[*node].action.0];
        if !action.satisfies_conditions(world, required) {
            if log.fail {
                trace!(action = action.name(), "action does not satisfy conditions");
            }
            continue;
        }
        let cost = action.cost(world);
        if best.is_none_or(|(_, best_cost)| cost < best_cost) {
            best = Some((*node, cost));
        }
    }
    best
}
