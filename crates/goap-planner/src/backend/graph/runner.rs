//! Submits one search job per candidate goal and joins them at a single point.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use goap_core::{ActionId, GoalId};
use rayon::ThreadPool;

use super::job::{self, RunData};
use super::GraphIndex;

#[derive(Debug)]
struct ResolveHandle {
    goal: GoalId,
    receiver: Receiver<Vec<usize>>,
}

impl ResolveHandle {
    /// Block until the job has finished. A job that died without answering counts as empty.
    fn complete(self) -> Vec<usize> {
        self.receiver.recv().unwrap_or_default()
    }
}

/// Result of joining one batch of jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Nothing was submitted since the last join.
    Idle,
    /// The highest-priority goal whose job found a chain.
    Found { goal: GoalId, chain: Vec<ActionId> },
    /// Every job came back empty.
    Empty,
}

#[derive(Debug)]
pub struct JobRunner {
    graph: Arc<GraphIndex>,
    pool: Option<Arc<ThreadPool>>,
    handles: Vec<ResolveHandle>,
}

impl JobRunner {
    pub fn new(graph: GraphIndex, pool: Option<Arc<ThreadPool>>) -> Self {
        Self {
            graph: Arc::new(graph),
            pool,
            handles: Vec::new(),
        }
    }

    pub fn graph(&self) -> &GraphIndex {
        &self.graph
    }

    pub fn is_running(&self) -> bool {
        !self.handles.is_empty()
    }

    /// Submit one job per goal, in the given (priority) order. `template` carries everything but
    /// the start node.
    pub fn run(&mut self, goals: &[GoalId], template: &RunData) {
        self.dispose();
        for &goal in goals {
            let mut data = template.clone();
            data.start = self.graph.goal_node(goal);

            let (sender, receiver) = mpsc::channel();
            let graph = Arc::clone(&self.graph);
            let task = move || {
                // The receiver is gone only if the runner was dropped; the result is moot then.
                let _ = sender.send(job::resolve(&graph, &data));
            };
            match &self.pool {
                Some(pool) => pool.spawn(task),
                None => rayon::spawn(task),
            }
            self.handles.push(ResolveHandle { goal, receiver });
        }
    }

    /// Wait for every submitted job. The first goal in submission order with a non-empty chain
    /// wins; the remaining jobs are still waited on.
    pub fn complete(&mut self) -> Completion {
        if self.handles.is_empty() {
            return Completion::Idle;
        }
        let mut found = None;
        for handle in self.handles.drain(..) {
            let goal = handle.goal;
            let chain = handle.complete();
            if found.is_some() || chain.is_empty() {
                continue;
            }
            let chain: Vec<ActionId> = chain
                .into_iter()
                .filter_map(|node| self.graph.action_at(node))
                .collect();
            if !chain.is_empty() {
                found = Some((goal, chain));
            }
        }
        match found {
            Some((goal, chain)) => Completion::Found { goal, chain },
            None => Completion::Empty,
        }
    }

    /// Wait for outstanding jobs and discard their results.
    pub fn dispose(&mut self) {
        for handle in self.handles.drain(..) {
            handle.complete();
        }
    }
}

impl Drop for JobRunner {
    fn drop(&mut self) {
        self.dispose();
    }
}
