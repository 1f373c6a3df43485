//! Best-first search over a `GraphIndex`, run as an independent job.

use goap_core::Vec3;

use super::GraphIndex;

/// Per-tick inputs of one search job. Owned by the job; nothing here is shared once submitted.
#[derive(Debug, Clone, Default)]
pub struct RunData {
    pub start: usize,
    /// By node: every precondition currently holds.
    pub is_executable: Vec<bool>,
    /// By condition: the fact currently holds.
    pub conditions_met: Vec<bool>,
    /// By node: position used by the distance heuristic.
    pub positions: Vec<Option<Vec3>>,
    /// By node.
    pub costs: Vec<f32>,
    pub distance_multiplier: f32,
}

#[derive(Debug, Clone, Copy)]
struct NodeData {
    index: usize,
    g: f32,
    h: f32,
    parent: Option<usize>,
}

impl NodeData {
    fn f(&self) -> f32 {
        self.g + self.h
    }
}

/// Search from `run.start` toward an executable node and return the chain of node indices,
/// the executable node first and the start node excluded. Empty when nothing can be reached.
pub fn resolve(graph: &GraphIndex, run: &RunData) -> Vec<usize> {
    let node_count = graph.node_count();
    let mut open: Vec<NodeData> = Vec::with_capacity(node_count);
    let mut closed: Vec<Option<NodeData>> = vec![None; node_count];

    open.push(NodeData {
        index: run.start,
        g: 0.0,
        h: f32::MAX,
        parent: None,
    });

    while let Some(slot) = cheapest(&open) {
        let current = open[slot];
        if run.is_executable[current.index] {
            return retrace(current, &closed);
        }

        closed[current.index] = Some(current);
        open.swap_remove(slot);

        if has_unresolvable_condition(graph, run, current.index) {
            continue;
        }

        for &condition in graph.node_conditions(current.index) {
            if run.conditions_met[condition] {
                continue;
            }
            for &neighbor in graph.condition_connections(condition) {
                if closed[neighbor].is_some() {
                    continue;
                }
                let g = current.g + run.costs[neighbor];
                match open.iter_mut().find(|n| n.index == neighbor) {
                    None => open.push(NodeData {
                        index: neighbor,
                        g,
                        h: heuristic(run, neighbor, current.index),
                        parent: Some(current.index),
                    }),
                    Some(existing) if g < existing.g => {
                        existing.g = g;
                        existing.parent = Some(current.index);
                    }
                    Some(_) => {}
                }
            }
        }
    }
    Vec::new()
}

/// Lowest `f`, ties broken by node index so results do not depend on insertion order.
fn cheapest(open: &[NodeData]) -> Option<usize> {
    open.iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| a.f().total_cmp(&b.f()).then(a.index.cmp(&b.index)))
        .map(|(slot, _)| slot)
}

fn heuristic(run: &RunData, current: usize, previous: usize) -> f32 {
    match (run.positions[previous], run.positions[current]) {
        (Some(from), Some(to)) => from.distance(to) * run.distance_multiplier,
        _ => 0.0,
    }
}

/// A required fact that is false and that no action produces.
fn has_unresolvable_condition(graph: &GraphIndex, run: &RunData, node: usize) -> bool {
    graph
        .node_conditions(node)
        .iter()
        .any(|&c| !run.conditions_met[c] && graph.condition_connections(c).is_empty())
}

fn retrace(last: NodeData, closed: &[Option<NodeData>]) -> Vec<usize> {
    let mut path = Vec::new();
    let mut current = last;
    while let Some(parent) = current.parent {
        path.push(current.index);
        match closed[parent] {
            Some(node) => current = node,
            None => break,
        }
    }
    path
}
