//! Generic best-first search over an implicit graph. With an admissible
//! heuristic this is A* and the returned path has minimal cost.

use std::cmp::Reverse;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use priority_queue::PriorityQueue;
use tracing::debug;

use crate::error::Error;

/// Successor relation of an implicit graph. Node identity (`Eq + Hash`)
/// doubles as closed-set membership.
pub trait Graph {
    type Node: Clone + Eq + Hash;

    /// Outgoing edges as `(target, cost)` pairs, cost ≥ 0.
    fn successors(&self, node: &Self::Node) -> Vec<(Self::Node, i32)>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct Path<N> {
    pub nodes: Vec<N>,
    pub cost: i32,
}

fn reconstruct_path<N: Clone + Eq + Hash>(came_from: &HashMap<N, N>, goal: N) -> Vec<N> {
    let mut nodes = vec![goal];
    while let Some(previous) = came_from.get(&nodes[nodes.len() - 1]) {
        nodes.push(previous.clone());
    }
    nodes.reverse();
    nodes
}

/// Lowest-cost path from `start` to any node satisfying `is_goal`, or
/// `SearchTimeout` once the wall-clock budget expires, or `NoPlan` when the
/// reachable graph is exhausted.
pub fn best_first<G, FG, FH>(
    graph: &G,
    start: G::Node,
    mut is_goal: FG,
    mut heuristic: FH,
    timeout: Duration,
) -> Result<Path<G::Node>, Error>
where
    G: Graph,
    FG: FnMut(&G::Node) -> bool,
    FH: FnMut(&G::Node) -> i32,
{
    let deadline = Instant::now() + timeout;
    let mut frontier = PriorityQueue::new();
    let mut came_from: HashMap<G::Node, G::Node> = HashMap::new();
    let mut g_score: HashMap<G::Node, i32> = HashMap::new();
    let start_estimate = heuristic(&start);
    g_score.insert(start.clone(), 0);
    frontier.push(start, Reverse(start_estimate));
    let mut expanded = 0usize;
    while let Some((current, _)) = frontier.pop() {
        if is_goal(&current) {
            let cost = g_score[&current];
            debug!(expanded, cost, "search reached a goal");
            return Ok(Path { nodes: reconstruct_path(&came_from, current), cost });
        }
        if Instant::now() >= deadline {
            debug!(expanded, "search ran out of time");
            return Err(Error::SearchTimeout);
        }
        let current_cost = g_score[&current];
        for (next, edge_cost) in graph.successors(&current) {
            let tentative = current_cost + edge_cost;
            if tentative < g_score.get(&next).copied().unwrap_or(i32::MAX) {
                // Remove before re-inserting so the stored key carries the
                // latest reconstruction metadata, not the one from the
                // first time this state was reached.
                came_from.remove(&next);
                came_from.insert(next.clone(), current.clone());
                g_score.remove(&next);
                let estimate = heuristic(&next);
                g_score.insert(next.clone(), tentative);
                frontier.remove(&next);
                frontier.push(next, Reverse(tentative + estimate));
            }
        }
        expanded += 1;
    }
    debug!(expanded, "search exhausted the graph");
    Err(Error::NoPlan)
}
