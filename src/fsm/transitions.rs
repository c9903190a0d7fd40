//! Weighted transition tables.
//!
//! Built once per workload at build time from validated edges. States are
//! addressed by index; the name table is carried alongside for reporting.

use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashMap;

/// One outgoing edge with its cumulative probability bound.
#[derive(Debug, Clone, Copy)]
struct Edge {
    target: usize,
    cumulative: f64,
}

/// Per-state cumulative weight vectors over the workload's states.
///
/// Weights are normalised per source state, so `choose` draws in `[0, 1)`
/// and walks the cumulative distribution.
#[derive(Debug, Clone)]
pub struct TransitionTable {
    states: Vec<String>,
    indices: HashMap<String, usize>,
    start: usize,
    edges: Vec<Vec<Edge>>,
}

impl TransitionTable {
    /// Build from validated inputs: an ordered state-name table, the start
    /// state's index, and outgoing `(target, weight)` edges per source.
    /// Callers guarantee indices are in range and weights are positive
    /// and finite; validation lives in the workload builder.
    pub(crate) fn new(
        states: Vec<String>,
        start: usize,
        outgoing: Vec<Vec<(usize, f64)>>,
    ) -> Self {
        let indices = states
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        let edges = outgoing
            .into_iter()
            .map(|edges_for_state| {
                let total: f64 = edges_for_state.iter().map(|(_, w)| *w).sum();
                let mut cumulative = 0.0;
                edges_for_state
                    .into_iter()
                    .map(|(target, weight)| {
                        cumulative += weight / total;
                        Edge { target, cumulative }
                    })
                    .collect()
            })
            .collect();
        Self {
            states,
            indices,
            start,
            edges,
        }
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn state_name(&self, index: usize) -> &str {
        &self.states[index]
    }

    pub fn state_names(&self) -> &[String] {
        &self.states
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.indices.get(name).copied()
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// Pick the next state from `from` by weighted random choice.
    pub fn choose(&self, from: usize, rng: &mut StdRng) -> usize {
        let edges = &self.edges[from];
        let draw: f64 = rng.gen();
        for edge in edges {
            if draw < edge.cumulative {
                return edge.target;
            }
        }
        // Cumulative sums can land a hair under 1.0; the draw then falls
        // through to the last edge.
        edges[edges.len() - 1].target
    }

    /// Outgoing `(target index, normalised probability)` pairs for a state.
    pub fn outgoing(&self, from: usize) -> Vec<(usize, f64)> {
        let edges = &self.edges[from];
        let mut previous = 0.0;
        edges
            .iter()
            .map(|edge| {
                let probability = edge.cumulative - previous;
                previous = edge.cumulative;
                (edge.target, probability)
            })
            .collect()
    }

    /// Indices of all states reachable from the start state.
    pub fn reachable_from_start(&self) -> Vec<bool> {
        let mut reachable = vec![false; self.states.len()];
        let mut frontier = vec![self.start];
        reachable[self.start] = true;
        while let Some(state) = frontier.pop() {
            for edge in &self.edges[state] {
                if !reachable[edge.target] {
                    reachable[edge.target] = true;
                    frontier.push(edge.target);
                }
            }
        }
        reachable
    }
}
