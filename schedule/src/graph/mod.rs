//! Dual dependency/weight graph over kernels.
//!
//! `Gd` is a directed acyclic dependency graph, `Gw` an undirected graph whose
//! edges carry the bytes saved by fusing their endpoints. Both share one vertex
//! arena. Vertex ids are stable: merging nullifies the absorbed vertex instead
//! of removing it, and removal only clears the liveness bit.

mod build;
mod merge;

use std::collections::{BTreeMap, BTreeSet, BinaryHeap, VecDeque};
use std::cmp::Reverse;
use std::fmt;
use std::sync::Arc;

use fixedbitset::FixedBitSet;
use kernfuse_ir::Kernel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Vertex(pub usize);

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Undirected weight edge, stored with `u < v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightEdge {
    pub u: Vertex,
    pub v: Vertex,
    pub weight: i64,
}

/// Weight of a pair that shares a base but saves nothing when fused.
pub const NO_SAVING: i64 = -1;

#[derive(Debug, Clone, Default)]
pub struct GraphDW {
    kernels: Vec<Arc<Kernel>>,
    alive: FixedBitSet,
    succ: Vec<BTreeSet<Vertex>>,
    pred: Vec<BTreeSet<Vertex>>,
    weights: Vec<BTreeMap<Vertex, i64>>,
}

impl GraphDW {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vertex(&mut self, kernel: Kernel) -> Vertex {
        let v = Vertex(self.kernels.len());
        self.kernels.push(Arc::new(kernel));
        self.succ.push(BTreeSet::new());
        self.pred.push(BTreeSet::new());
        self.weights.push(BTreeMap::new());
        self.alive.grow(v.0 + 1);
        self.alive.insert(v.0);
        v
    }

    pub fn is_alive(&self, v: Vertex) -> bool {
        self.alive.contains(v.0)
    }

    #[track_caller]
    fn check(&self, v: Vertex) {
        assert!(self.is_alive(v), "vertex {v} is not part of the graph");
    }

    /// Live vertices in id order.
    pub fn vertices(&self) -> impl Iterator<Item = Vertex> + '_ {
        self.alive.ones().map(Vertex)
    }

    pub fn num_vertices(&self) -> usize {
        self.alive.count_ones(..)
    }

    /// Upper bound on vertex ids, removed vertices included.
    pub fn capacity(&self) -> usize {
        self.kernels.len()
    }

    #[track_caller]
    pub fn kernel(&self, v: Vertex) -> &Kernel {
        self.check(v);
        &self.kernels[v.0]
    }

    #[track_caller]
    pub(crate) fn kernel_arc(&self, v: Vertex) -> &Arc<Kernel> {
        self.check(v);
        &self.kernels[v.0]
    }

    /// Mutable kernel payload; clones it first when shared with another graph.
    #[track_caller]
    pub fn kernel_mut(&mut self, v: Vertex) -> &mut Kernel {
        self.check(v);
        Arc::make_mut(&mut self.kernels[v.0])
    }

    // ------------------------------------------------------------------
    // Dependency edges
    // ------------------------------------------------------------------

    #[track_caller]
    pub fn add_edge_d(&mut self, from: Vertex, to: Vertex) {
        assert_ne!(from, to, "dependency self-loop on {from}");
        self.check(from);
        self.check(to);
        self.succ[from.0].insert(to);
        self.pred[to.0].insert(from);
    }

    pub fn remove_edge_d(&mut self, from: Vertex, to: Vertex) -> bool {
        self.pred[to.0].remove(&from);
        self.succ[from.0].remove(&to)
    }

    pub fn has_edge_d(&self, from: Vertex, to: Vertex) -> bool {
        self.succ[from.0].contains(&to)
    }

    pub fn successors(&self, v: Vertex) -> impl Iterator<Item = Vertex> + '_ {
        self.succ[v.0].iter().copied()
    }

    pub fn predecessors(&self, v: Vertex) -> impl Iterator<Item = Vertex> + '_ {
        self.pred[v.0].iter().copied()
    }

    pub fn in_degree(&self, v: Vertex) -> usize {
        self.pred[v.0].len()
    }

    pub fn out_degree(&self, v: Vertex) -> usize {
        self.succ[v.0].len()
    }

    /// Dependency edges ordered by `(from, to)`.
    pub fn edges_d(&self) -> impl Iterator<Item = (Vertex, Vertex)> + '_ {
        self.vertices().flat_map(move |u| self.successors(u).map(move |v| (u, v)))
    }

    pub fn num_edges_d(&self) -> usize {
        self.succ.iter().map(BTreeSet::len).sum()
    }

    // ------------------------------------------------------------------
    // Weight edges
    // ------------------------------------------------------------------

    #[track_caller]
    pub fn add_edge_w(&mut self, u: Vertex, v: Vertex, weight: i64) {
        assert_ne!(u, v, "weight self-loop on {u}");
        self.check(u);
        self.check(v);
        self.weights[u.0].insert(v, weight);
        self.weights[v.0].insert(u, weight);
    }

    pub fn remove_edge_w(&mut self, u: Vertex, v: Vertex) -> bool {
        self.weights[v.0].remove(&u);
        self.weights[u.0].remove(&v).is_some()
    }

    pub fn weight(&self, u: Vertex, v: Vertex) -> Option<i64> {
        self.weights[u.0].get(&v).copied()
    }

    /// Weight neighbours of `v` in id order.
    pub fn weight_neighbours(&self, v: Vertex) -> impl Iterator<Item = (Vertex, i64)> + '_ {
        self.weights[v.0].iter().map(|(&x, &w)| (x, w))
    }

    /// Weight edges ordered by `(u, v)`, each reported once with `u < v`.
    pub fn edges_w(&self) -> Vec<WeightEdge> {
        self.vertices()
            .flat_map(|u| {
                self.weights[u.0].range(Vertex(u.0 + 1)..).map(move |(&v, &weight)| WeightEdge { u, v, weight })
            })
            .collect()
    }

    pub fn num_edges_w(&self) -> usize {
        self.weights.iter().map(BTreeMap::len).sum::<usize>() / 2
    }

    // ------------------------------------------------------------------
    // Reachability
    // ------------------------------------------------------------------

    /// True iff `to` is reachable from `from` through at least one
    /// intermediate vertex (a path of length ≥ 2 in `Gd`).
    pub fn path_exist(&self, from: Vertex, to: Vertex) -> bool {
        let mut visited = FixedBitSet::with_capacity(self.capacity());
        let mut queue: VecDeque<Vertex> = self.successors(from).filter(|&s| s != to).collect();
        for s in &queue {
            visited.insert(s.0);
        }

        while let Some(x) = queue.pop_front() {
            for y in self.successors(x) {
                if y == to {
                    return true;
                }
                if !visited.put(y.0) {
                    queue.push_back(y);
                }
            }
        }
        false
    }

    /// True iff `to` is reachable from `from` (a path of length ≥ 1).
    pub fn reachable(&self, from: Vertex, to: Vertex) -> bool {
        self.has_edge_d(from, to) || self.path_exist(from, to)
    }

    /// Contracting `{a, b}` closes a cycle iff a path of length ≥ 2 joins them.
    pub fn merge_creates_cycle(&self, a: Vertex, b: Vertex) -> bool {
        self.path_exist(a, b) || self.path_exist(b, a)
    }

    /// Kahn's algorithm, always taking the smallest ready vertex id.
    ///
    /// Returns `None` when `Gd` has a cycle.
    pub fn topological_sort(&self) -> Option<Vec<Vertex>> {
        let mut in_degree: Vec<usize> = self.pred.iter().map(BTreeSet::len).collect();
        let mut ready: BinaryHeap<Reverse<Vertex>> =
            self.vertices().filter(|v| in_degree[v.0] == 0).map(Reverse).collect();

        let mut order = Vec::with_capacity(self.num_vertices());
        while let Some(Reverse(v)) = ready.pop() {
            order.push(v);
            for s in self.successors(v) {
                in_degree[s.0] -= 1;
                if in_degree[s.0] == 0 {
                    ready.push(Reverse(s));
                }
            }
        }

        (order.len() == self.num_vertices()).then_some(order)
    }

    pub fn has_cycles(&self) -> bool {
        self.topological_sort().is_none()
    }

    // ------------------------------------------------------------------
    // Removal
    // ------------------------------------------------------------------

    /// Remove every dependency and weight edge incident to `v`.
    pub fn clear_vertex(&mut self, v: Vertex) {
        for s in std::mem::take(&mut self.succ[v.0]) {
            self.pred[s.0].remove(&v);
        }
        for p in std::mem::take(&mut self.pred[v.0]) {
            self.succ[p.0].remove(&v);
        }
        for x in std::mem::take(&mut self.weights[v.0]).into_keys() {
            self.weights[x.0].remove(&v);
        }
    }

    /// Drop `v` from the graph. Other vertex ids are unaffected.
    #[track_caller]
    pub fn remove_vertex(&mut self, v: Vertex) {
        self.check(v);
        self.clear_vertex(v);
        self.kernels[v.0] = Arc::default();
        self.alive.set(v.0, false);
    }

    /// Remove every live vertex whose kernel has no instructions.
    pub fn remove_empty_vertices(&mut self) -> usize {
        let empty: Vec<Vertex> = self.vertices().filter(|&v| self.kernels[v.0].is_empty()).collect();
        for &v in &empty {
            self.remove_vertex(v);
        }
        empty.len()
    }

    /// Recompute every weight edge incident to `v`; edges whose kernels no
    /// longer share a base are deleted.
    ///
    /// The pair is priced in dependency order when one exists, otherwise in
    /// vertex id order.
    pub fn update_weights(&mut self, v: Vertex) {
        let descendants = self.descendants(v);
        let ancestors = self.ancestors(v);
        let neighbours: Vec<Vertex> = self.weights[v.0].keys().copied().collect();
        for x in neighbours {
            let (first, second) = if descendants.contains(x.0) {
                (v, x)
            } else if ancestors.contains(x.0) {
                (x, v)
            } else {
                (v.min(x), v.max(x))
            };
            let cost = self.kernels[first.0].dependency_cost(&self.kernels[second.0]);
            if cost < 0 {
                self.remove_edge_w(v, x);
            } else {
                self.add_edge_w(v, x, cost);
            }
        }
    }

    /// Every vertex reachable from `v` in `Gd`, `v` excluded.
    pub fn descendants(&self, v: Vertex) -> FixedBitSet {
        closure(&self.succ, v)
    }

    /// Every vertex that reaches `v` in `Gd`, `v` excluded.
    pub fn ancestors(&self, v: Vertex) -> FixedBitSet {
        closure(&self.pred, v)
    }
}

fn closure(adjacency: &[BTreeSet<Vertex>], v: Vertex) -> FixedBitSet {
    let mut seen = FixedBitSet::with_capacity(adjacency.len());
    extend_closure(adjacency, v, &mut seen);
    seen
}

/// Add everything reachable from `v` along `adjacency` to `seen`; vertices
/// already in `seen` are not expanded again.
fn extend_closure(adjacency: &[BTreeSet<Vertex>], v: Vertex, seen: &mut FixedBitSet) {
    let mut stack: Vec<Vertex> = adjacency[v.0].iter().copied().collect();
    while let Some(x) = stack.pop() {
        if !seen.put(x.0) {
            stack.extend(adjacency[x.0].iter().copied());
        }
    }
}
