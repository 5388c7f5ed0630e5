use itertools::Itertools;

use crate::graph::{GraphDW, WeightEdge};

/// Total cost of every live kernel, in bytes.
pub fn dag_cost(graph: &GraphDW) -> i64 {
    graph.vertices().map(|v| graph.kernel(v).cost()).sum()
}

/// Weight edges, heaviest first; equal weights in ascending `(u, v)` order.
pub fn sort_weights(graph: &GraphDW) -> Vec<WeightEdge> {
    graph.edges_w().into_iter().sorted_by(|a, b| b.weight.cmp(&a.weight).then((a.u, a.v).cmp(&(b.u, b.v)))).collect()
}
