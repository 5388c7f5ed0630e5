use kernfuse_ir::FusionPolicy;

use crate::cost::sort_weights;
use crate::graph::GraphDW;

/// Merge along the heaviest weight edge that keeps `Gd` acyclic, and repeat
/// until no candidate is left. Empty vertices are removed afterwards.
///
/// With `require_fusible`, pairs rejected by `policy.fusible` are skipped.
/// Returns the number of merges.
pub fn fuse_greedy(graph: &mut GraphDW, policy: &dyn FusionPolicy, require_fusible: bool) -> usize {
    let mut merges = 0;
    'search: loop {
        for edge in sort_weights(graph) {
            let (u, v) = (edge.u, edge.v);
            if require_fusible && !policy.fusible(graph.kernel(u), graph.kernel(v)) {
                tracing::trace!(%u, %v, weight = edge.weight, "greedy candidate not fusible");
                continue;
            }
            if graph.merge_creates_cycle(u, v) {
                tracing::trace!(%u, %v, weight = edge.weight, "greedy candidate closes a cycle");
                continue;
            }

            graph.merge(u, v);
            merges += 1;
            tracing::debug!(%u, %v, weight = edge.weight, "greedy merge");
            continue 'search;
        }
        break;
    }
    graph.remove_empty_vertices();
    merges
}
