use kernfuse_ir::FusionPolicy;

use crate::graph::{GraphDW, Vertex};

/// Merge dependency edges whose fusion cannot cut a sibling off from another
/// fusion, until none is left. Empty vertices are removed afterwards.
///
/// Returns the number of merges.
pub fn fuse_gently(graph: &mut GraphDW, policy: &dyn FusionPolicy) -> usize {
    let mut merges = 0;
    loop {
        let view: &GraphDW = graph;
        let candidate = view
            .edges_d()
            .find(|&(u, v)| private_pair(view, u, v) && policy.fusible_gently(view.kernel(v), view.kernel(u)));
        let Some((u, v)) = candidate else { break };

        graph.merge(u, v);
        merges += 1;
        tracing::debug!(%u, %v, "gentle merge");
    }
    graph.remove_empty_vertices();
    merges
}

/// `v` is a sink fed only by `u`, `u` is a source feeding only `v`, or the
/// edge is a private chain link.
fn private_pair(graph: &GraphDW, u: Vertex, v: Vertex) -> bool {
    let sink = graph.in_degree(v) == 1 && graph.out_degree(v) == 0;
    let source = graph.in_degree(u) == 0 && graph.out_degree(u) == 1;
    let chain = graph.in_degree(v) <= 1 && graph.out_degree(u) <= 1;
    sink || source || chain
}
