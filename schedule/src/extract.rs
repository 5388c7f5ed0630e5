use kernfuse_ir::BhIr;
use snafu::OptionExt;

use crate::error::*;
use crate::graph::GraphDW;

/// Write the fused kernels of `graph` into `bhir` in topological order,
/// skipping empty vertices. Returns the number of kernels written.
///
/// Fails without touching `bhir` when `Gd` has a cycle.
pub fn fill_kernels(graph: &GraphDW, bhir: &mut BhIr) -> Result<usize> {
    let order = graph.topological_sort().context(CyclicGraphSnafu { vertices: graph.num_vertices() })?;

    bhir.kernel_list =
        order.into_iter().map(|v| graph.kernel(v)).filter(|k| !k.is_empty()).cloned().collect();
    Ok(bhir.kernel_list.len())
}
