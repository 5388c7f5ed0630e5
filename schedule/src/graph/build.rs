use fixedbitset::FixedBitSet;
use kernfuse_ir::{BhIr, Kernel};
use snafu::ensure;

use super::{GraphDW, Vertex, extend_closure};
use crate::error::*;

impl GraphDW {
    /// Singleton DAG: one vertex per instruction, in program order.
    ///
    /// The batch must not carry kernels yet.
    pub fn from_bhir(bhir: &BhIr) -> Result<Self> {
        ensure!(bhir.kernel_list.is_empty(), KernelListNotEmptySnafu { kernels: bhir.kernel_list.len() });

        let graph = Self::from_kernels(bhir.instr_list.iter().map(|instr| Kernel::from_instrs([instr.clone()])));
        tracing::debug!(
            vertices = graph.num_vertices(),
            edges_d = graph.num_edges_d(),
            edges_w = graph.num_edges_w(),
            "singleton dag built"
        );
        Ok(graph)
    }

    /// Dual graph over existing kernels, taken in the given order. Empty
    /// kernels are skipped.
    pub fn from_kernels(kernels: impl IntoIterator<Item = Kernel>) -> Self {
        let mut graph = Self::new();
        for kernel in kernels.into_iter().filter(|k| !k.is_empty()) {
            graph.insert_in_order(kernel);
        }
        graph
    }

    /// Add `kernel` after every existing vertex and connect it.
    ///
    /// Earlier vertices are visited nearest first, so a dependency already
    /// covered through a later vertex is not added again. Every ancestor of a
    /// new predecessor is marked as reaching `k` through it.
    fn insert_in_order(&mut self, kernel: Kernel) -> Vertex {
        let k = self.add_vertex(kernel);
        let earlier: Vec<Vertex> = self.vertices().filter(|&j| j < k).collect();
        let mut covered = FixedBitSet::with_capacity(self.capacity());

        for &j in earlier.iter().rev() {
            let (before, after) = (self.kernel(j), self.kernel(k));
            let dependency = before.dependency(after);
            let cost = before.dependency_cost(after);

            if dependency && !covered.contains(j.0) {
                self.add_edge_d(j, k);
                extend_closure(&self.pred, j, &mut covered);
            }
            if cost > 0 || (cost == 0 && dependency) {
                self.add_edge_w(j, k, cost);
            }
        }
        k
    }
}
