use std::sync::Arc;

use kernfuse_ir::{FusionPolicy, Kernel};

use super::{GraphDW, NO_SAVING, Vertex, WeightEdge};

impl GraphDW {
    /// Fuse `b` into `a` in place.
    ///
    /// `b`'s instructions follow `a`'s, or precede them when `b` reaches `a`
    /// in `Gd`. Every neighbour of `b` in either graph becomes a neighbour of
    /// `a`; new weight edges start at [`NO_SAVING`] and are then recomputed
    /// with the rest of `a`'s weights. `b` stays in the graph as an empty,
    /// edgeless vertex.
    ///
    /// The merge never refuses: fusibility and cycle checks are the caller's.
    ///
    /// # Panics
    ///
    /// When `a == b` or either vertex was removed.
    #[track_caller]
    pub fn merge(&mut self, a: Vertex, b: Vertex) {
        assert_ne!(a, b, "cannot merge vertex {a} with itself");
        self.check(a);
        self.check(b);

        let b_first = self.reachable(b, a);
        let absorbed = Arc::clone(self.kernel_arc(b));
        let kernel = self.kernel_mut(a);
        if b_first {
            kernel.prepend(&absorbed);
        } else {
            kernel.extend(&absorbed);
        }

        let successors: Vec<Vertex> = self.successors(b).filter(|&x| x != a).collect();
        let predecessors: Vec<Vertex> = self.predecessors(b).filter(|&x| x != a).collect();
        let weighted: Vec<Vertex> = self.weight_neighbours(b).map(|(x, _)| x).filter(|&x| x != a).collect();

        for x in successors {
            self.add_edge_d(a, x);
        }
        for x in predecessors {
            self.add_edge_d(x, a);
        }
        for x in weighted {
            if self.weight(a, x).is_none() {
                self.add_edge_w(a, x, NO_SAVING);
            }
        }

        self.nullify_vertex(b);
        self.update_weights(a);
        tracing::trace!(%a, %b, b_first, instrs = self.kernel(a).len(), "merged");
    }

    /// Clear every edge of `v` and empty its kernel. The id stays valid.
    #[track_caller]
    pub fn nullify_vertex(&mut self, v: Vertex) {
        self.check(v);
        self.clear_vertex(v);
        self.kernels[v.0] = Arc::new(Kernel::new());
    }

    /// Apply a list of merges, following earlier merges through a
    /// path-compressed representative map.
    ///
    /// Returns whether every merge was between kernels `policy` deems fusible.
    /// Cycles are not checked: a list that contracts a path of length ≥ 2
    /// leaves `Gd` cyclic, and [`crate::fill_kernels`] then refuses the graph.
    pub fn merge_vertices(&mut self, edges: &[WeightEdge], policy: &dyn FusionPolicy) -> bool {
        let mut loc_map: Vec<Vertex> = (0..self.capacity()).map(Vertex).collect();
        let mut all_fusible = true;

        for edge in edges {
            let v1 = find(&mut loc_map, edge.u);
            let v2 = find(&mut loc_map, edge.v);
            if v1 == v2 {
                continue;
            }
            if !policy.fusible(self.kernel(v1), self.kernel(v2)) {
                all_fusible = false;
            }
            self.merge(v1, v2);
            loc_map[v2.0] = v1;
        }
        all_fusible
    }
}

fn find(loc_map: &mut [Vertex], v: Vertex) -> Vertex {
    let mut root = v;
    while loc_map[root.0] != root {
        root = loc_map[root.0];
    }

    let mut cur = v;
    while loc_map[cur.0] != root {
        let next = loc_map[cur.0];
        loc_map[cur.0] = root;
        cur = next;
    }
    root
}
