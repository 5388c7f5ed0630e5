//! Fusibility predicates and the policy seam used by the fusion passes.

use itertools::Itertools;

use crate::view::{Shape, broadcastable};
use crate::{Kernel, LoopShape};

impl Kernel {
    /// Structural compatibility of two kernels. Symmetric.
    ///
    /// Empty kernels fuse with anything; kernels containing `SYNC` fuse with
    /// nothing else. Elementwise loop shapes must broadcast against each other.
    /// When a reduction is present, all reductions must share input shape and
    /// axis, and elementwise loops must run over that same input shape.
    pub fn fusible(&self, other: &Kernel) -> bool {
        if self.is_empty() || other.is_empty() {
            return true;
        }
        if self.has_sync() || other.has_sync() {
            return false;
        }

        let (elementwise, reductions) = split_shapes(self, other);
        match reductions.first() {
            Some((input, axis)) => {
                reductions.iter().all(|(i, a)| i == input && a == axis) && elementwise.iter().all(|s| s == input)
            }
            None => elementwise.iter().tuple_combinations().all(|(a, b)| broadcastable(a, b)),
        }
    }

    /// [`Kernel::fusible`] restricted to merges that cannot change the loop
    /// structure of either side: one kernel is pure bookkeeping, or both are
    /// reduction-free and run over identical shapes.
    pub fn fusible_gently(&self, other: &Kernel) -> bool {
        if !self.fusible(other) {
            return false;
        }
        if self.is_system_only() || other.is_system_only() {
            return true;
        }

        let (elementwise, reductions) = split_shapes(self, other);
        reductions.is_empty() && elementwise.iter().all_equal()
    }
}

fn split_shapes(a: &Kernel, b: &Kernel) -> (Vec<Shape>, Vec<(Shape, usize)>) {
    a.loop_shapes().chain(b.loop_shapes()).partition_map(|shape| match shape {
        LoopShape::Elementwise(shape) => itertools::Either::Left(shape),
        LoopShape::Reduction { input, axis } => itertools::Either::Right((input, axis)),
    })
}

/// Fusibility strategy consulted by the fusion passes.
///
/// The default methods forward to [`Kernel::fusible`] and
/// [`Kernel::fusible_gently`]; alternative heuristics override either one
/// without touching the graph machinery.
pub trait FusionPolicy: Send + Sync + std::fmt::Debug {
    fn fusible(&self, a: &Kernel, b: &Kernel) -> bool {
        a.fusible(b)
    }

    fn fusible_gently(&self, a: &Kernel, b: &Kernel) -> bool {
        a.fusible_gently(b)
    }

    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultPolicy;

impl FusionPolicy for DefaultPolicy {
    fn name(&self) -> &str {
        "default"
    }
}
