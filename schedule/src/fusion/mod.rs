//! Fusion driver: singleton DAG, configured passes, topological extraction.
//!
//! ```text
//! BhIr.instr_list
//!     ↓
//! GraphDW::from_bhir      → one vertex per instruction
//!     ↓
//! fuse_gently / fuse_greedy (per FuseConfig::strategies)
//!     ↓
//! fill_kernels            → BhIr.kernel_list
//! ```

pub mod config;
mod gentle;
mod greedy;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use kernfuse_ir::{BhIr, DefaultPolicy, FusionPolicy};

pub use config::{FuseConfig, FuseStrategy};
pub use gentle::fuse_gently;
pub use greedy::fuse_greedy;

use crate::cost::dag_cost;
use crate::dot::pprint;
use crate::error::*;
use crate::extract::fill_kernels;
use crate::graph::GraphDW;

/// Runs the fusion pipeline on one batch at a time.
#[derive(Debug)]
pub struct Fuser {
    config: FuseConfig,
    policy: Arc<dyn FusionPolicy>,
    batches: AtomicUsize,
}

impl Fuser {
    pub fn new(config: FuseConfig) -> Self {
        Self::with_policy(config, Arc::new(DefaultPolicy))
    }

    pub fn with_policy(config: FuseConfig, policy: Arc<dyn FusionPolicy>) -> Self {
        Self { config, policy, batches: AtomicUsize::new(0) }
    }

    pub fn config(&self) -> &FuseConfig {
        &self.config
    }

    /// Fuse the instructions of `bhir` and write the kernels into its kernel list.
    ///
    /// Returns the number of kernels.
    #[tracing::instrument(skip_all, fields(instrs = bhir.instr_list.len(), policy = self.policy.name()))]
    pub fn fuse(&self, bhir: &mut BhIr) -> Result<usize> {
        let batch = self.batches.fetch_add(1, Ordering::Relaxed);
        let mut graph = GraphDW::from_bhir(bhir)?;
        self.dump(&graph, batch, "pre")?;

        let initial_cost = dag_cost(&graph);
        for strategy in &self.config.strategies {
            let merges = match strategy {
                FuseStrategy::Singleton => 0,
                FuseStrategy::Gentle => fuse_gently(&mut graph, self.policy.as_ref()),
                FuseStrategy::Greedy => {
                    fuse_greedy(&mut graph, self.policy.as_ref(), self.config.greedy_requires_fusible)
                }
            };
            tracing::debug!(%strategy, merges, vertices = graph.num_vertices(), "pass finished");
        }

        self.dump(&graph, batch, "post")?;
        let kernels = fill_kernels(&graph, bhir)?;
        tracing::debug!(kernels, cost.initial = initial_cost, cost.fused = dag_cost(&graph), "batch fused");
        Ok(kernels)
    }

    fn dump(&self, graph: &GraphDW, batch: usize, stage: &str) -> Result<()> {
        match &self.config.dot_dir {
            Some(dir) => pprint(graph, dir.join(format!("batch-{batch:04}-{stage}.dot"))),
            None => Ok(()),
        }
    }
}

/// Fuse one batch with a fresh [`Fuser`].
pub fn fuse(bhir: &mut BhIr, config: &FuseConfig) -> Result<usize> {
    Fuser::new(config.clone()).fuse(bhir)
}
