//! Kernel fusion for kernfuse batches.
//!
//! A batch of instructions becomes a dual graph of single-instruction kernels
//! ([`GraphDW`]); fusion passes merge vertices; the fused DAG is linearised
//! back into the batch's kernel list.
//!
//! - [`graph`] - Dual dependency/weight graph, construction and merge
//! - [`fusion`] - Gentle and greedy passes, the driver and its configuration
//! - [`extract`] - Topological kernel extraction
//! - [`cost`] - DAG cost and weight ordering
//! - [`dot`] - Graphviz output

pub mod cost;
pub mod dot;
pub mod error;
pub mod extract;
pub mod fusion;
pub mod graph;


pub use cost::{dag_cost, sort_weights};
pub use dot::{pprint, write_dot};
pub use error::*;
pub use extract::fill_kernels;
pub use fusion::{FuseConfig, FuseStrategy, Fuser, fuse, fuse_gently, fuse_greedy};
pub use graph::{GraphDW, NO_SAVING, Vertex, WeightEdge};
