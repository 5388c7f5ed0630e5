use std::path::PathBuf;

use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Singleton DAG requested for a batch that was already fused.
    #[snafu(display("cannot build a singleton dag: batch already holds {kernels} kernels"))]
    KernelListNotEmpty { kernels: usize },

    /// Extraction found a cycle in `Gd`.
    #[snafu(display("dependency graph over {vertices} vertices has a cycle"))]
    CyclicGraph { vertices: usize },

    /// Writing a DOT dump failed.
    #[snafu(display("failed to write dot file {}: {source}", path.display()))]
    DotIo { path: PathBuf, source: std::io::Error },
}
