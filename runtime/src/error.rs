//! Error types for the runtime.

use snafu::Snafu;

use crate::error_code::ErrorCode;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// The component tree does not describe a bridge with one VEM child.
    #[snafu(display("invalid configuration: {reason}"))]
    Configuration { reason: String },

    #[snafu(display("backend '{backend}' failed to initialise: {source}"))]
    BackendInit { backend: String, source: ErrorCode },

    /// A flushed batch failed. The batch is not retried.
    #[snafu(display("error in scheduled batch of {count} instructions: {source}"))]
    Execution { count: usize, source: ErrorCode },

    #[snafu(display("backend shutdown failed: {source}"))]
    BackendShutdown { source: ErrorCode },

    #[snafu(display("cannot register function '{name}': {source}"))]
    RegisterFunction { name: String, source: ErrorCode },

    #[snafu(display("fusion failed: {source}"))]
    Fusion { source: kernfuse_schedule::Error },

    #[snafu(display("invalid instruction: {source}"))]
    Instruction { source: kernfuse_ir::Error },
}

impl Error {
    /// Backend status code carried by the error, if any.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::BackendInit { source, .. }
            | Self::Execution { source, .. }
            | Self::BackendShutdown { source }
            | Self::RegisterFunction { source, .. } => Some(*source),
            _ => None,
        }
    }
}
