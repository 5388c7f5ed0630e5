//! Runtime for kernfuse: the front-end entry point.
//!
//! Instructions are buffered in an [`InstructionQueue`]. A flush fuses the
//! batch into kernels and hands the flattened stream to the [`Vem`] backend
//! selected by the component tree.
//!
//! ```text
//! enqueue ──► InstructionQueue ──flush──► Fuser ──► Vem::execute
//! ```

pub mod array;
pub mod backends;
pub mod component;
pub mod config;
pub mod error;
pub mod error_code;
pub mod queue;
pub mod runtime;
pub mod vem;


pub use array::{Array, Input};
pub use backends::NullVem;
pub use component::{Component, ComponentKind};
pub use config::RuntimeConfig;
pub use error::*;
pub use error_code::ErrorCode;
pub use queue::{DEFAULT_QUEUE_CAPACITY, InstructionQueue};
pub use runtime::Runtime;
pub use vem::{FuncId, Vem};
