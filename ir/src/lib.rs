//! Intermediate representation of the kernfuse fusion pass.
//!
//! # Module Organization
//!
//! - [`base`] - Base arrays, the unit of aliasing
//! - [`view`] - Strided views over bases and the overlap test
//! - [`constant`] - Scalar constant operands
//! - [`opcode`] / [`instruction`] - Instructions and their access sets
//! - [`kernel`] - Fused instruction bundles with derived lists and cost
//! - [`fusibility`] - Fusibility predicates and the [`FusionPolicy`] seam
//! - [`bhir`] - A batch of instructions and its kernel list

pub mod base;
pub mod bhir;
pub mod constant;
pub mod error;
pub mod fusibility;
pub mod instruction;
pub mod kernel;
pub mod opcode;
pub mod view;


pub use base::{Base, BaseArray, BaseId};
pub use bhir::BhIr;
pub use constant::{ConstValue, Constant};
pub use error::{Error, Result};
pub use fusibility::{DefaultPolicy, FusionPolicy};
pub use instruction::{Instruction, LoopShape, Operand};
pub use kernel::Kernel;
pub use opcode::Opcode;
pub use view::{MAX_DIM, View};
