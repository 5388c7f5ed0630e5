//! Backend seam: the virtual execution machine that runs instruction streams.

use kernfuse_ir::Instruction;

use crate::component::Component;
use crate::error_code::ErrorCode;

/// Identifier assigned to a registered user function.
pub type FuncId = u64;

/// Execution backend.
///
/// `execute` receives the flattened, post-fusion instruction stream of one
/// batch; kernel boundaries are not passed.
pub trait Vem: Send + std::fmt::Debug {
    /// Called once with the VEM's own component before any batch.
    fn init(&mut self, component: &Component) -> Result<(), ErrorCode> {
        let _ = component;
        Ok(())
    }

    fn execute(&mut self, instrs: &[Instruction]) -> Result<(), ErrorCode>;

    fn shutdown(&mut self) -> Result<(), ErrorCode> {
        Ok(())
    }

    /// Register a user function by name.
    fn reg_func(&mut self, name: &str) -> Result<FuncId, ErrorCode> {
        let _ = name;
        Err(ErrorCode::UserFuncNotSupported)
    }

    fn name(&self) -> &str;
}
