use kernfuse_ir::Instruction;

use crate::component::Component;
use crate::error_code::ErrorCode;
use crate::vem::{FuncId, Vem};

/// Backend that accepts every batch without running it.
#[derive(Debug, Default)]
pub struct NullVem {
    batches: usize,
    instructions: usize,
    functions: Vec<String>,
}

impl NullVem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn batches(&self) -> usize {
        self.batches
    }

    pub fn instructions(&self) -> usize {
        self.instructions
    }
}

impl Vem for NullVem {
    fn init(&mut self, component: &Component) -> Result<(), ErrorCode> {
        tracing::debug!(component = component.name(), children = component.children().len(), "null backend ready");
        Ok(())
    }

    fn execute(&mut self, instrs: &[Instruction]) -> Result<(), ErrorCode> {
        self.batches += 1;
        self.instructions += instrs.len();
        tracing::trace!(batch = self.batches, instrs = instrs.len(), "batch discarded");
        Ok(())
    }

    fn shutdown(&mut self) -> Result<(), ErrorCode> {
        tracing::debug!(batches = self.batches, instructions = self.instructions, "null backend shut down");
        Ok(())
    }

    fn reg_func(&mut self, name: &str) -> Result<FuncId, ErrorCode> {
        let id = match self.functions.iter().position(|f| f == name) {
            Some(pos) => pos,
            None => {
                self.functions.push(name.to_string());
                self.functions.len() - 1
            }
        };
        Ok(id as FuncId)
    }

    fn name(&self) -> &str {
        "null"
    }
}
