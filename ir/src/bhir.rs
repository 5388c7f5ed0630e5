use crate::{Instruction, Kernel};

/// One batch of the pipeline: the flushed instructions and, after fusion,
/// the kernels that execute them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BhIr {
    pub instr_list: Vec<Instruction>,
    pub kernel_list: Vec<Kernel>,
}

impl BhIr {
    pub fn new(instr_list: Vec<Instruction>) -> Self {
        Self { instr_list, kernel_list: Vec::new() }
    }

    /// Concatenated kernel instructions in kernel order, the stream handed to
    /// the backend.
    pub fn flatten(&self) -> Vec<Instruction> {
        self.kernel_list.iter().flat_map(|k| k.instrs().iter().cloned()).collect()
    }
}
