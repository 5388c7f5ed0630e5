//! Fixed-capacity instruction buffer.

use kernfuse_ir::{Base, Instruction};
use smallvec::SmallVec;

use crate::array::Array;

pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Instructions enqueued since the last flush, in program order.
///
/// Instructions arrive in groups: one front-end instruction followed by the
/// `FREE`/`DISCARD` pairs of its temporary operands. A group is never split
/// across batches.
#[derive(Debug)]
pub struct InstructionQueue {
    instrs: Vec<Instruction>,
    capacity: usize,
}

impl InstructionQueue {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { instrs: Vec::with_capacity(capacity), capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    pub fn as_slice(&self) -> &[Instruction] {
        &self.instrs
    }

    /// Whether a group of `len` instructions can be appended without a flush.
    ///
    /// A group larger than the capacity fits only into an empty queue.
    pub fn fits(&self, len: usize) -> bool {
        self.instrs.is_empty() || self.instrs.len() + len <= self.capacity
    }

    pub fn push(&mut self, group: impl IntoIterator<Item = Instruction>) {
        self.instrs.extend(group);
    }

    /// Hand out the buffered batch and leave the queue empty.
    pub fn take(&mut self) -> Vec<Instruction> {
        std::mem::replace(&mut self.instrs, Vec::with_capacity(self.capacity))
    }

    pub fn clear(&mut self) {
        self.instrs.clear();
    }
}

impl Default for InstructionQueue {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

/// `instr` followed by `FREE` then `DISCARD` for every distinct temporary
/// base among `arrays`, in operand order.
pub fn with_releases<'a>(
    instr: Instruction,
    arrays: impl IntoIterator<Item = &'a Array>,
) -> SmallVec<[Instruction; 7]> {
    let mut released: SmallVec<[&Base; 3]> = SmallVec::new();
    for array in arrays.into_iter().filter(|a| a.is_temporary()) {
        if !released.contains(&array.base()) {
            released.push(array.base());
        }
    }

    let mut group = SmallVec::with_capacity(1 + 2 * released.len());
    group.push(instr);
    for base in released {
        group.push(Instruction::free(base.clone()));
        group.push(Instruction::discard(base.clone()));
    }
    group
}
