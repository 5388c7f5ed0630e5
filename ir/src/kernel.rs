//! Kernels: ordered instruction bundles executed as one fused loop nest.
//!
//! A kernel keeps its derived lists (inputs, outputs, temps) consistent with
//! its instruction list after every mutation. Appending updates the lists
//! incrementally; prepending rebuilds them from scratch.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::{Base, BaseId, Instruction, LoopShape, Opcode, View};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Kernel {
    instrs: Vec<Instruction>,
    inputs: Vec<View>,
    outputs: Vec<View>,
    temps: Vec<Base>,
    // Every access, deduplicated up to alignment.
    reads: Vec<View>,
    writes: Vec<View>,
    // Views behind a `SYNC`; they order every other access to the same data.
    syncs: Vec<View>,
    bases: BTreeSet<BaseId>,
    computed: BTreeSet<BaseId>,
    discarded: BTreeSet<BaseId>,
}

impl Kernel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_instrs(instrs: impl IntoIterator<Item = Instruction>) -> Self {
        let mut kernel = Self::new();
        for instr in instrs {
            kernel.add_instr(instr);
        }
        kernel
    }

    /// Append one instruction and update the derived lists.
    pub fn add_instr(&mut self, instr: Instruction) {
        match instr.opcode() {
            Opcode::None | Opcode::Free => {}
            Opcode::Discard => {
                if let Some(base) = instr.lifecycle_base().cloned() {
                    self.discarded.insert(base.id());
                    self.outputs.retain(|view| *view.base() != base);
                    let read_first = self.inputs.iter().any(|view| *view.base() == base);
                    if self.computed.contains(&base.id()) && !read_first && !self.temps.contains(&base) {
                        self.temps.push(base);
                    }
                }
            }
            _ => {
                for read in instr.reads() {
                    let produced = self.writes.iter().any(|w| w.aligned(read));
                    if !produced && !self.inputs.iter().any(|i| i.aligned(read)) {
                        self.inputs.push(read.clone());
                    }
                }
                if let Some(out) = instr.output() {
                    self.computed.insert(out.base().id());
                    if !self.outputs.iter().any(|o| o.aligned(out)) {
                        self.outputs.push(out.clone());
                    }
                }
            }
        }

        for read in instr.reads() {
            push_unique(&mut self.reads, read.clone());
        }
        for write in instr.writes() {
            push_unique(&mut self.writes, write);
        }
        if instr.opcode() == Opcode::Sync {
            for view in instr.reads() {
                push_unique(&mut self.syncs, view.clone());
            }
        }
        self.bases.extend(instr.bases().map(|b| b.id()));
        self.instrs.push(instr);
    }

    /// Append every instruction of `other`, in order.
    pub fn extend(&mut self, other: &Kernel) {
        for instr in &other.instrs {
            self.add_instr(instr.clone());
        }
    }

    /// Place the instructions of `other` before this kernel's and rebuild.
    pub fn prepend(&mut self, other: &Kernel) {
        let tail = std::mem::take(&mut self.instrs);
        tracing::trace!(prepended = other.len(), kept = tail.len(), "rebuilding kernel lists");
        *self = Self::from_instrs(other.instrs.iter().cloned().chain(tail));
    }

    /// Drop every instruction; the kernel becomes empty.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn instrs(&self) -> &[Instruction] {
        &self.instrs
    }

    pub fn inputs(&self) -> &[View] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[View] {
        &self.outputs
    }

    pub fn temps(&self) -> &[Base] {
        &self.temps
    }

    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    /// Bytes of memory traffic: every unique base among inputs and outputs, once.
    pub fn cost(&self) -> i64 {
        let bases: BTreeMap<BaseId, u64> =
            self.inputs.iter().chain(&self.outputs).map(|v| (v.base().id(), v.base().nbytes())).collect();
        bases.values().sum::<u64>() as i64
    }

    /// Ids of every base accessed by the kernel, freed and discarded ones included.
    pub fn bases(&self) -> impl Iterator<Item = BaseId> + '_ {
        self.bases.iter().copied()
    }

    fn shares_base(&self, other: &Kernel) -> bool {
        let (small, large) =
            if self.bases.len() <= other.bases.len() { (&self.bases, &other.bases) } else { (&other.bases, &self.bases) };
        small.iter().any(|id| large.contains(id))
    }

    /// RAW, WAR or WAW hazard between the two kernels.
    ///
    /// A `SYNC` counts as a write of its view here, so nothing touching the
    /// synced data moves across it.
    pub fn dependency(&self, other: &Kernel) -> bool {
        fn hits(writes: &[View], views: &[View]) -> bool {
            writes.iter().any(|w| views.iter().any(|v| w.overlaps(v)))
        }
        fn barrier(sync: &Kernel, other: &Kernel) -> bool {
            hits(&sync.syncs, &other.reads) || hits(&sync.syncs, &other.writes)
        }
        hits(&self.writes, &other.reads)
            || hits(&self.writes, &other.writes)
            || hits(&other.writes, &self.reads)
            || barrier(self, other)
            || barrier(other, self)
    }

    /// Bytes saved by fusing `self` followed by `other`, or -1 when they share no base.
    pub fn dependency_cost(&self, other: &Kernel) -> i64 {
        if !self.shares_base(other) {
            return -1;
        }
        self.cost() + other.cost() - self.fused_cost(other)
    }

    /// [`Kernel::cost`] of `self` extended by `other`, without building the fused kernel.
    ///
    /// Reads of `other` produced by `self` stop being inputs; outputs of
    /// `self` discarded by `other` stop being outputs.
    fn fused_cost(&self, other: &Kernel) -> i64 {
        let inputs = self.inputs.iter().chain(other.inputs.iter().filter(|r| !self.writes.iter().any(|w| w.aligned(r))));
        let outputs = self.outputs.iter().filter(|o| !other.discarded.contains(&o.base().id())).chain(&other.outputs);

        let bases: BTreeMap<BaseId, u64> = inputs.chain(outputs).map(|v| (v.base().id(), v.base().nbytes())).collect();
        bases.values().sum::<u64>() as i64
    }

    pub fn is_system_only(&self) -> bool {
        self.instrs.iter().all(|i| i.opcode().is_system())
    }

    pub fn has_sync(&self) -> bool {
        self.instrs.iter().any(|i| i.opcode() == Opcode::Sync)
    }

    pub fn has_reduction(&self) -> bool {
        self.instrs.iter().any(|i| i.opcode().is_reduction())
    }

    pub fn loop_shapes(&self) -> impl Iterator<Item = LoopShape> + '_ {
        self.instrs.iter().filter_map(Instruction::loop_shape)
    }
}

fn push_unique(views: &mut Vec<View>, view: View) {
    if !views.iter().any(|v| v.aligned(&view)) {
        views.push(view);
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "kernel cost={}B", self.cost())?;
        for instr in &self.instrs {
            writeln!(f, "  {instr}")?;
        }
        Ok(())
    }
}
