//! The runtime value: queue, fuser and backend with an explicit lifecycle.

use kernfuse_dtype::DType;
use kernfuse_ir::{BaseArray, BaseId, BhIr, Constant, Instruction, Opcode, View};
use kernfuse_schedule::Fuser;
use snafu::{OptionExt, ResultExt, ensure};

use crate::array::{Array, Input};
use crate::component::{Component, ComponentKind};
use crate::config::RuntimeConfig;
use crate::error::*;
use crate::queue::{InstructionQueue, with_releases};
use crate::vem::{FuncId, Vem};

/// Owns the instruction queue and the backend between `init` and `shutdown`.
///
/// Dropping a runtime that was not shut down flushes and shuts the backend
/// down on a best-effort basis.
#[derive(Debug)]
pub struct Runtime {
    bridge: Component,
    backend: Box<dyn Vem>,
    queue: InstructionQueue,
    fuser: Fuser,
    next_base: u64,
    active: bool,
}

impl Runtime {
    /// Validate the component tree and initialise its backend.
    ///
    /// The bridge must have exactly one child, of kind [`ComponentKind::Vem`],
    /// carrying a backend.
    #[tracing::instrument(skip_all, fields(bridge = bridge.name()))]
    pub fn init(mut bridge: Component, config: RuntimeConfig) -> Result<Self> {
        ensure!(
            bridge.children().len() == 1,
            ConfigurationSnafu {
                reason: format!("bridge must have exactly one child of type VEM, found {}", bridge.children().len()),
            }
        );
        let vem = &mut bridge.children_mut()[0];
        ensure!(
            vem.kind() == ComponentKind::Vem,
            ConfigurationSnafu { reason: format!("child '{}' is a {}, not a VEM", vem.name(), vem.kind()) }
        );
        let mut backend = vem
            .take_backend()
            .context(ConfigurationSnafu { reason: format!("VEM '{}' has no backend", vem.name()) })?;

        backend.init(vem).context(BackendInitSnafu { backend: backend.name() })?;
        tracing::debug!(backend = backend.name(), capacity = config.queue_capacity, "runtime initialised");

        Ok(Self {
            bridge,
            backend,
            queue: InstructionQueue::new(config.queue_capacity),
            fuser: Fuser::new(config.fuse),
            next_base: 0,
            active: true,
        })
    }

    pub fn bridge(&self) -> &Component {
        &self.bridge
    }

    pub fn backend(&self) -> &dyn Vem {
        self.backend.as_ref()
    }

    /// Instructions waiting for the next flush.
    pub fn pending(&self) -> &[Instruction] {
        self.queue.as_slice()
    }

    /// Fresh row-major array over a new base.
    pub fn new_array(&mut self, dtype: DType, shape: &[i64]) -> Result<Array> {
        let nelem = shape.iter().map(|&d| d.max(0) as u64).product();
        let base = BaseArray::new(BaseId(self.next_base), dtype, nelem);
        let view = View::row_major(base, shape).context(InstructionSnafu)?;
        self.next_base += 1;
        Ok(Array::new(view))
    }

    /// Append `instr`, releasing the temporary handles among `arrays` after it.
    ///
    /// Flushes first when the instruction and its releases do not fit.
    pub fn enqueue<'a>(&mut self, instr: Instruction, arrays: impl IntoIterator<Item = &'a Array>) -> Result<()> {
        let group = with_releases(instr, arrays);
        if !self.queue.fits(group.len()) {
            tracing::trace!(pending = self.queue.len(), group = group.len(), "queue full");
            self.flush()?;
        }
        self.queue.push(group);
        Ok(())
    }

    pub fn enqueue_unary<'a>(&mut self, opcode: Opcode, out: &'a Array, input: impl Into<Input<'a>>) -> Result<()> {
        let input = input.into();
        let instr = Instruction::unary(opcode, out.view().clone(), input.operand()).context(InstructionSnafu)?;
        self.enqueue(instr, std::iter::once(out).chain(input.array()))
    }

    pub fn enqueue_binary<'a>(
        &mut self,
        opcode: Opcode,
        out: &'a Array,
        lhs: impl Into<Input<'a>>,
        rhs: impl Into<Input<'a>>,
    ) -> Result<()> {
        let (lhs, rhs) = (lhs.into(), rhs.into());
        let instr =
            Instruction::binary(opcode, out.view().clone(), lhs.operand(), rhs.operand()).context(InstructionSnafu)?;
        self.enqueue(instr, std::iter::once(out).chain(lhs.array()).chain(rhs.array()))
    }

    /// Set every element of `out` to `value`.
    pub fn enqueue_fill(&mut self, out: &Array, value: Constant) -> Result<()> {
        self.enqueue_unary(Opcode::Identity, out, value)
    }

    pub fn enqueue_random(&mut self, out: &Array, seed: u64) -> Result<()> {
        let instr = Instruction::random(out.view().clone(), seed).context(InstructionSnafu)?;
        self.enqueue(instr, [out])
    }

    /// Make the contents of `array` available to the host after the next flush.
    pub fn sync(&mut self, array: &Array) -> Result<()> {
        self.enqueue(Instruction::sync(array.view().clone()), [array])
    }

    /// Release the base of `array`.
    pub fn free(&mut self, array: &Array) -> Result<()> {
        let base = array.base().clone();
        let group = [Instruction::free(base.clone()), Instruction::discard(base)];
        if !self.queue.fits(group.len()) {
            self.flush()?;
        }
        self.queue.push(group);
        Ok(())
    }

    /// Fuse the pending batch and hand it to the backend.
    ///
    /// Returns the number of instructions dispatched. The queue is empty
    /// afterwards even when the backend fails.
    #[tracing::instrument(skip_all, fields(pending = self.queue.len()))]
    pub fn flush(&mut self) -> Result<usize> {
        let batch = self.queue.take();
        if batch.is_empty() {
            return Ok(0);
        }
        let count = batch.len();

        let mut bhir = BhIr::new(batch);
        let kernels = self.fuser.fuse(&mut bhir).context(FusionSnafu)?;
        let stream = bhir.flatten();
        tracing::debug!(count, kernels, backend = self.backend.name(), "dispatching batch");

        self.backend
            .execute(&stream)
            .inspect_err(|code| tracing::error!(count, code = code.code(), "error in scheduled batch: {}", code.text()))
            .context(ExecutionSnafu { count })?;
        Ok(count)
    }

    /// Register a user function with the backend.
    pub fn register_function(&mut self, name: &str) -> Result<FuncId> {
        self.backend.reg_func(name).context(RegisterFunctionSnafu { name })
    }

    /// Flush the queue and shut the backend down.
    ///
    /// The backend is shut down even when the final flush fails; the flush
    /// error is reported first.
    pub fn shutdown(mut self) -> Result<()> {
        self.teardown()
    }

    fn teardown(&mut self) -> Result<()> {
        self.active = false;
        let flushed = self.flush();
        let stopped = self.backend.shutdown().context(BackendShutdownSnafu);
        tracing::debug!(backend = self.backend.name(), "runtime shut down");
        flushed.and(stopped)
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        if self.active
            && let Err(error) = self.teardown()
        {
            tracing::warn!(%error, "runtime teardown failed");
        }
    }
}
