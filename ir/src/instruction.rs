use std::fmt;

use smallvec::{SmallVec, smallvec};
use snafu::ensure;

use crate::error::*;
use crate::view::Shape;
use crate::{Base, Constant, Opcode, View};

/// Instruction operand: a view over a base or a scalar constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    View(View),
    Const(Constant),
}

impl Operand {
    pub fn as_view(&self) -> Option<&View> {
        match self {
            Self::View(view) => Some(view),
            Self::Const(_) => None,
        }
    }

    pub fn is_const(&self) -> bool {
        matches!(self, Self::Const(_))
    }
}

impl From<View> for Operand {
    fn from(view: View) -> Self {
        Self::View(view)
    }
}

impl From<Constant> for Operand {
    fn from(constant: Constant) -> Self {
        Self::Const(constant)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::View(view) => view.fmt(f),
            Self::Const(constant) => constant.fmt(f),
        }
    }
}

/// Iteration space an instruction runs over, used by the fusibility predicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopShape {
    Elementwise(Shape),
    Reduction { input: Shape, axis: usize },
}

/// Immutable instruction: opcode, up to three operands and an inline constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Instruction {
    opcode: Opcode,
    operands: SmallVec<[Operand; 3]>,
    constant: Option<Constant>,
}

impl Instruction {
    /// Create a validated instruction.
    ///
    /// Operand 0 must be a view, the operand count must match the opcode, and
    /// reductions need an axis that is a dimension of their input view.
    pub fn new(
        opcode: Opcode,
        operands: impl IntoIterator<Item = Operand>,
        constant: Option<Constant>,
    ) -> Result<Self> {
        let operands: SmallVec<[Operand; 3]> = operands.into_iter().collect();
        let expected = opcode.operand_count();
        ensure!(operands.len() == expected, OperandCountSnafu { opcode, expected, actual: operands.len() });
        ensure!(operands.first().is_none_or(|op| !op.is_const()), ConstantOutputSnafu { opcode });
        ensure!(!opcode.requires_constant() || constant.is_some(), MissingConstantSnafu { opcode });

        if opcode.is_reduction()
            && let Some(constant) = constant
        {
            let ndim = operands[1].as_view().map_or(0, View::ndim);
            let axis = constant.value.as_i64().unwrap_or(-1);
            ensure!(axis >= 0 && (axis as usize) < ndim, InvalidAxisSnafu { axis, ndim });
        }

        Ok(Self { opcode, operands, constant })
    }

    pub fn unary(opcode: Opcode, out: View, input: impl Into<Operand>) -> Result<Self> {
        Self::new(opcode, [out.into(), input.into()], None)
    }

    pub fn binary(opcode: Opcode, out: View, lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> Result<Self> {
        Self::new(opcode, [out.into(), lhs.into(), rhs.into()], None)
    }

    pub fn reduce(opcode: Opcode, out: View, input: View, axis: usize) -> Result<Self> {
        Self::new(opcode, [out.into(), input.into()], Some(Constant::native(axis as i64)))
    }

    pub fn random(out: View, seed: u64) -> Result<Self> {
        Self::new(Opcode::Random, [out.into()], Some(Constant::native(seed)))
    }

    pub fn free(base: Base) -> Self {
        Self::system(Opcode::Free, View::contiguous(base))
    }

    pub fn discard(base: Base) -> Self {
        Self::system(Opcode::Discard, View::contiguous(base))
    }

    pub fn sync(view: View) -> Self {
        Self::system(Opcode::Sync, view)
    }

    fn system(opcode: Opcode, view: View) -> Self {
        Self { opcode, operands: smallvec![Operand::View(view)], constant: None }
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    pub fn constant(&self) -> Option<&Constant> {
        self.constant.as_ref()
    }

    /// View written by a compute instruction.
    pub fn output(&self) -> Option<&View> {
        if self.opcode.is_system() {
            return None;
        }
        self.operands.first().and_then(Operand::as_view)
    }

    /// Views read by the instruction. `Sync` reads its operand.
    pub fn reads(&self) -> impl Iterator<Item = &View> {
        let skip = match self.opcode {
            Opcode::Sync => 0,
            op if op.is_system() => self.operands.len(),
            _ => 1,
        };
        self.operands.iter().skip(skip).filter_map(Operand::as_view)
    }

    /// Views written by the instruction. `Free` and `Discard` write their whole base.
    pub fn writes(&self) -> SmallVec<[View; 1]> {
        match self.opcode {
            Opcode::Free | Opcode::Discard => {
                self.operands.iter().filter_map(Operand::as_view).map(|v| View::contiguous(v.base().clone())).collect()
            }
            Opcode::Sync | Opcode::None => SmallVec::new(),
            _ => self.output().cloned().into_iter().collect(),
        }
    }

    /// Bases touched by any view operand.
    pub fn bases(&self) -> impl Iterator<Item = &Base> {
        self.operands.iter().filter_map(Operand::as_view).map(View::base)
    }

    /// Base released or discarded by a `Free`/`Discard`.
    pub fn lifecycle_base(&self) -> Option<&Base> {
        match self.opcode {
            Opcode::Free | Opcode::Discard => self.operands.first().and_then(Operand::as_view).map(View::base),
            _ => None,
        }
    }

    pub fn loop_shape(&self) -> Option<LoopShape> {
        if self.opcode.is_system() {
            return None;
        }
        if self.opcode.is_reduction() {
            let input = self.operands.get(1)?.as_view()?;
            let axis = self.constant?.value.as_i64()? as usize;
            return Some(LoopShape::Reduction { input: input.shape().into(), axis });
        }
        self.output().map(|out| LoopShape::Elementwise(out.shape().into()))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        for operand in &self.operands {
            write!(f, " {operand}")?;
        }
        if let Some(constant) = &self.constant {
            write!(f, " ({constant})")?;
        }
        Ok(())
    }
}
