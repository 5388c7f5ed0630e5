//! Front-end array handles.

use kernfuse_ir::{Base, Constant, Operand, View};

/// Handle to a view held by the front end.
///
/// A temporary handle is consumed by the next instruction that uses it: the
/// runtime releases its base right after that instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Array {
    view: View,
    temporary: bool,
}

impl Array {
    pub fn new(view: View) -> Self {
        Self { view, temporary: false }
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn base(&self) -> &Base {
        self.view.base()
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    /// Mark the handle temporary.
    pub fn temporary(mut self) -> Self {
        self.temporary = true;
        self
    }

    /// Another window onto the same base. The new handle is not temporary.
    pub fn slice(&self, start: i64, shape: &[i64], stride: &[i64]) -> kernfuse_ir::Result<Self> {
        View::new(self.base().clone(), start, shape, stride).map(Self::new)
    }
}

/// Input operand of an enqueued instruction.
#[derive(Debug, Clone, Copy)]
pub enum Input<'a> {
    Array(&'a Array),
    Const(Constant),
}

impl Input<'_> {
    pub(crate) fn operand(&self) -> Operand {
        match self {
            Self::Array(array) => Operand::View(array.view().clone()),
            Self::Const(constant) => Operand::Const(*constant),
        }
    }

    pub(crate) fn array(&self) -> Option<&Array> {
        match self {
            Self::Array(array) => Some(array),
            Self::Const(_) => None,
        }
    }
}

impl<'a> From<&'a Array> for Input<'a> {
    fn from(array: &'a Array) -> Self {
        Self::Array(array)
    }
}

impl From<Constant> for Input<'_> {
    fn from(constant: Constant) -> Self {
        Self::Const(constant)
    }
}
