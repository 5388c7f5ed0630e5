use snafu::Snafu;

use crate::{BaseId, Opcode};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// View rank is above [`crate::MAX_DIM`].
    #[snafu(display("view rank {ndim} exceeds the maximum of {max}"))]
    RankTooLarge { ndim: usize, max: usize },

    /// Shape and stride arrays disagree in length.
    #[snafu(display("shape has {shape} dimensions but stride has {stride}"))]
    StrideLengthMismatch { shape: usize, stride: usize },

    /// Negative extent in a shape.
    #[snafu(display("negative extent {extent} in dimension {dim}"))]
    NegativeExtent { dim: usize, extent: i64 },

    /// View addresses elements outside its base.
    #[snafu(display("view addresses elements [{min}, {max}] outside base {base} of {nelem} elements"))]
    ViewOutOfBounds { base: BaseId, min: i64, max: i64, nelem: u64 },

    /// Wrong number of operands for the opcode.
    #[snafu(display("{opcode} expects {expected} operands, got {actual}"))]
    OperandCount { opcode: Opcode, expected: usize, actual: usize },

    /// Output slot holds a constant.
    #[snafu(display("{opcode} requires a view in the output slot"))]
    ConstantOutput { opcode: Opcode },

    /// Opcode needs an inline constant (reduction axis, random seed).
    #[snafu(display("{opcode} requires an inline constant"))]
    MissingConstant { opcode: Opcode },

    /// Reduction axis is not a dimension of the input view.
    #[snafu(display("reduction axis {axis} out of range for rank {ndim}"))]
    InvalidAxis { axis: i64, ndim: usize },
}
