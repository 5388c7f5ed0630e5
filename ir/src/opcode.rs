/// Instruction opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::EnumCount, strum::EnumIter, strum::VariantArray, strum::AsRefStr, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Opcode {
    // System.
    None,
    /// Release the storage of the base of operand 0.
    Free,
    /// Drop the metadata of the base of operand 0.
    Discard,
    /// Make operand 0 visible to the host. Acts as a fusion barrier.
    Sync,

    // Elementwise unary: `out ← op(in)`.
    Identity,
    Absolute,
    Negative,
    Sqrt,
    Exp,
    Log,
    Sin,
    Cos,
    LogicalNot,

    // Elementwise binary: `out ← lhs op rhs`.
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Maximum,
    Minimum,
    Equal,
    NotEqual,
    Greater,
    GreaterEqual,
    Less,
    LessEqual,
    LogicalAnd,
    LogicalOr,
    LogicalXor,

    // Reductions over the axis held in the inline constant.
    AddReduce,
    MultiplyReduce,
    MinimumReduce,
    MaximumReduce,

    /// Fill operand 0 with random values; the inline constant is the seed.
    Random,
}

impl Opcode {
    pub fn is_system(&self) -> bool {
        matches!(self, Self::None | Self::Free | Self::Discard | Self::Sync)
    }

    pub fn is_unary(&self) -> bool {
        matches!(
            self,
            Self::Identity
                | Self::Absolute
                | Self::Negative
                | Self::Sqrt
                | Self::Exp
                | Self::Log
                | Self::Sin
                | Self::Cos
                | Self::LogicalNot
        )
    }

    pub fn is_binary(&self) -> bool {
        !self.is_system() && !self.is_unary() && !self.is_reduction() && *self != Self::Random
    }

    pub fn is_reduction(&self) -> bool {
        matches!(self, Self::AddReduce | Self::MultiplyReduce | Self::MinimumReduce | Self::MaximumReduce)
    }

    /// Number of operands, the inline constant excluded.
    pub fn operand_count(&self) -> usize {
        match self {
            Self::None => 0,
            Self::Free | Self::Discard | Self::Sync | Self::Random => 1,
            op if op.is_unary() || op.is_reduction() => 2,
            _ => 3,
        }
    }

    /// Reductions carry their axis, `Random` its seed.
    pub fn requires_constant(&self) -> bool {
        self.is_reduction() || *self == Self::Random
    }
}
