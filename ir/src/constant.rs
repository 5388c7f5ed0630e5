use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem::discriminant;

use kernfuse_dtype::{DType, HasDType};

/// Scalar payload of a constant operand.
///
/// Floats compare and hash by bit pattern so instructions can be used as map keys.
#[derive(Debug, Clone, Copy)]
pub enum ConstValue {
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl ConstValue {
    /// Integer view of the value, used for reduction axes and seeds.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::Bool(v) => Some(v as i64),
            Self::Int(v) => Some(v),
            Self::UInt(v) => i64::try_from(v).ok(),
            Self::Float(_) => None,
        }
    }
}

impl PartialEq for ConstValue {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::UInt(a), Self::UInt(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }
}

impl Eq for ConstValue {}

impl Hash for ConstValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        discriminant(self).hash(state);
        match *self {
            Self::Bool(v) => v.hash(state),
            Self::Int(v) => v.hash(state),
            Self::UInt(v) => v.hash(state),
            Self::Float(v) => v.to_bits().hash(state),
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
        }
    }
}

macro_rules! impl_from_native {
    ($variant:ident as $storage:ty: $($ty:ty),*) => {
        $(impl From<$ty> for ConstValue {
            fn from(v: $ty) -> Self {
                Self::$variant(v as $storage)
            }
        })*
    };
}

impl_from_native!(Int as i64: i8, i16, i32, i64);
impl_from_native!(UInt as u64: u8, u16, u32, u64);
impl_from_native!(Float as f64: f32, f64);

impl From<bool> for ConstValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

/// Scalar constant operand with its element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Constant {
    pub value: ConstValue,
    pub dtype: DType,
}

impl Constant {
    pub fn new(value: ConstValue, dtype: DType) -> Self {
        Self { value, dtype }
    }

    /// Constant typed after the Rust scalar it is built from.
    pub fn native<T: HasDType + Into<ConstValue>>(value: T) -> Self {
        Self { value: value.into(), dtype: T::DTYPE }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.value, self.dtype)
    }
}
