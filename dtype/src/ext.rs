//! Rust scalars usable as kernfuse constants.

use crate::DType;

/// A Rust scalar whose in-memory layout matches one kernfuse element type.
pub trait HasDType: Copy {
    const DTYPE: DType;
}

macro_rules! scalar_dtypes {
    ($($ty:ty: $variant:ident),* $(,)?) => {
        $(
            impl HasDType for $ty {
                const DTYPE: DType = DType::$variant;
            }
            const _: () = assert!(std::mem::size_of::<$ty>() == DType::$variant.bytes());
        )*
    };
}

scalar_dtypes! {
    bool: Bool,
    i8: Int8,
    i16: Int16,
    i32: Int32,
    i64: Int64,
    u8: UInt8,
    u16: UInt16,
    u32: UInt32,
    u64: UInt64,
    f32: Float32,
    f64: Float64,
}
