//! Base arrays: the unit of aliasing and of the free/discard lifecycle.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use kernfuse_dtype::DType;

/// Identifier of a base array. Two bases with different ids never alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BaseId(pub u64);

impl fmt::Display for BaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "b{}", self.0)
    }
}

/// Contiguously allocated buffer of `nelem` elements of one [`DType`].
///
/// Storage itself is owned by the backend; the fusion pass only needs the
/// identity and the byte size of a base.
#[derive(Debug)]
pub struct BaseArray {
    id: BaseId,
    dtype: DType,
    nelem: u64,
}

/// Shared handle to a base array.
pub type Base = Arc<BaseArray>;

impl BaseArray {
    pub fn new(id: BaseId, dtype: DType, nelem: u64) -> Base {
        Arc::new(Self { id, dtype, nelem })
    }

    pub fn id(&self) -> BaseId {
        self.id
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn nelem(&self) -> u64 {
        self.nelem
    }

    /// Size of the buffer in bytes, `nelem × sizeof(dtype)`.
    pub fn nbytes(&self) -> u64 {
        self.nelem * self.dtype.bytes() as u64
    }
}

impl PartialEq for BaseArray {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for BaseArray {}

impl Hash for BaseArray {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PartialOrd for BaseArray {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BaseArray {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}
