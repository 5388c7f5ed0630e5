//! Strided windows over base arrays.

use std::collections::HashSet;
use std::fmt;

use smallvec::{SmallVec, smallvec};
use snafu::ensure;

use crate::error::*;
use crate::{Base, BaseArray};

/// Maximum rank of a view.
pub const MAX_DIM: usize = 16;

/// Views addressing more elements than this are compared by offset range only.
const EXACT_OVERLAP_LIMIT: i64 = 4096;

pub type Shape = SmallVec<[i64; 4]>;

/// Logical slice over a base: `start` offset plus `shape`/`stride` in elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct View {
    base: Base,
    start: i64,
    shape: Shape,
    stride: Shape,
}

impl View {
    /// Create a validated view.
    ///
    /// Every addressed element must lie inside `[0, base.nelem)`.
    pub fn new(base: Base, start: i64, shape: &[i64], stride: &[i64]) -> Result<Self> {
        ensure!(shape.len() <= MAX_DIM, RankTooLargeSnafu { ndim: shape.len(), max: MAX_DIM });
        ensure!(shape.len() == stride.len(), StrideLengthMismatchSnafu { shape: shape.len(), stride: stride.len() });
        if let Some((dim, &extent)) = shape.iter().enumerate().find(|(_, e)| **e < 0) {
            return NegativeExtentSnafu { dim, extent }.fail();
        }

        let view = Self { base, start, shape: shape.into(), stride: stride.into() };
        if let Some((min, max)) = view.offset_range() {
            let nelem = view.base.nelem();
            ensure!(min >= 0 && (max as u64) < nelem, ViewOutOfBoundsSnafu { base: view.base.id(), min, max, nelem });
        }
        Ok(view)
    }

    /// Whole base as a one-dimensional view.
    pub fn contiguous(base: Base) -> Self {
        let nelem = base.nelem() as i64;
        Self { base, start: 0, shape: smallvec![nelem], stride: smallvec![1] }
    }

    /// Row-major view of the whole base reshaped to `shape`.
    pub fn row_major(base: Base, shape: &[i64]) -> Result<Self> {
        let mut stride: Shape = SmallVec::from_elem(0, shape.len());
        let mut acc = 1;
        for (dim, &extent) in shape.iter().enumerate().rev() {
            stride[dim] = acc;
            acc *= extent.max(1);
        }
        Self::new(base, 0, shape, &stride)
    }

    pub fn base(&self) -> &Base {
        &self.base
    }

    pub fn base_array(&self) -> &BaseArray {
        &self.base
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn shape(&self) -> &[i64] {
        &self.shape
    }

    pub fn stride(&self) -> &[i64] {
        &self.stride
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of addressed elements (1 for rank 0).
    pub fn nelem(&self) -> i64 {
        self.shape.iter().product()
    }

    /// Smallest and largest addressed offset, `None` for an empty view.
    pub fn offset_range(&self) -> Option<(i64, i64)> {
        if self.shape.contains(&0) {
            return None;
        }
        let (mut min, mut max) = (self.start, self.start);
        for (&extent, &stride) in self.shape.iter().zip(&self.stride) {
            let span = (extent - 1) * stride;
            if span < 0 {
                min += span;
            } else {
                max += span;
            }
        }
        Some((min, max))
    }

    /// True when the view addresses every element of `[min, max]` exactly once,
    /// i.e. it is row-major contiguous up to unit dimensions.
    pub fn is_dense(&self) -> bool {
        let mut expected = 1;
        for (&extent, &stride) in self.shape.iter().zip(&self.stride).rev() {
            if extent == 1 {
                continue;
            }
            if stride != expected {
                return false;
            }
            expected *= extent;
        }
        true
    }

    /// All addressed offsets in row-major iteration order.
    pub fn offsets(&self) -> Vec<i64> {
        if self.shape.contains(&0) {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(self.nelem() as usize);
        let mut index: Shape = SmallVec::from_elem(0, self.ndim());
        loop {
            out.push(self.start + index.iter().zip(&self.stride).map(|(i, s)| i * s).sum::<i64>());

            let mut dim = self.ndim();
            loop {
                if dim == 0 {
                    return out;
                }
                dim -= 1;
                index[dim] += 1;
                if index[dim] < self.shape[dim] {
                    break;
                }
                index[dim] = 0;
            }
        }
    }

    /// True iff both views share a base and their index sets intersect.
    ///
    /// Exact for dense views and for views of at most 4096 elements; larger
    /// strided views that share an offset range are conservatively reported as
    /// overlapping.
    pub fn overlaps(&self, other: &View) -> bool {
        if self.base != other.base {
            return false;
        }
        let (Some((a0, a1)), Some((b0, b1))) = (self.offset_range(), other.offset_range()) else {
            return false;
        };
        if a1 < b0 || b1 < a0 {
            return false;
        }
        if self.is_dense() && other.is_dense() {
            return true;
        }
        if self.nelem() <= EXACT_OVERLAP_LIMIT && other.nelem() <= EXACT_OVERLAP_LIMIT {
            let mine: HashSet<i64> = self.offsets().into_iter().collect();
            return other.offsets().iter().any(|o| mine.contains(o));
        }
        true
    }

    /// Same base, start, shape and stride.
    pub fn aligned(&self, other: &View) -> bool {
        self == other
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[start={}, shape={:?}, stride={:?}]", self.base.id(), self.start, self.shape, self.stride)
    }
}

/// Right-aligned broadcast check: every dimension pair is equal or one side is 1.
pub fn broadcastable(a: &[i64], b: &[i64]) -> bool {
    a.iter().rev().zip(b.iter().rev()).all(|(&x, &y)| x == y || x == 1 || y == 1)
}
