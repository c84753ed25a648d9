//! This module collects the error type, the scalar trait and
//! comparison helpers shared by the maxvol algorithms.

use crate::pivoted_lu::HasPivotedLU;
use ndarray::ArrayView2;
use ndarray_linalg::error::LinalgError;
use ndarray_linalg::Norm;
use thiserror::Error;

pub use ndarray_linalg::{c32, c64, Scalar};

#[derive(Error, Debug)]
pub enum MaxvolError {
    #[error("Lapack Error: {0}")]
    LinalgError(#[from] LinalgError),
    #[error("Lapack routine returned with info = {0}")]
    LapackError(i32),
    #[error("Tolerance must satisfy tol >= 1.0, got {0}")]
    InvalidTolerance(f64),
    #[error("Invalid pivot bounds: min_k = {min_k}, max_k = {max_k}, rank = {rank}, eligible rows = {eligible}")]
    InvalidPivotBounds {
        min_k: usize,
        max_k: usize,
        rank: usize,
        eligible: usize,
    },
    #[error("top_k_index = {top_k_index} is smaller than the number of columns {rank}")]
    InvalidTopKIndex { top_k_index: usize, rank: usize },
    #[error("Matrix of shape ({nrows}, {ncols}) has fewer rows than columns")]
    NotTall { nrows: usize, ncols: usize },
    #[error("Matrix has no rows or no columns")]
    EmptyMatrix,
    #[error("Incompatible memory layout")]
    LayoutError,
    #[error("Row index {0} does not fit into a 32-bit signed integer")]
    IndexOverflow(usize),
}

pub type Result<T> = std::result::Result<T, MaxvolError>;

/// Element types supported by the maxvol algorithms.
///
/// Implemented for `f32`, `f64`, `c32` and `c64`.
pub trait MaxvolScalar: HasPivotedLU + RelDiff<A = Self> {}

impl<A: HasPivotedLU + RelDiff<A = A>> MaxvolScalar for A {}

pub trait RelDiff {
    type A: Scalar;

    /// Return the relative Frobenius norm difference of `first` and `second`.
    fn rel_diff_fro(
        first: ArrayView2<Self::A>,
        second: ArrayView2<Self::A>,
    ) -> <<Self as RelDiff>::A as Scalar>::Real;
}

macro_rules! rel_diff_impl {
    ($scalar:ty) => {
        impl RelDiff for $scalar {
            type A = $scalar;
            fn rel_diff_fro(
                first: ArrayView2<Self::A>,
                second: ArrayView2<Self::A>,
            ) -> <<Self as RelDiff>::A as Scalar>::Real {
                // The l2 norm of a two dimensional array is its Frobenius norm.
                let diff = first.to_owned() - &second;
                diff.norm_l2() / second.norm_l2()
            }
        }
    };
}

rel_diff_impl!(f32);
rel_diff_impl!(f64);
rel_diff_impl!(c32);
rel_diff_impl!(c64);
