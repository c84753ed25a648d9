//! The result of a maxvol pivot search.
//!
//! A [`Skeleton`] of a matrix $A\in\mathbb{C}^{N\times r}$ consists of $K$ pivot rows
//! `piv` and a coefficient matrix $C\in\mathbb{C}^{N\times K}$ such that
//! $A\approx C A_{\text{piv}}$, where $A_{\text{piv}}$ denotes the rows of $A$ selected
//! by `piv`. The pivots are stored in the order in which they were selected.

use crate::types::{MaxvolError, MaxvolScalar, RelDiff, Result, Scalar};
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix2};
use num::traits::{Float, ToPrimitive, Zero};
use std::convert::TryFrom;

/// Non-fatal conditions met during a pivot search.
///
/// The returned skeleton is still usable, but the norm bound requested
/// from the algorithm may not hold.
#[derive(Clone, Debug, PartialEq)]
pub enum Advisory {
    /// The initial factorization found only `rank` numerically nonzero pivots, or a swap
    /// would have produced non-finite coefficients. In the latter case the pivots and
    /// coefficients before that swap are returned. Coefficients can only be non-finite if
    /// already the seed overflowed.
    RankDeficient { rank: usize },
    /// The swap iteration stopped after `iters` swaps with `max_abs` still above the tolerance.
    IterationBudgetExhausted { iters: usize, max_abs: f64 },
    /// `max_k` rows were selected while the largest row norm `max_row_norm` of the
    /// coefficients was still above the tolerance.
    MaxPivotsReached { max_k: usize, max_row_norm: f64 },
}

#[derive(Clone, Debug)]
pub struct Skeleton<A: Scalar> {
    /// The selected rows, in selection order
    pub piv: Array1<usize>,
    /// The coefficient matrix with one column per pivot
    pub c: Array2<A>,
    /// Advisories raised during the computation
    pub advisories: Vec<Advisory>,
}

impl<A: MaxvolScalar> Skeleton<A> {
    /// Number of rows of the approximated matrix
    pub fn nrows(&self) -> usize {
        self.c.nrows()
    }

    /// Number of pivots
    pub fn rank(&self) -> usize {
        self.piv.len()
    }

    /// Return the pivots as 32-bit signed integers.
    pub fn pivots_i32(&self) -> Result<Array1<i32>> {
        let mut out = Array1::<i32>::zeros(self.piv.len());
        for (item, &row) in out.iter_mut().zip(self.piv.iter()) {
            *item = i32::try_from(row).map_err(|_| MaxvolError::IndexOverflow(row))?;
        }
        Ok(out)
    }

    /// Return the rows of `mat` selected by the pivots.
    pub fn pivot_rows<S: Data<Elem = A>>(&self, mat: &ArrayBase<S, Ix2>) -> Array2<A> {
        mat.select(Axis(0), &self.piv.to_vec())
    }

    /// Multiply out $C A_{\text{piv}}$.
    pub fn to_mat<S: Data<Elem = A>>(&self, mat: &ArrayBase<S, Ix2>) -> Array2<A> {
        self.c.dot(&self.pivot_rows(mat))
    }

    /// Relative Frobenius norm error of $C A_{\text{piv}}$ against `mat`.
    pub fn rel_error<S: Data<Elem = A>>(&self, mat: &ArrayBase<S, Ix2>) -> A::Real {
        A::rel_diff_fro(self.to_mat(mat).view(), mat.view())
    }

    /// Largest modulus of an entry of C.
    pub fn max_abs_coefficient(&self) -> A::Real {
        self.c
            .iter()
            .map(|item| item.abs())
            .fold(<A::Real as Zero>::zero(), |acc, item| if item > acc { item } else { acc })
    }

    /// Largest Euclidean norm of a row of C.
    pub fn max_row_norm(&self) -> A::Real {
        let max_sqr = self
            .c
            .rows()
            .into_iter()
            .map(|row| row_norm_sqr(row.iter()))
            .fold(<A::Real as Zero>::zero(), |acc, item| if item > acc { item } else { acc });
        Float::sqrt(max_sqr)
    }

    /// True if no budget was exhausted before the tolerance was met.
    pub fn is_converged(&self) -> bool {
        !self.advisories.iter().any(|advisory| {
            matches!(
                advisory,
                Advisory::IterationBudgetExhausted { .. } | Advisory::MaxPivotsReached { .. }
            )
        })
    }

    /// True if the initial factorization detected a numerically rank deficient input.
    pub fn is_rank_deficient(&self) -> bool {
        self.advisories
            .iter()
            .any(|advisory| matches!(advisory, Advisory::RankDeficient { .. }))
    }
}

/// Squared Euclidean norm of a sequence of scalars.
pub(crate) fn row_norm_sqr<'a, A: Scalar, I: Iterator<Item = &'a A>>(row: I) -> A::Real {
    row.fold(<A::Real as Zero>::zero(), |acc, item| acc + item.square())
}

/// Convert a real scalar for reporting.
pub(crate) fn real_to_f64<R: ToPrimitive>(value: R) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {

    use super::*;
    use ndarray::array;

    fn identity_skeleton() -> Skeleton<f64> {
        Skeleton {
            piv: array![2, 0],
            c: array![[0.0, 1.0], [0.5, 0.5], [1.0, 0.0]],
            advisories: Vec::new(),
        }
    }

    #[test]
    fn test_to_mat() {
        let mat = array![[1.0, 2.0], [2.0, 3.0], [3.0, 4.0]];
        let skeleton = identity_skeleton();

        assert_eq!(skeleton.nrows(), 3);
        assert_eq!(skeleton.rank(), 2);
        assert_eq!(skeleton.pivot_rows(&mat), array![[3.0, 4.0], [1.0, 2.0]]);
        assert!(skeleton.rel_error(&mat) < 1E-15);
    }

    #[test]
    fn test_norms() {
        let skeleton = identity_skeleton();

        assert_eq!(skeleton.max_abs_coefficient(), 1.0);
        assert_eq!(skeleton.max_row_norm(), 1.0);
    }

    #[test]
    fn test_pivots_i32() {
        let skeleton = identity_skeleton();
        assert_eq!(skeleton.pivots_i32().unwrap(), array![2_i32, 0]);

        let large = Skeleton::<f64> {
            piv: array![usize::MAX],
            c: Array2::zeros((1, 1)),
            advisories: Vec::new(),
        };
        assert!(matches!(large.pivots_i32(), Err(MaxvolError::IndexOverflow(_))));
    }

    #[test]
    fn test_convergence_flags() {
        let mut skeleton = identity_skeleton();
        assert!(skeleton.is_converged());
        assert!(!skeleton.is_rank_deficient());

        skeleton.advisories.push(Advisory::RankDeficient { rank: 1 });
        assert!(skeleton.is_converged());
        assert!(skeleton.is_rank_deficient());

        skeleton.advisories.push(Advisory::MaxPivotsReached {
            max_k: 2,
            max_row_norm: 1.5,
        });
        assert!(!skeleton.is_converged());
    }
}
