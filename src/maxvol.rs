//! Square maximal volume submatrix search.
//!
//! Given a tall matrix $A\in\mathbb{C}^{N\times r}$ with full column rank, `maxvol` looks
//! for $r$ rows of $A$ whose $r\times r$ submatrix $A_{\text{piv}}$ has a locally maximal
//! determinant in modulus. The search starts from the rows chosen by an LU decomposition
//! with partial pivoting and maintains the coefficients $C = AA_{\text{piv}}^{-1}$. As long as
//! some entry satisfies $|c_{ij}| > \text{tol}$, row $i$ replaces the $j$th pivot, which
//! multiplies $|\det A_{\text{piv}}|$ by $|c_{ij}|$. After the swap $C$ is updated by the
//! rank one correction
//! $$
//! C \leftarrow C - \frac{1}{c_{ij}}C_{:,j}\left(C_{i,:} - e_j^T\right).
//! $$
//! On exit all entries of $C$ are bounded by `tol` in modulus, unless the iteration
//! budget was exhausted first.

use crate::pivot_set::PivotSet;
use crate::pivoted_lu::PivotedLU;
use crate::skeleton::{real_to_f64, Advisory, Skeleton};
use crate::types::{MaxvolError, MaxvolScalar, Result, Scalar};
use ndarray::{s, Array1, Array2, ArrayBase, ArrayView2, Data, Ix2};
use num::traits::Float;

/// Parameters of the square maxvol search.
#[derive(Clone, Debug, PartialEq)]
pub struct MaxvolOptions {
    /// Upper bound for the modulus of the coefficients. Must be at least 1.
    pub tol: f64,
    /// Maximum number of row swaps.
    pub max_iters: usize,
    /// If set, only the rows `0..top_k_index` may become pivots.
    pub top_k_index: Option<usize>,
}

impl Default for MaxvolOptions {
    fn default() -> Self {
        MaxvolOptions {
            tol: 1.05,
            max_iters: 100,
            top_k_index: None,
        }
    }
}

impl MaxvolOptions {
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_max_iters(mut self, max_iters: usize) -> Self {
        self.max_iters = max_iters;
        self
    }

    pub fn with_top_k_index(mut self, top_k_index: usize) -> Self {
        self.top_k_index = Some(top_k_index);
        self
    }
}

pub trait Maxvol {
    type A: MaxvolScalar;

    /// Compute a square maxvol skeleton of `self`.
    fn maxvol(&self, options: &MaxvolOptions) -> Result<Skeleton<Self::A>>;
}

impl<A, S> Maxvol for ArrayBase<S, Ix2>
where
    A: MaxvolScalar,
    S: Data<Elem = A>,
{
    type A = A;

    fn maxvol(&self, options: &MaxvolOptions) -> Result<Skeleton<A>> {
        maxvol(self.view(), options)
    }
}

/// Compute a square maxvol skeleton of `mat`.
///
/// Returns $r$ pivots and the $N\times r$ coefficient matrix. The rows of the coefficient
/// matrix at the pivots are exactly the identity.
///
/// # Arguments
///
/// * `mat`: A tall $N\times r$ matrix.
/// * `options`: Tolerance, iteration budget and pivot eligibility.
pub fn maxvol<A: MaxvolScalar>(mat: ArrayView2<A>, options: &MaxvolOptions) -> Result<Skeleton<A>> {
    let (nrows, ncols) = check_shape(mat)?;
    check_tolerance(options.tol)?;
    let top_k = eligible_rows(options.top_k_index, nrows, ncols)?;

    if nrows == ncols {
        return Ok(identity_skeleton(nrows));
    }

    let mut advisories = Vec::new();

    let mut lu = mat.slice(s![0..top_k, ..]).pivoted_lu()?;
    if let Some(rank) = lu.regularize() {
        log::warn!(
            "maxvol: input of shape ({}, {}) is numerically rank deficient (rank {})",
            nrows,
            ncols,
            rank
        );
        advisories.push(Advisory::RankDeficient { rank });
    }

    let mut c = lu.coefficients(&mat)?;
    let mut pivots = PivotSet::from_rows(nrows, ncols, lu.pivots());
    set_identity_rows(&mut c, &pivots);

    // State before the last swap.
    let mut previous = c.clone();

    let tol = A::real(options.tol);
    let mut iters = 0;

    loop {
        let (row, col, max_abs) = match argmax_abs(c.slice(s![0..top_k, ..]), &pivots) {
            Some(best) => best,
            None => {
                log::debug!("maxvol: all eligible rows are pivots");
                break;
            }
        };

        if !max_abs.is_finite() {
            log::warn!("maxvol: non-finite coefficient after {} swaps", iters);
            record_rank_deficiency(&mut advisories, ncols);
            break;
        }

        if max_abs <= tol {
            log::debug!(
                "maxvol: converged after {} swaps, max |c| = {:e}",
                iters,
                real_to_f64(max_abs)
            );
            break;
        }

        if iters == options.max_iters {
            log::warn!(
                "maxvol: iteration budget of {} swaps exhausted, max |c| = {:e} > tol = {}",
                options.max_iters,
                real_to_f64(max_abs),
                options.tol
            );
            advisories.push(Advisory::IterationBudgetExhausted {
                iters,
                max_abs: real_to_f64(max_abs),
            });
            break;
        }

        previous.assign(&c);
        swap_update(&mut c, row, col);

        if !is_finite(&c) {
            log::warn!(
                "maxvol: swapping in row {} overflows, keeping the pivots after {} swaps",
                row,
                iters
            );
            std::mem::swap(&mut c, &mut previous);
            record_rank_deficiency(&mut advisories, ncols);
            break;
        }

        let old = pivots.replace(col, row);
        log::trace!("maxvol: row {} replaces row {} at position {}", row, old, col);

        iters += 1;
    }

    Ok(Skeleton {
        piv: pivots.into_array(),
        c,
        advisories,
    })
}

/// Shorthand for [`maxvol`] with default options and tolerance `tol`.
pub fn maxvol_with_tol<A: MaxvolScalar>(mat: ArrayView2<A>, tol: f64) -> Result<Skeleton<A>> {
    maxvol(mat, &MaxvolOptions::default().with_tol(tol))
}

/// Replace the pivot at position `col` by `row` and update the coefficients in place.
fn swap_update<A: Scalar>(c: &mut Array2<A>, row: usize, col: usize) {
    let pivot = c[[row, col]];

    let mut direction: Array1<A> = c.row(row).to_owned();
    direction[col] -= A::one();
    direction.mapv_inplace(|item| item / pivot);

    for mut c_row in c.rows_mut() {
        let factor = c_row[col];
        if factor != A::zero() {
            c_row.scaled_add(-factor, &direction);
        }
    }

    // The new pivot row is e_col by construction; remove the rounding error.
    let mut new_row = c.row_mut(row);
    new_row.fill(A::zero());
    new_row[col] = A::one();
}

/// Position and modulus of the entry with largest modulus outside of the pivot rows.
///
/// Ties are resolved by the first occurrence in row-major order. Not-a-number entries are
/// skipped unless all candidate entries are NaN. Returns `None` if every row is a pivot.
pub(crate) fn argmax_abs<A: Scalar>(mat: ArrayView2<A>, pivots: &PivotSet) -> Option<(usize, usize, A::Real)> {
    let mut best: Option<(usize, usize, A::Real)> = None;

    for (i, row) in mat.outer_iter().enumerate() {
        if pivots.contains(i) {
            continue;
        }
        for (j, item) in row.iter().enumerate() {
            let modulus = item.abs();
            match best {
                Some((_, _, value)) if modulus.is_nan() || !(modulus > value || value.is_nan()) => (),
                _ => best = Some((i, j, modulus)),
            }
        }
    }

    best
}

/// Set the rows of `c` at the pivots to the corresponding unit vectors.
pub(crate) fn set_identity_rows<A: Scalar>(c: &mut Array2<A>, pivots: &PivotSet) {
    for (pos, &row) in pivots.iter().enumerate() {
        let mut c_row = c.row_mut(row);
        c_row.fill(A::zero());
        c_row[pos] = A::one();
    }
}

fn is_finite<A: Scalar>(c: &Array2<A>) -> bool {
    c.iter().all(|item| item.abs().is_finite())
}

fn record_rank_deficiency(advisories: &mut Vec<Advisory>, rank: usize) {
    if !advisories
        .iter()
        .any(|advisory| matches!(advisory, Advisory::RankDeficient { .. }))
    {
        advisories.push(Advisory::RankDeficient { rank });
    }
}

pub(crate) fn check_shape<A>(mat: ArrayView2<A>) -> Result<(usize, usize)> {
    let (nrows, ncols) = mat.dim();

    if nrows == 0 || ncols == 0 {
        return Err(MaxvolError::EmptyMatrix);
    }
    if nrows < ncols {
        return Err(MaxvolError::NotTall { nrows, ncols });
    }

    Ok((nrows, ncols))
}

pub(crate) fn check_tolerance(tol: f64) -> Result<()> {
    // Also rejects NaN.
    if tol >= 1.0 {
        Ok(())
    } else {
        Err(MaxvolError::InvalidTolerance(tol))
    }
}

/// Resolve the number of rows that may become pivots.
pub(crate) fn eligible_rows(top_k_index: Option<usize>, nrows: usize, ncols: usize) -> Result<usize> {
    match top_k_index {
        None => Ok(nrows),
        Some(top_k) if top_k < ncols => Err(MaxvolError::InvalidTopKIndex {
            top_k_index: top_k,
            rank: ncols,
        }),
        Some(top_k) => {
            if top_k > nrows {
                log::debug!("top_k_index = {} clamped to {} rows", top_k, nrows);
            }
            Ok(top_k.min(nrows))
        }
    }
}

/// All rows are pivots and the coefficients are the identity.
pub(crate) fn identity_skeleton<A: Scalar>(n: usize) -> Skeleton<A> {
    Skeleton {
        piv: Array1::from((0..n).collect::<Vec<_>>()),
        c: Array2::eye(n),
        advisories: Vec::new(),
    }
}
