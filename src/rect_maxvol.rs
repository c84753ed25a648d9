//! Rectangular maximal volume submatrix search.
//!
//! `rect_maxvol` selects $K\geq r$ rows of a tall matrix $A\in\mathbb{C}^{N\times r}$ such that
//! the 2-volume $\sqrt{\det(A_{\text{piv}}^HA_{\text{piv}})}$ of the selected rows is large. It
//! starts from the $r$ rows found by [`maxvol`](crate::maxvol::maxvol) and keeps the
//! least-squares coefficients $C = AA_{\text{piv}}^{\dagger}$. Adding row $i$ to the pivots
//! multiplies the squared 2-volume by $1 + \|C_{i,:}\|^2$, so the row with the largest
//! coefficient norm is added next. With $c = C_{i,:}$, $v = C\bar{c}$ and
//! $\ell = 1/(1 + v_i)$ the coefficients are updated by
//! $$
//! C \leftarrow \left[\,C - \ell\, v c^T \;\big|\; \ell v\,\right],
//! $$
//! and the squared row norms by $\|C_{k,:}\|^2 \leftarrow \|C_{k,:}\|^2 - \ell |v_k|^2$.
//! Rows are added until all row norms are bounded by `tol`.

use crate::maxvol::{
    check_shape, check_tolerance, eligible_rows, identity_skeleton, maxvol, set_identity_rows, MaxvolOptions,
};
use crate::pivot_set::PivotSet;
use crate::skeleton::{real_to_f64, row_norm_sqr, Advisory, Skeleton};
use crate::types::{MaxvolError, MaxvolScalar, Result, Scalar};
use ndarray::{s, Array1, Array2, ArrayBase, ArrayView2, Axis, Data, Ix2};
use num::traits::{Float, Zero};

/// Parameters of the rectangular maxvol search.
#[derive(Clone, Debug, PartialEq)]
pub struct RectMaxvolOptions {
    /// Upper bound for the Euclidean norm of each row of the coefficients. Must be at least 1.
    pub tol: f64,
    /// Maximum number of pivots. Defaults to the number of eligible rows.
    pub max_k: Option<usize>,
    /// Minimum number of pivots to add on top of the square maxvol pivots.
    pub min_add_k: Option<usize>,
    /// Minimum number of pivots. Defaults to the number of columns.
    pub min_k: Option<usize>,
    /// Number of swaps allowed in the square maxvol search that seeds the pivots.
    pub start_maxvol_iters: usize,
    /// If true, the rows of the coefficients at the pivots are set to the identity.
    pub identity_submatrix: bool,
    /// If set, only the rows `0..top_k_index` may become pivots.
    pub top_k_index: Option<usize>,
}

impl Default for RectMaxvolOptions {
    fn default() -> Self {
        RectMaxvolOptions {
            tol: 1.0,
            max_k: None,
            min_add_k: None,
            min_k: None,
            start_maxvol_iters: 10,
            identity_submatrix: true,
            top_k_index: None,
        }
    }
}

impl RectMaxvolOptions {
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    pub fn with_max_k(mut self, max_k: usize) -> Self {
        self.max_k = Some(max_k);
        self
    }

    pub fn with_min_add_k(mut self, min_add_k: usize) -> Self {
        self.min_add_k = Some(min_add_k);
        self
    }

    pub fn with_min_k(mut self, min_k: usize) -> Self {
        self.min_k = Some(min_k);
        self
    }

    pub fn with_start_maxvol_iters(mut self, start_maxvol_iters: usize) -> Self {
        self.start_maxvol_iters = start_maxvol_iters;
        self
    }

    pub fn with_identity_submatrix(mut self, identity_submatrix: bool) -> Self {
        self.identity_submatrix = identity_submatrix;
        self
    }

    pub fn with_top_k_index(mut self, top_k_index: usize) -> Self {
        self.top_k_index = Some(top_k_index);
        self
    }
}

pub trait RectMaxvol {
    type A: MaxvolScalar;

    /// Compute a rectangular maxvol skeleton of `self`.
    fn rect_maxvol(&self, options: &RectMaxvolOptions) -> Result<Skeleton<Self::A>>;
}

impl<A, S> RectMaxvol for ArrayBase<S, Ix2>
where
    A: MaxvolScalar,
    S: Data<Elem = A>,
{
    type A = A;

    fn rect_maxvol(&self, options: &RectMaxvolOptions) -> Result<Skeleton<A>> {
        rect_maxvol(self.view(), options)
    }
}

/// Effective pivot count bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct PivotBounds {
    pub min_k: usize,
    pub max_k: usize,
    pub top_k: usize,
}

/// Resolve the defaults of the pivot count bounds and validate them.
pub(crate) fn pivot_bounds(options: &RectMaxvolOptions, nrows: usize, ncols: usize) -> Result<PivotBounds> {
    let top_k = eligible_rows(options.top_k_index, nrows, ncols)?;

    let max_k = options.max_k.unwrap_or(top_k);
    let mut min_k = options.min_k.unwrap_or(ncols);
    if let Some(min_add_k) = options.min_add_k {
        min_k = min_k.max(ncols.saturating_add(min_add_k));
    }

    if min_k < ncols || min_k > max_k || max_k > nrows || max_k > top_k {
        return Err(MaxvolError::InvalidPivotBounds {
            min_k,
            max_k,
            rank: ncols,
            eligible: top_k,
        });
    }

    Ok(PivotBounds { min_k, max_k, top_k })
}

/// Compute a rectangular maxvol skeleton of `mat`.
///
/// Returns $K$ pivots with `min_k <= K <= max_k` and the $N\times K$ coefficient matrix.
///
/// # Arguments
///
/// * `mat`: A tall $N\times r$ matrix.
/// * `options`: Tolerance, pivot count bounds and pivot eligibility.
pub fn rect_maxvol<A: MaxvolScalar>(
    mat: ArrayView2<A>,
    options: &RectMaxvolOptions,
) -> Result<Skeleton<A>> {
    let (nrows, ncols) = check_shape(mat)?;
    check_tolerance(options.tol)?;
    let bounds = pivot_bounds(options, nrows, ncols)?;

    if nrows == ncols {
        return Ok(identity_skeleton(nrows));
    }

    // The seed only needs to be a good starting point, so its iteration budget
    // advisory is dropped.
    let seed_options = MaxvolOptions {
        tol: 1.0,
        max_iters: options.start_maxvol_iters,
        top_k_index: Some(bounds.top_k),
    };
    let seed = maxvol(mat, &seed_options)?;
    let mut advisories: Vec<Advisory> = seed
        .advisories
        .into_iter()
        .filter(|advisory| matches!(advisory, Advisory::RankDeficient { .. }))
        .collect();

    let mut pivots = PivotSet::from_rows(nrows, bounds.max_k, seed.piv.iter().copied());

    // Preallocate all columns so that adding a pivot does not reallocate.
    let mut c = Array2::<A>::zeros((nrows, bounds.max_k));
    c.slice_mut(s![.., 0..ncols]).assign(&seed.c);

    let mut norms = Array1::<A::Real>::zeros(bounds.top_k);
    for (row, norm) in norms.iter_mut().enumerate() {
        if !pivots.contains(row) {
            *norm = row_norm_sqr(c.slice(s![row, 0..ncols]).iter());
        }
    }

    let tol_sqr = A::real(options.tol * options.tol);
    let mut k = ncols;
    let mut next = argmax_candidate(&norms, &pivots);

    while let Some((row, norm)) = next {
        if pivots.len() == pivots.capacity() || (k >= bounds.min_k && norm <= tol_sqr) {
            break;
        }

        add_pivot(&mut c, &mut norms, k, row);
        pivots.push(row);
        for pivot in pivots.iter().copied().filter(|&pivot| pivot < bounds.top_k) {
            norms[pivot] = <A::Real as Zero>::zero();
        }
        k += 1;

        log::trace!(
            "rect_maxvol: added row {} with squared norm {:e}",
            row,
            real_to_f64(norm)
        );

        next = argmax_candidate(&norms, &pivots);
    }

    let max_norm_sqr = next.map_or(<A::Real as Zero>::zero(), |(_, norm)| norm);
    if max_norm_sqr > tol_sqr {
        let max_row_norm = real_to_f64(Float::sqrt(max_norm_sqr));
        log::warn!(
            "rect_maxvol: reached max_k = {} pivots with row norm {:e} > tol = {}",
            bounds.max_k,
            max_row_norm,
            options.tol
        );
        advisories.push(Advisory::MaxPivotsReached {
            max_k: bounds.max_k,
            max_row_norm,
        });
    } else {
        log::debug!("rect_maxvol: converged with {} pivots", k);
    }

    let mut c = c.slice_move(s![.., 0..k]);

    if options.identity_submatrix {
        set_identity_rows(&mut c, &pivots);
    }

    Ok(Skeleton {
        piv: pivots.into_array(),
        c,
        advisories,
    })
}

/// Shorthand for [`rect_maxvol`] with default options and tolerance `tol`.
pub fn rect_maxvol_with_tol<A: MaxvolScalar>(mat: ArrayView2<A>, tol: f64) -> Result<Skeleton<A>> {
    rect_maxvol(mat, &RectMaxvolOptions::default().with_tol(tol))
}

/// Append `row` as pivot number `k` and update the coefficients and squared row norms in place.
///
/// Only the first `k` columns of `c` are in use on entry. Column `k` is overwritten.
fn add_pivot<A: Scalar>(c: &mut Array2<A>, norms: &mut Array1<A::Real>, k: usize, row: usize) {
    let c_new = c.slice(s![row, 0..k]).to_owned();
    let v: Array1<A> = c.slice(s![.., 0..k]).dot(&c_new.mapv(|item| item.conj()));

    // v[row] = |c_new|^2 is real and nonnegative.
    let l = A::one() / (A::one() + v[row]);

    for (mut c_row, &vk) in c.slice_mut(s![.., 0..k]).rows_mut().into_iter().zip(v.iter()) {
        c_row.scaled_add(-(l * vk), &c_new);
    }

    c.index_axis_mut(Axis(1), k)
        .zip_mut_with(&v, |item, &vk| *item = l * vk);

    let l_re = l.re();
    for (norm, &vk) in norms.iter_mut().zip(v.iter()) {
        *norm -= l_re * vk.square();
    }
}

/// The eligible non-pivot row with the largest squared norm, first occurrence on ties.
///
/// Rows with a NaN norm are never candidates.
fn argmax_candidate<R: Float>(norms: &Array1<R>, pivots: &PivotSet) -> Option<(usize, R)> {
    let mut best: Option<(usize, R)> = None;

    for (row, &norm) in norms.iter().enumerate() {
        if pivots.contains(row) || norm.is_nan() {
            continue;
        }
        match best {
            Some((_, value)) if !(norm > value) => (),
            _ => best = Some((row, norm)),
        }
    }

    best
}
