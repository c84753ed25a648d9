//! LU decomposition with partial row pivoting for tall matrices.
//!
//! For a matrix $A\in\mathbb{C}^{m\times n}$ with $m\geq n$ the Lapack routine `?getrf`
//! computes $PA = LU$ with $L$ unit lower trapezoidal and $U\in\mathbb{C}^{n\times n}$ upper
//! triangular. The first $n$ rows of $PA$ form the starting submatrix of the maxvol
//! iteration. Writing $L_1$ for the leading $n\times n$ block of $L$ we have
//! $A_{\text{piv}} = L_1U$, so that the coefficients $C = AA_{\text{piv}}^{-1}$ follow from
//! $C^T = L_1^{-T}U^{-T}A^T$ by two triangular solves.
//!
//! ndarray-linalg only offers LU for square matrices, so `?getrf` is called directly.

use crate::types::{MaxvolError, Result};
use ndarray::{Array1, Array2, ArrayBase, Data, Ix2, ShapeBuilder};
use ndarray_linalg::{Diag, Lapack, Scalar, SolveTriangular, UPLO};
use num::traits::{Float, Zero};

pub struct LU<A: Scalar> {
    /// The unit lower triangular leading block of L.
    pub l: Array2<A>,
    /// The upper triangular factor U.
    pub u: Array2<A>,
    /// An index array. If ind\[j\] = k then the
    /// jth row of PA is the kth row of A.
    pub ind: Array1<usize>,
}

impl<A: HasPivotedLU> LU<A> {
    /// Number of rows of the factorized matrix
    pub fn nrows(&self) -> usize {
        self.ind.len()
    }

    /// Number of columns of the factorized matrix
    pub fn rank(&self) -> usize {
        self.u.nrows()
    }

    /// The rows of A selected by the pivoting, in pivot order.
    pub fn pivots(&self) -> impl Iterator<Item = usize> + '_ {
        self.ind.iter().take(self.rank()).copied()
    }

    /// Lift diagonal entries of U that are numerically zero.
    ///
    /// Entries with modulus at most `max(m, n) * eps * max|u_ii|` are scaled up to
    /// that threshold, keeping their phase. Returns the number of diagonal entries that
    /// were above the threshold if U was modified.
    pub fn regularize(&mut self) -> Option<usize> {
        let n = self.rank();
        let m = self.nrows();
        let zero = <A::Real as Zero>::zero();
        let eps = <A::Real as Float>::epsilon();

        let diag_max = self
            .u
            .diag()
            .iter()
            .map(|item| item.abs())
            .filter(|item| item.is_finite())
            .fold(zero, |acc, item| if item > acc { item } else { acc });

        let mut threshold = A::real(m.max(n)) * eps * diag_max;
        if threshold == zero {
            threshold = eps;
        }

        let mut rank = 0;
        for item in self.u.diag_mut() {
            let modulus = item.abs();
            if modulus.is_finite() && modulus > threshold {
                rank += 1;
            } else if modulus.is_finite() && modulus > zero {
                *item = item.mul_real(threshold / modulus);
            } else {
                *item = A::from_real(threshold);
            }
        }

        if rank < n {
            Some(rank)
        } else {
            None
        }
    }

    /// Return the coefficients $C = A(L_1U)^{-1}$ for all rows of `mat`.
    pub fn coefficients<S: Data<Elem = A>>(&self, mat: &ArrayBase<S, Ix2>) -> Result<Array2<A>> {
        let ut = self.u.t().as_standard_layout().into_owned();
        let lt = self.l.t().as_standard_layout().into_owned();
        let rhs = mat.t().as_standard_layout().into_owned();

        let x = ut.solve_triangular(UPLO::Lower, Diag::NonUnit, &rhs)?;
        let y = lt.solve_triangular(UPLO::Upper, Diag::Unit, &x)?;

        Ok(y.t().as_standard_layout().into_owned())
    }
}

pub trait PivotedLU {
    type A: Scalar + Lapack;

    fn pivoted_lu(&self) -> Result<LU<Self::A>>;
}

impl<A, S> PivotedLU for ArrayBase<S, Ix2>
where
    A: HasPivotedLU,
    S: Data<Elem = A>,
{
    type A = A;

    fn pivoted_lu(&self) -> Result<LU<Self::A>> {
        let m = self.nrows();
        let n = self.ncols();

        if m == 0 || n == 0 {
            return Err(MaxvolError::EmptyMatrix);
        }
        if m < n {
            return Err(MaxvolError::NotTall { nrows: m, ncols: n });
        }

        let mut mat_fortran = Array2::<A>::zeros((m, n).f());
        mat_fortran.assign(self);
        A::pivoted_lu_impl(mat_fortran)
    }
}

pub trait HasPivotedLU: imp::PivotedLUImpl {}

impl<A: imp::PivotedLUImpl> HasPivotedLU for A {}

mod imp {

    use crate::types::{MaxvolError, Result};
    use ndarray::{Array1, Array2};
    use ndarray_linalg::{Lapack, Scalar};

    pub trait PivotedLUImpl
    where
        Self: Scalar + Lapack,
    {
        fn pivoted_lu_impl(mat: Array2<Self>) -> Result<super::LU<Self>>;
        fn pivoted_lu_decomp(mat: &mut [Self], m: usize, n: usize) -> Result<Vec<i32>>;
    }

    macro_rules! impl_lu_pivot {
        ($scalar:ty, $getrf:path) => {
            impl PivotedLUImpl for $scalar {
                fn pivoted_lu_impl(mut mat: Array2<Self>) -> Result<super::LU<$scalar>> {
                    let m = mat.nrows();
                    let n = mat.ncols();

                    // ?getrf expects column major storage.
                    if !mat.t().is_standard_layout() {
                        return Err(MaxvolError::LayoutError);
                    }

                    let ipiv = {
                        let data = mat
                            .as_slice_memory_order_mut()
                            .ok_or(MaxvolError::LayoutError)?;
                        Self::pivoted_lu_decomp(data, m, n)?
                    };

                    let mut l = Array2::<$scalar>::eye(n);
                    let mut u = Array2::<$scalar>::zeros((n, n));
                    for i in 0..n {
                        for j in 0..n {
                            if j >= i {
                                u[[i, j]] = mat[[i, j]];
                            } else {
                                l[[i, j]] = mat[[i, j]];
                            }
                        }
                    }

                    // Convert the sequence of row interchanges into a permutation.
                    let mut ind: Vec<usize> = (0..m).collect();
                    for (i, &p) in ipiv.iter().enumerate() {
                        ind.swap(i, (p - 1) as usize);
                    }

                    Ok(super::LU {
                        l,
                        u,
                        ind: Array1::from(ind),
                    })
                }

                fn pivoted_lu_decomp(mat: &mut [Self], m: usize, n: usize) -> Result<Vec<i32>> {
                    let mut ipiv = vec![0_i32; m.min(n)];
                    let mut info = 0;

                    unsafe {
                        $getrf(
                            m as i32,
                            n as i32,
                            mat,
                            m.max(1) as i32,
                            &mut ipiv,
                            &mut info,
                        );
                    }

                    // info > 0 flags an exactly singular U. The factorization is still
                    // complete and is handled by `LU::regularize`.
                    if info < 0 {
                        return Err(MaxvolError::LapackError(info));
                    }
                    if info > 0 {
                        log::debug!("?getrf: U[{}, {}] is exactly zero", info - 1, info - 1);
                    }

                    Ok(ipiv)
                }
            }
        };
    }

    impl_lu_pivot!(f64, lapack::dgetrf);
    impl_lu_pivot!(f32, lapack::sgetrf);
    impl_lu_pivot!(num::complex::Complex<f64>, lapack::zgetrf);
    impl_lu_pivot!(num::complex::Complex<f32>, lapack::cgetrf);
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::random_matrix::RandomMatrix;
    use crate::types::RelDiff;
    use ndarray::{s, Axis};

    macro_rules! pivoted_lu_tests {

    ($($name:ident: $scalar:ty, $dim:expr, $tol:expr,)*) => {

        $(

        #[test]
        fn $name() {
            let m = $dim.0;
            let n = $dim.1;

            let mut rng = rand::thread_rng();
            let mat = <$scalar>::random_gaussian((m, n), &mut rng);

            let mut lu = mat.pivoted_lu().unwrap();
            assert!(lu.regularize().is_none());

            // The leading rows of PA are reproduced by L_1 U.

            let pivots: Vec<usize> = lu.pivots().collect();
            let submatrix = mat.select(Axis(0), &pivots);
            let prod = lu.l.dot(&lu.u);

            assert!(<$scalar>::rel_diff_fro(prod.view(), submatrix.view()) < $tol);

            // The coefficients reproduce A and are the identity at the pivots.

            let c = lu.coefficients(&mat).unwrap();
            assert_eq!(c.dim(), (m, n));

            let approx = c.dot(&submatrix);
            assert!(<$scalar>::rel_diff_fro(approx.view(), mat.view()) < $tol);

            let eye = Array2::<$scalar>::eye(n);
            let at_pivots = c.select(Axis(0), &pivots);
            for (&actual, &expected) in at_pivots.iter().zip(eye.iter()) {
                assert!((actual - expected).abs() < $tol);
            }

            // The index array is a permutation of all rows.

            let mut sorted = lu.ind.to_vec();
            sorted.sort_unstable();
            assert_eq!(sorted, (0..m).collect::<Vec<_>>());
        }
                )*
            };
        }

    pivoted_lu_tests! {
        pivoted_lu_test_f64: f64, (100, 20), 1E-10,
        pivoted_lu_test_f32: f32, (100, 20), 1E-3,
        pivoted_lu_test_c64: ndarray_linalg::c64, (100, 20), 1E-10,
        pivoted_lu_test_c32: ndarray_linalg::c32, (100, 20), 1E-3,
        pivoted_lu_test_square_f64: f64, (30, 30), 1E-8,
    }

    #[test]
    fn test_regularize_duplicate_columns() {
        let mut rng = rand::thread_rng();
        let mat = f64::random_rank_deficient((50, 6), 3, &mut rng);

        let mut lu = mat.pivoted_lu().unwrap();
        let rank = lu.regularize();

        assert!(rank.is_some());
        assert!(rank.unwrap() <= 3);
        assert!(lu.u.diag().iter().all(|item| item.abs() > 0.0));

        let c = lu.coefficients(&mat).unwrap();
        assert!(c.iter().all(|item| item.is_finite()));
    }

    #[test]
    fn test_wide_matrix_is_rejected() {
        let mat = Array2::<f64>::zeros((3, 5));
        assert!(matches!(
            mat.pivoted_lu(),
            Err(MaxvolError::NotTall { nrows: 3, ncols: 5 })
        ));
    }

    #[test]
    fn test_lu_of_row_block() {
        let mut rng = rand::thread_rng();
        let mat = f64::random_gaussian((40, 5), &mut rng);

        let lu = mat.slice(s![0..10, ..]).pivoted_lu().unwrap();
        assert_eq!(lu.nrows(), 10);
        assert!(lu.pivots().all(|row| row < 10));
    }
}
