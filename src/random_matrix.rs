//! Generation of random test matrices for various types

use crate::types::Result;
use ndarray::{Array1, Array2, Axis};
use ndarray_linalg::{Lapack, Scalar, QR};
use num::complex::Complex;
use rand::Rng;
use rand_distr::{Standard, StandardNormal};

pub trait RandomMatrix
where
    Self: Scalar + Lapack,
{
    /// Generate a random matrix with entries uniformly distributed in $[0, 1)$.
    ///
    /// For complex types the real and imaginary parts are drawn independently.
    ///
    /// # Arguments
    ///
    /// * `dimension`: Tuple (rows, cols) specifying the number of rows and columns.
    /// * `rng`: The random number generator to use.
    fn random_uniform<R: Rng>(dimension: (usize, usize), rng: &mut R) -> Array2<Self>;

    /// Generate a random Gaussian matrix.
    ///
    /// # Arguments
    ///
    /// * `dimension`: Tuple (rows, cols) specifying the number of rows and columns.
    /// * `rng`: The random number generator to use.
    fn random_gaussian<R: Rng>(dimension: (usize, usize), rng: &mut R) -> Array2<Self>;

    /// Generate a tall random matrix with orthonormal columns.
    ///
    /// # Arguments
    ///
    /// * `dimension`: Tuple (rows, cols) with rows >= cols.
    /// * `rng`: The random number generator to use.
    fn random_orthogonal_matrix<R: Rng>(dimension: (usize, usize), rng: &mut R) -> Result<Array2<Self>> {
        assert!(dimension.0 >= dimension.1, "Require rows >= cols");

        let (q, _) = Self::random_gaussian(dimension, rng).qr()?;
        Ok(q)
    }

    /// Generate a tall random matrix with prescribed condition number.
    ///
    /// The singular values are logarithmically distributed between
    /// `sigma_min` and `sigma_max`.
    ///
    /// # Arguments
    ///
    /// * `dimension`: Tuple (rows, cols) with rows >= cols.
    /// * `sigma_max`: Maximum singular value.
    /// * `sigma_min`: Minimum singular value.
    /// * `rng`: The random number generator to use.
    fn random_conditioned_matrix<R: Rng>(
        dimension: (usize, usize),
        sigma_max: f64,
        sigma_min: f64,
        rng: &mut R,
    ) -> Result<Array2<Self>> {
        assert!(
            sigma_min <= sigma_max,
            "`sigma_min` must not be larger than `sigma_max`"
        );
        assert!(sigma_min > 0.0, "`sigma_min` must be positive.");

        let n = dimension.1;

        let u = Self::random_orthogonal_matrix(dimension, rng)?;
        let v = Self::random_orthogonal_matrix((n, n), rng)?;
        let singvals = Array1::linspace(sigma_min.ln(), sigma_max.ln(), n)
            .map(|&item| Self::from_real(Self::real(item.exp())));
        let sigma = Array2::from_diag(&singvals);

        Ok(u.dot(&sigma.dot(&v)))
    }

    /// Generate a tall matrix of the given rank by repeating columns.
    ///
    /// The first `rank` columns are Gaussian, column j >= rank is a copy of
    /// column j % rank.
    ///
    /// # Arguments
    ///
    /// * `dimension`: Tuple (rows, cols) specifying the number of rows and columns.
    /// * `rank`: Number of independent columns.
    /// * `rng`: The random number generator to use.
    fn random_rank_deficient<R: Rng>(dimension: (usize, usize), rank: usize, rng: &mut R) -> Array2<Self> {
        assert!(rank > 0 && rank <= dimension.1, "Require 0 < rank <= cols");

        let basis = Self::random_gaussian((dimension.0, rank), rng);
        let mut mat = Array2::<Self>::zeros(dimension);
        for (index, mut col) in mat.axis_iter_mut(Axis(1)).enumerate() {
            col.assign(&basis.index_axis(Axis(1), index % rank));
        }
        mat
    }
}

macro_rules! random_matrix_impl {
    (@real, $real:ty) => {
        impl RandomMatrix for $real {
            fn random_uniform<R: Rng>(dimension: (usize, usize), rng: &mut R) -> Array2<$real> {
                Array2::from_shape_simple_fn(dimension, || rng.sample::<$real, _>(Standard))
            }

            fn random_gaussian<R: Rng>(dimension: (usize, usize), rng: &mut R) -> Array2<$real> {
                Array2::from_shape_simple_fn(dimension, || rng.sample::<$real, _>(StandardNormal))
            }
        }
    };
    (@complex, $real:ty) => {
        impl RandomMatrix for Complex<$real> {
            fn random_uniform<R: Rng>(dimension: (usize, usize), rng: &mut R) -> Array2<Complex<$real>> {
                Array2::from_shape_simple_fn(dimension, || {
                    let re = rng.sample::<$real, _>(Standard);
                    let im = rng.sample::<$real, _>(Standard);
                    Complex::new(re, im)
                })
            }

            fn random_gaussian<R: Rng>(dimension: (usize, usize), rng: &mut R) -> Array2<Complex<$real>> {
                Array2::from_shape_simple_fn(dimension, || {
                    let re = rng.sample::<$real, _>(StandardNormal);
                    let im = rng.sample::<$real, _>(StandardNormal);
                    Complex::new(re, im)
                })
            }
        }
    };
}

random_matrix_impl!(@real, f64);
random_matrix_impl!(@real, f32);
random_matrix_impl!(@complex, f64);
random_matrix_impl!(@complex, f32);
