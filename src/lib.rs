//! # rusty-maxvol
//!
//! Search for rows of a tall matrix $A\in\mathbb{C}^{N\times r}$ that span a submatrix of
//! (locally) maximal volume, together with the coefficients $C$ satisfying
//! $A\approx CA_{\text{piv}}$. These are the building blocks of skeleton and cross
//! approximations.
//!
//! - [`maxvol`] selects $r$ rows such that all coefficients satisfy $|c_{ij}|\leq\text{tol}$.
//! - [`rect_maxvol`] selects $K\geq r$ rows such that all rows of $C$ satisfy
//!   $\|C_{i,:}\|_2\leq\text{tol}$.
//!
//! Both are implemented for `f32`, `f64`, `c32` and `c64`.

pub mod maxvol;
pub mod pivot_set;
pub mod pivoted_lu;
pub mod prelude;
pub mod random_matrix;
pub mod rect_maxvol;
pub mod skeleton;
pub mod types;

pub use maxvol::{maxvol, maxvol_with_tol, Maxvol, MaxvolOptions};
pub use pivot_set::PivotSet;
pub use pivoted_lu::{PivotedLU, LU};
pub use random_matrix::RandomMatrix;
pub use rect_maxvol::{rect_maxvol, rect_maxvol_with_tol, RectMaxvol, RectMaxvolOptions};
pub use skeleton::{Advisory, Skeleton};
pub use types::{c32, c64, MaxvolError, MaxvolScalar, RelDiff, Result, Scalar};
