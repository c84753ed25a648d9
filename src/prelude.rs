//! Collect all traits and other exports here.

pub use crate::maxvol::{maxvol, maxvol_with_tol, Maxvol, MaxvolOptions};
pub use crate::pivot_set::PivotSet;
pub use crate::pivoted_lu::{HasPivotedLU, PivotedLU, LU};
pub use crate::random_matrix::RandomMatrix;
pub use crate::rect_maxvol::{rect_maxvol, rect_maxvol_with_tol, RectMaxvol, RectMaxvolOptions};
pub use crate::skeleton::{Advisory, Skeleton};
pub use crate::types::{c32, c64, MaxvolError, MaxvolScalar, RelDiff, Result, Scalar};
