//! Computing skeleton approximations of a tall matrix.
//!
//! This example selects maximal volume rows of a random $1000\times 30$ matrix with
//! `maxvol` and `rect_maxvol` and prints the number of pivots, the coefficient bounds
//! and the reconstruction error for a few tolerances.

use rusty_maxvol::*;

pub fn main() {
    // We initialize a random number generator.
    let mut rng = rand::thread_rng();

    // A tall random matrix with uniformly distributed entries.
    let mat = c64::random_uniform((1000, 30), &mut rng);

    // Square maxvol: r pivots with all coefficients bounded by tol.
    for &tol in [1.0, 1.05, 1.1].iter() {
        let skeleton = maxvol_with_tol(mat.view(), tol).expect("maxvol failed.");

        println!(
            "maxvol      tol = {:4.2}: {:4} pivots, max |c| = {:1.5}, rel. error {:1.2E}",
            tol,
            skeleton.rank(),
            skeleton.max_abs_coefficient(),
            skeleton.rel_error(&mat)
        );
    }

    // Rectangular maxvol: more pivots, all coefficient rows bounded by tol.
    for &tol in [1.0, 1.5, 2.0].iter() {
        let skeleton = rect_maxvol_with_tol(mat.view(), tol).expect("rect_maxvol failed.");

        println!(
            "rect_maxvol tol = {:4.2}: {:4} pivots, max |c_i| = {:1.5}, rel. error {:1.2E}",
            tol,
            skeleton.rank(),
            skeleton.max_row_norm(),
            skeleton.rel_error(&mat)
        );
    }

    // Advisories report when a budget stopped the search early.
    let options = RectMaxvolOptions::default().with_tol(1.0).with_max_k(40);
    let skeleton = rect_maxvol(mat.view(), &options).expect("rect_maxvol failed.");
    for advisory in skeleton.advisories.iter() {
        println!("advisory: {:?}", advisory);
    }
}
