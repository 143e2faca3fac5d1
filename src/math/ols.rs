//! Least squares solver.
//!
//! The trend model is a single-predictor regression with intercept:
//!
//! ```text
//! minimize Σ (y_i - (a·x_i + b))^2
//! ```
//!
//! Implementation choices:
//! - Difficulty values run to ~1e14 while day offsets run to ~1e4, so we
//!   center both axes before solving. The slope then comes from a one-column
//!   problem and the intercept is recovered as `ȳ - a·x̄`.
//! - The one-column problem is solved with SVD. A predictor with zero variance
//!   is rank-deficient; we return the minimum-norm solution directly
//!   (slope 0, intercept = mean of y).

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if no finite solution is found.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

/// Fit `y ≈ slope·x + intercept` by ordinary least squares.
///
/// Returns `(slope, intercept)`, or `None` when fewer than two points are
/// given, the slices differ in length, or the solution is not finite.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Option<(f64, f64)> {
    let n = xs.len();
    if n < 2 || ys.len() != n {
        return None;
    }

    let x_mean = xs.iter().sum::<f64>() / n as f64;
    let y_mean = ys.iter().sum::<f64>() / n as f64;

    let x = DMatrix::from_iterator(n, 1, xs.iter().map(|x| x - x_mean));
    let y = DVector::from_iterator(n, ys.iter().map(|y| y - y_mean));

    // A constant predictor centers to all zeros; the SVD min-norm answer is 0.
    let slope = if x.iter().all(|v| *v == 0.0) {
        0.0
    } else {
        solve_least_squares(&x, &y)?[0]
    };
    let intercept = y_mean - slope * x_mean;

    (slope.is_finite() && intercept.is_finite()).then_some((slope, intercept))
}
