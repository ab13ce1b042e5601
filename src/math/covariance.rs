//! Parameter covariance at the optimum.
//!
//! For residuals already divided by their uncertainties the covariance is
//! `(JᵀJ)⁻¹`. The matrix is tiny (one row/column per parameter), so an SVD
//! condition check before the Cholesky inverse costs nothing.

use nalgebra::DMatrix;

/// Smallest accepted ratio of extreme singular values of `JᵀJ`.
const RCOND_MIN: f64 = 1e-14;

/// Covariance `(JᵀJ)⁻¹` for a weighted-residual Jacobian.
///
/// Returns `None` if `JᵀJ` is singular or numerically close to it.
pub fn covariance(jacobian: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    let jtj = jacobian.transpose() * jacobian;

    let sv = jtj.singular_values();
    let s_max = sv.max();
    let s_min = sv.min();
    if !(s_max > 0.0 && s_min > s_max * RCOND_MIN) {
        return None;
    }

    let chol = jtj.cholesky()?;
    let cov = chol.inverse();
    if cov.iter().all(|v| v.is_finite()) && cov.diagonal().iter().all(|v| *v >= 0.0) {
        Some(cov)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn covariance_of_straight_line_fit() {
        // Unit errors, x = [0, 1, 2]: JᵀJ = [[3, 3], [3, 5]], inverse = [[5, -3], [-3, 3]] / 6.
        let j = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let cov = covariance(&j).unwrap();
        assert_relative_eq!(cov[(0, 0)], 5.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(cov[(0, 1)], -0.5, epsilon = 1e-12);
        assert_relative_eq!(cov[(1, 1)], 0.5, epsilon = 1e-12);
    }

    #[test]
    fn covariance_rejects_rank_deficient_jacobian() {
        let j = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 1.0, 2.0, 1.0, 2.0]);
        assert!(covariance(&j).is_none());
    }

    #[test]
    fn covariance_rejects_zero_jacobian() {
        assert!(covariance(&DMatrix::zeros(4, 3)).is_none());
    }
}
