//! Nonlinear least-squares minimization.
//!
//! The solver sits behind two small traits so the fit engine never depends on
//! how the minimization is carried out:
//!
//! - [`LeastSquaresProblem`]: residual vector `r(p)` and Jacobian `∂r/∂p`
//! - [`Minimizer`]: `minimize(problem, initial, bounds) → Minimum`
//!
//! The objective is `χ²(p) = Σ r_i(p)²`. Residuals are expected to be already
//! divided by their uncertainties. The residual scale may depend on `p`
//! (asymmetric errors pick a side based on the current curve); the Jacobian
//! treats that scale as locally constant.
//!
//! [`LevenbergMarquardt`] delegates to the MINPACK-style trust-region solver of
//! the `levenberg-marquardt` crate. A non-finite residual or Jacobian aborts the
//! run, and only the crate's successful termination reasons count as converged.

use levenberg_marquardt::{LeastSquaresProblem as LmTarget, LevenbergMarquardt as LmSolver};
use log::{debug, trace};
use nalgebra::storage::Owned;
use nalgebra::{DMatrix, DVector, Dyn};

use crate::math::covariance::covariance;

/// Residuals and Jacobian of a least-squares objective.
pub trait LeastSquaresProblem {
    fn n_params(&self) -> usize;

    fn n_residuals(&self) -> usize;

    /// Fill `out` (length `n_residuals`) with `r_i(p)`.
    fn residuals(&self, params: &[f64], out: &mut DVector<f64>);

    /// Fill `out` (`n_residuals × n_params`) with `∂r_i/∂p_j`.
    fn jacobian(&self, params: &[f64], out: &mut DMatrix<f64>);
}

/// Outcome of a minimization run.
#[derive(Debug, Clone)]
pub struct Minimum {
    pub params: Vec<f64>,
    /// `(JᵀJ)⁻¹` at `params`; `None` when singular.
    pub covariance: Option<DMatrix<f64>>,
    pub chi2: f64,
    /// Residual evaluations spent.
    pub iterations: usize,
    pub converged: bool,
}

/// A nonlinear least-squares solver.
pub trait Minimizer {
    fn minimize(
        &self,
        problem: &dyn LeastSquaresProblem,
        initial: &[f64],
        bounds: &[Option<(f64, f64)>],
    ) -> Minimum;
}

/// Levenberg–Marquardt settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevenbergMarquardt {
    /// Evaluation budget, in units of `n_params + 1` residual evaluations.
    pub max_iter: usize,
    /// Relative χ² reduction tolerance.
    pub ftol: f64,
    /// Relative step length tolerance.
    pub xtol: f64,
    /// Orthogonality tolerance between residuals and Jacobian columns.
    pub gtol: f64,
}

impl Default for LevenbergMarquardt {
    fn default() -> Self {
        Self {
            max_iter: 200,
            ftol: 1e-10,
            xtol: 1e-10,
            gtol: 0.0,
        }
    }
}

impl LevenbergMarquardt {
    pub fn with_max_iter(max_iter: usize) -> Self {
        Self {
            max_iter,
            ..Self::default()
        }
    }
}

impl Minimizer for LevenbergMarquardt {
    fn minimize(
        &self,
        problem: &dyn LeastSquaresProblem,
        initial: &[f64],
        bounds: &[Option<(f64, f64)>],
    ) -> Minimum {
        let mut start = initial.to_vec();
        project(&mut start, bounds);

        let target = Target {
            problem,
            bounds,
            params: DVector::from_vec(start),
        };

        let solver = LmSolver::new()
            .with_ftol(self.ftol)
            .with_xtol(self.xtol)
            .with_gtol(self.gtol)
            .with_patience(self.max_iter.max(1));
        let (target, report) = solver.minimize(target);

        debug!(
            "lm: {:?} after {} evaluation(s)",
            report.termination, report.number_of_evaluations
        );

        let params: Vec<f64> = target.params.iter().copied().collect();
        let chi2 = target
            .residuals()
            .map(|r| r.norm_squared())
            .unwrap_or(f64::NAN);
        let covariance = target.jacobian().and_then(|j| covariance(&j));

        Minimum {
            converged: report.termination.was_successful() && chi2.is_finite(),
            params,
            covariance,
            chi2,
            iterations: report.number_of_evaluations,
        }
    }
}

/// Adapts a [`LeastSquaresProblem`] to the solver crate's stateful interface.
struct Target<'a> {
    problem: &'a dyn LeastSquaresProblem,
    bounds: &'a [Option<(f64, f64)>],
    params: DVector<f64>,
}

impl LmTarget<f64, Dyn, Dyn> for Target<'_> {
    type ResidualStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;

    fn set_params(&mut self, x: &DVector<f64>) {
        self.params.copy_from(x);
        project(self.params.as_mut_slice(), self.bounds);
    }

    fn params(&self) -> DVector<f64> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        let mut r = DVector::zeros(self.problem.n_residuals());
        self.problem.residuals(self.params.as_slice(), &mut r);
        if r.iter().all(|v| v.is_finite()) {
            Some(r)
        } else {
            trace!("lm: non-finite residuals at {:?}", self.params.as_slice());
            None
        }
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let mut j = DMatrix::zeros(self.problem.n_residuals(), self.problem.n_params());
        self.problem.jacobian(self.params.as_slice(), &mut j);
        j.iter().all(|v| v.is_finite()).then_some(j)
    }
}

fn project(params: &mut [f64], bounds: &[Option<(f64, f64)>]) {
    for (p, b) in params.iter_mut().zip(bounds.iter()) {
        if let Some((lo, hi)) = b {
            *p = p.clamp(*lo, *hi);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// y = p0 · exp(p1 · t), unit errors.
    struct ExpDecay {
        t: Vec<f64>,
        y: Vec<f64>,
    }

    impl LeastSquaresProblem for ExpDecay {
        fn n_params(&self) -> usize {
            2
        }

        fn n_residuals(&self) -> usize {
            self.t.len()
        }

        fn residuals(&self, p: &[f64], out: &mut DVector<f64>) {
            for (i, (&t, &y)) in self.t.iter().zip(&self.y).enumerate() {
                out[i] = y - p[0] * (p[1] * t).exp();
            }
        }

        fn jacobian(&self, p: &[f64], out: &mut DMatrix<f64>) {
            for (i, &t) in self.t.iter().enumerate() {
                let e = (p[1] * t).exp();
                out[(i, 0)] = -e;
                out[(i, 1)] = -p[0] * t * e;
            }
        }
    }

    fn exact_decay() -> ExpDecay {
        let t: Vec<f64> = (0..12).map(|i| i as f64 * 0.5).collect();
        let y = t.iter().map(|&t| 3.0 * (-0.7 * t).exp()).collect();
        ExpDecay { t, y }
    }

    /// Finite only at the starting point; every other trial is NaN.
    struct NanAwayFromStart {
        start: [f64; 2],
    }

    impl LeastSquaresProblem for NanAwayFromStart {
        fn n_params(&self) -> usize {
            2
        }

        fn n_residuals(&self) -> usize {
            4
        }

        fn residuals(&self, p: &[f64], out: &mut DVector<f64>) {
            let v = if p == self.start { 1.0 } else { f64::NAN };
            out.fill(v);
        }

        fn jacobian(&self, _p: &[f64], out: &mut DMatrix<f64>) {
            for i in 0..4 {
                out[(i, 0)] = 1.0;
                out[(i, 1)] = i as f64;
            }
        }
    }

    #[test]
    fn recovers_exact_exponential() {
        let problem = exact_decay();
        let min = LevenbergMarquardt::default().minimize(&problem, &[1.0, -0.1], &[None, None]);

        assert!(min.converged);
        assert_relative_eq!(min.params[0], 3.0, epsilon = 1e-6);
        assert_relative_eq!(min.params[1], -0.7, epsilon = 1e-6);
        assert!(min.chi2 < 1e-12);
        assert!(min.covariance.is_some());
    }

    #[test]
    fn respects_bounds() {
        let problem = exact_decay();
        let bounds = [Some((0.0, 2.0)), None];
        let min = LevenbergMarquardt::default().minimize(&problem, &[1.0, -0.1], &bounds);
        assert!(min.params[0] <= 2.0);
    }

    #[test]
    fn reports_non_convergence_when_budget_is_exhausted() {
        let problem = exact_decay();
        let min = LevenbergMarquardt::with_max_iter(1).minimize(&problem, &[1.0, -0.1], &[None, None]);
        assert!(!min.converged);
        assert!(min.iterations <= 3);
    }

    #[test]
    fn non_finite_trials_are_not_convergence() {
        let problem = NanAwayFromStart { start: [1.0, 2.0] };
        let min = LevenbergMarquardt::default().minimize(&problem, &[1.0, 2.0], &[None, None]);
        assert!(!min.converged);
    }

    #[test]
    fn non_finite_start_is_not_convergence() {
        let problem = NanAwayFromStart { start: [0.0, 0.0] };
        let min = LevenbergMarquardt::default().minimize(&problem, &[1.0, 2.0], &[None, None]);
        assert!(!min.converged);
        assert!(!min.chi2.is_finite());
    }

    #[test]
    fn deterministic_across_runs() {
        let problem = exact_decay();
        let lm = LevenbergMarquardt::default();
        let a = lm.minimize(&problem, &[1.0, -0.1], &[None, None]);
        let b = lm.minimize(&problem, &[1.0, -0.1], &[None, None]);
        assert_eq!(a.params, b.params);
        assert_eq!(a.chi2.to_bits(), b.chi2.to_bits());
    }
}
