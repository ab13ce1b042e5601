//! Weighted nonlinear fit of a `CurveModel` to expanded points.
//!
//! Given:
//! - the expanded point list
//! - a model (function, gradient, initial guess)
//! - a fit domain
//!
//! we:
//! - select points (`y > 0`, inside the domain, finite)
//! - minimize `χ² = Σ ((y_i - f(x_i)) / σ_i)²` with asymmetric effective σ_i
//! - report parameters with `sqrt(diag(cov))` errors and χ²/ndf
//!
//! The engine never hands back the initial guess as a result: every failure
//! mode is an explicit `FitError`.

use log::{debug, info};
use nalgebra::{DMatrix, DVector};

use crate::domain::{FitDomain, FitResult, ParamEstimate, Point, Weighting};
use crate::error::FitError;
use crate::fit::selection::{Selection, select_points};
use crate::fit::weights::effective_sigma;
use crate::math::{LeastSquaresProblem, LevenbergMarquardt, Minimizer};
use crate::models::CurveModel;

/// Result of a successful fit plus the point selection it was computed on.
#[derive(Debug, Clone)]
pub struct Fit {
    pub result: FitResult,
    pub selection: Selection,
}

/// Weighted curve fitter, generic over the solver.
#[derive(Debug, Clone, Default)]
pub struct FitEngine<M = LevenbergMarquardt> {
    minimizer: M,
}

impl<M: Minimizer> FitEngine<M> {
    pub fn new(minimizer: M) -> Self {
        Self { minimizer }
    }

    /// Fit `model` to `points` over `domain`.
    pub fn fit(
        &self,
        points: &[Point],
        model: &dyn CurveModel,
        domain: FitDomain,
    ) -> Result<Fit, FitError> {
        let selection = select_points(points, domain);
        let used = selection.used_points(points);
        let k = model.n_params();

        debug!(
            "selected {} of {} point(s) ({} excluded)",
            used.len(),
            points.len(),
            selection.excluded.len()
        );

        if used.is_empty() {
            return Err(FitError::EmptyDataset);
        }
        if used.len() <= k {
            return Err(FitError::Underdetermined {
                points: used.len(),
                params: k,
            });
        }

        let problem = AsymmetricChi2 {
            points: &used,
            model,
            weighting: selection.weighting,
        };
        let initial = model.initial_params();
        let bounds = model.param_bounds();
        let min = self.minimizer.minimize(&problem, &initial, &bounds);

        if !min.converged || !min.chi2.is_finite() || min.params.iter().any(|v| !v.is_finite()) {
            return Err(FitError::NonConvergence {
                iterations: min.iterations,
                chi2: min.chi2,
                params: min.params,
            });
        }
        let cov = min.covariance.ok_or(FitError::SingularCovariance)?;

        let params: Vec<ParamEstimate> = model
            .param_names()
            .iter()
            .enumerate()
            .map(|(j, name)| ParamEstimate {
                name: (*name).to_string(),
                value: min.params[j],
                error: cov[(j, j)].sqrt(),
            })
            .collect();

        let ndf = used.len() - k;
        info!(
            "fit converged in {} iteration(s): chi2/ndf = {:.4}/{ndf}",
            min.iterations, min.chi2
        );

        let result = FitResult {
            params,
            covariance: cov.row_iter().map(|r| r.iter().copied().collect()).collect(),
            chi2: min.chi2,
            ndf,
            n_points: used.len(),
            iterations: min.iterations,
            domain,
            weighting: selection.weighting,
        };

        Ok(Fit { result, selection })
    }
}

/// Effective σ of one point for the given parameters.
pub fn point_sigma(point: &Point, model: &dyn CurveModel, params: &[f64], weighting: Weighting) -> f64 {
    match weighting {
        Weighting::Unit => 1.0,
        Weighting::Errors => {
            let f = model.eval(point.x, params);
            effective_sigma(point, f, model.slope(point.x, params))
        }
    }
}

/// χ² objective with side-dependent errors.
///
/// The σ of each point is re-evaluated for every parameter vector. A point
/// whose σ collapses to zero for the current curve contributes nothing.
struct AsymmetricChi2<'a> {
    points: &'a [Point],
    model: &'a dyn CurveModel,
    weighting: Weighting,
}

impl AsymmetricChi2<'_> {
    fn inv_sigma(&self, point: &Point, params: &[f64]) -> f64 {
        let s = point_sigma(point, self.model, params, self.weighting);
        if s > 0.0 { 1.0 / s } else { 0.0 }
    }
}

impl LeastSquaresProblem for AsymmetricChi2<'_> {
    fn n_params(&self) -> usize {
        self.model.n_params()
    }

    fn n_residuals(&self) -> usize {
        self.points.len()
    }

    fn residuals(&self, params: &[f64], out: &mut DVector<f64>) {
        for (i, p) in self.points.iter().enumerate() {
            out[i] = (p.y - self.model.eval(p.x, params)) * self.inv_sigma(p, params);
        }
    }

    fn jacobian(&self, params: &[f64], out: &mut DMatrix<f64>) {
        let mut grad = vec![0.0; self.model.n_params()];
        for (i, p) in self.points.iter().enumerate() {
            self.model.gradient(p.x, params, &mut grad);
            let w = self.inv_sigma(p, params);
            for (j, g) in grad.iter().enumerate() {
                out[(i, j)] = -g * w;
            }
        }
    }
}
