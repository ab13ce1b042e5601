//! Reporting utilities: residuals and formatted terminal output.

pub mod format;

pub use format::*;

use crate::domain::{FitResult, Point, PointResidual};
use crate::fit::{Selection, point_sigma};
use crate::models::CurveModel;

/// Fitted value, residual and effective error for every expanded point.
///
/// Points the fit did not use are included with `used = false`.
pub fn compute_residuals(
    points: &[Point],
    selection: &Selection,
    model: &dyn CurveModel,
    fit: &FitResult,
) -> Vec<PointResidual> {
    let params = fit.values();
    let mut used = vec![false; points.len()];
    for &i in &selection.used {
        used[i] = true;
    }

    points
        .iter()
        .zip(used)
        .map(|(p, used)| {
            let y_fit = model.eval(p.x, &params);
            let sigma = if used {
                point_sigma(p, model, &params, fit.weighting)
            } else {
                f64::NAN
            };
            PointResidual {
                point: *p,
                y_fit,
                residual: p.y - y_fit,
                sigma,
                used,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitDomain, ParamEstimate, Weighting};
    use crate::fit::select_points;
    use crate::models::CosinePower;

    fn pt(x: f64, y: f64) -> Point {
        Point {
            x,
            y,
            x_err_low: 0.0,
            x_err_high: 0.0,
            y_err_low: 2.0,
            y_err_high: 2.0,
            line: 1,
            slot: 0,
        }
    }

    #[test]
    fn residuals_cover_every_point() {
        let model = CosinePower::default();
        let points = [pt(60.0, 80.0), pt(60.0, -1.0)];
        let selection = select_points(&points, FitDomain::new(5.0, 90.0));
        let fit = FitResult {
            params: ["a", "b", "n"]
                .iter()
                .zip([50.0, 100.0, 2.0])
                .map(|(n, v)| ParamEstimate {
                    name: n.to_string(),
                    value: v,
                    error: 0.1,
                })
                .collect(),
            covariance: vec![vec![0.0; 3]; 3],
            chi2: 0.0,
            ndf: 1,
            n_points: 1,
            iterations: 1,
            domain: FitDomain::new(5.0, 90.0),
            weighting: Weighting::Errors,
        };

        let res = compute_residuals(&points, &selection, &model, &fit);
        assert_eq!(res.len(), 2);
        assert!(res[0].used);
        assert!((res[0].y_fit - 75.0).abs() < 1e-9);
        assert!((res[0].pull() - 2.5).abs() < 1e-9);
        assert!(!res[1].used);
        assert!(res[1].pull().is_nan());
    }
}
