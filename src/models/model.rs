//! Parametric curve models.
//!
//! The fitter only needs three primitive operations from a model:
//! - evaluate `f(x; p)`
//! - the parameter gradient `∂f/∂p` (Jacobian rows)
//! - the slope `∂f/∂x` (to propagate x errors)
//!
//! plus its parameter names, starting point and fit domain.

use std::f64::consts::PI;

use crate::domain::FitDomain;

/// A curve family `f(x; p)` with a fixed number of parameters.
pub trait CurveModel {
    /// Short identifier used in exports.
    fn name(&self) -> &'static str;

    /// Human-readable formula.
    fn formula(&self) -> &'static str;

    fn param_names(&self) -> &'static [&'static str];

    fn initial_params(&self) -> Vec<f64>;

    /// Optional `(min, max)` box per parameter. Unbounded by default.
    fn param_bounds(&self) -> Vec<Option<(f64, f64)>> {
        vec![None; self.n_params()]
    }

    /// x-range over which the model is fitted.
    fn domain(&self) -> FitDomain;

    /// Widest x-range on which `eval` is real-valued for every parameter vector.
    fn defined_range(&self) -> FitDomain {
        FitDomain::new(f64::NEG_INFINITY, f64::INFINITY)
    }

    fn eval(&self, x: f64, params: &[f64]) -> f64;

    /// Write `∂f/∂p_j` into `out[j]`.
    fn gradient(&self, x: f64, params: &[f64], out: &mut [f64]);

    /// `∂f/∂x`. Defaults to a central difference.
    fn slope(&self, x: f64, params: &[f64]) -> f64 {
        let h = 1e-6 * x.abs().max(1.0);
        (self.eval(x + h, params) - self.eval(x - h, params)) / (2.0 * h)
    }

    fn n_params(&self) -> usize {
        self.param_names().len()
    }
}

/// `f(x; a, b, n) = a + b · cos(x·π/180)^n`, x in degrees.
///
/// The fit domain is `[5, 90]`. Over that range `cos` is non-negative, so the
/// real power `cos^n` stays defined for every non-integer `n` the solver may
/// try. Past 90° the base turns negative and `powf` would return NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CosinePower {
    pub initial: [f64; 3],
    pub domain: FitDomain,
}

impl Default for CosinePower {
    fn default() -> Self {
        Self {
            initial: [50.0, 100.0, 2.0],
            domain: FitDomain::new(5.0, 90.0),
        }
    }
}

impl CosinePower {
    pub fn with_domain(domain: FitDomain) -> Self {
        Self {
            domain,
            ..Self::default()
        }
    }
}

fn cos_deg(x: f64) -> f64 {
    (x * PI / 180.0).cos()
}

impl CurveModel for CosinePower {
    fn name(&self) -> &'static str {
        "cos-power"
    }

    fn formula(&self) -> &'static str {
        "a + b*cos(x*pi/180)^n"
    }

    fn param_names(&self) -> &'static [&'static str] {
        &["a", "b", "n"]
    }

    fn initial_params(&self) -> Vec<f64> {
        self.initial.to_vec()
    }

    fn domain(&self) -> FitDomain {
        self.domain
    }

    fn defined_range(&self) -> FitDomain {
        FitDomain::new(0.0, 90.0)
    }

    fn eval(&self, x: f64, params: &[f64]) -> f64 {
        params[0] + params[1] * cos_deg(x).powf(params[2])
    }

    fn gradient(&self, x: f64, params: &[f64], out: &mut [f64]) {
        let c = cos_deg(x);
        let cn = c.powf(params[2]);
        out[0] = 1.0;
        out[1] = cn;
        // c^n·ln c → 0 as c → 0+ for n > 0; avoid 0·(-inf).
        out[2] = if c > 0.0 { params[1] * cn * c.ln() } else { 0.0 };
    }

    fn slope(&self, x: f64, params: &[f64]) -> f64 {
        let theta = x * PI / 180.0;
        let (b, n) = (params[1], params[2]);
        -b * n * theta.cos().powf(n - 1.0) * theta.sin() * PI / 180.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn evaluates_in_degrees() {
        let m = CosinePower::default();
        let p = [50.0, 100.0, 2.0];
        assert_relative_eq!(m.eval(0.0, &p), 150.0, epsilon = 1e-12);
        assert_relative_eq!(m.eval(60.0, &p), 75.0, epsilon = 1e-9);
        assert_relative_eq!(m.eval(90.0, &p), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn defaults_match_model_definition() {
        let m = CosinePower::default();
        assert_eq!(m.initial_params(), vec![50.0, 100.0, 2.0]);
        assert_eq!(m.domain(), FitDomain::new(5.0, 90.0));
        assert_eq!(m.param_names(), &["a", "b", "n"]);
        assert!(m.param_bounds().iter().all(Option::is_none));
    }

    #[test]
    fn gradient_matches_finite_differences() {
        let m = CosinePower::default();
        let p = [60.0, 80.0, 1.5];
        let mut g = [0.0; 3];
        for &x in &[5.0, 30.0, 60.0, 85.0] {
            m.gradient(x, &p, &mut g);
            for j in 0..3 {
                let h = 1e-6;
                let mut hi = p;
                let mut lo = p;
                hi[j] += h;
                lo[j] -= h;
                let fd = (m.eval(x, &hi) - m.eval(x, &lo)) / (2.0 * h);
                assert_relative_eq!(g[j], fd, epsilon = 1e-5, max_relative = 1e-6);
            }
        }
    }

    #[test]
    fn slope_matches_finite_difference() {
        let m = CosinePower::default();
        let p = [60.0, 80.0, 1.5];
        let x = 40.0;
        let h = 1e-5;
        let fd = (m.eval(x + h, &p) - m.eval(x - h, &p)) / (2.0 * h);
        assert_relative_eq!(m.slope(x, &p), fd, max_relative = 1e-6);
    }

    #[test]
    fn domain_keeps_cosine_non_negative() {
        let m = CosinePower::default();
        let d = m.domain();
        let p = [0.0, 1.0, 1.5];
        for i in 0..=100 {
            let x = d.min + (d.max - d.min) * i as f64 / 100.0;
            assert!(m.eval(x, &p).is_finite());
        }
        assert!(m.eval(120.0, &p).is_nan());
        assert!(d.within(&m.defined_range()));
    }
}
