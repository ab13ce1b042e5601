//! Choosing which expanded points enter the minimization.
//!
//! Rules, checked in order:
//! 1. every coordinate and error must be finite
//! 2. `y > 0`
//! 3. `x` inside the fit domain
//! 4. the point carries some uncertainty, unless no selected point does
//!
//! Excluded points keep their index so reports can show them.

use log::debug;

use crate::domain::{FitDomain, Point, Weighting};

/// Why a point was left out of the fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    NonFinite,
    NonPositiveY,
    OutsideDomain,
    /// All four errors are zero while other points carry errors.
    NoUncertainty,
}

impl Exclusion {
    pub fn label(self) -> &'static str {
        match self {
            Exclusion::NonFinite => "non-finite value",
            Exclusion::NonPositiveY => "y <= 0",
            Exclusion::OutsideDomain => "outside fit domain",
            Exclusion::NoUncertainty => "zero errors",
        }
    }
}

/// Points that take part in the fit, plus the ones that do not.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Indices into the expanded point list, in input order.
    pub used: Vec<usize>,
    pub excluded: Vec<(usize, Exclusion)>,
    pub weighting: Weighting,
}

impl Selection {
    pub fn count(&self, reason: Exclusion) -> usize {
        self.excluded.iter().filter(|(_, r)| *r == reason).count()
    }

    pub fn used_points(&self, points: &[Point]) -> Vec<Point> {
        self.used.iter().map(|&i| points[i]).collect()
    }
}

fn all_finite(p: &Point) -> bool {
    [p.x, p.y, p.x_err_low, p.x_err_high, p.y_err_low, p.y_err_high]
        .iter()
        .all(|v| v.is_finite())
}

fn has_uncertainty(p: &Point) -> bool {
    [p.x_err_low, p.x_err_high, p.y_err_low, p.y_err_high]
        .iter()
        .any(|v| *v != 0.0)
}

/// Apply the selection rules to an expanded point list.
pub fn select_points(points: &[Point], domain: FitDomain) -> Selection {
    let mut candidates = Vec::with_capacity(points.len());
    let mut excluded = Vec::new();

    for (i, p) in points.iter().enumerate() {
        let reason = if !all_finite(p) {
            Some(Exclusion::NonFinite)
        } else if p.y <= 0.0 {
            Some(Exclusion::NonPositiveY)
        } else if !domain.contains(p.x) {
            Some(Exclusion::OutsideDomain)
        } else {
            None
        };

        match reason {
            Some(r) => {
                debug!("line {} slot {}: excluded ({})", p.line, p.slot, r.label());
                excluded.push((i, r));
            }
            None => candidates.push(i),
        }
    }

    let any_errors = candidates.iter().any(|&i| has_uncertainty(&points[i]));
    let weighting = if any_errors || candidates.is_empty() {
        Weighting::Errors
    } else {
        debug!("no selected point carries errors; using unit weights");
        Weighting::Unit
    };

    let mut used = Vec::with_capacity(candidates.len());
    for i in candidates {
        if weighting == Weighting::Errors && !has_uncertainty(&points[i]) {
            let p = &points[i];
            debug!("line {} slot {}: excluded ({})", p.line, p.slot, Exclusion::NoUncertainty.label());
            excluded.push((i, Exclusion::NoUncertainty));
        } else {
            used.push(i);
        }
    }
    excluded.sort_by_key(|(i, _)| *i);

    Selection {
        used,
        excluded,
        weighting,
    }
}
