//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during parsing and fitting
//! - exported to JSON/CSV
//! - reloaded later for reporting

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One parsed input line: every cell converted to `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    /// 1-based line number in the input file.
    pub line: u64,
    pub cells: Vec<f64>,
    /// How many cells failed conversion and were replaced by `0.0`.
    pub substituted: usize,
}

/// A single measurement with independent lower/upper uncertainties on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub x_err_low: f64,
    pub x_err_high: f64,
    pub y_err_low: f64,
    pub y_err_high: f64,
    /// Input line the point was read from.
    pub line: u64,
    /// Position of the point within its row (`0..POINTS_PER_ROW`).
    pub slot: usize,
}

/// Closed x-interval the model is fitted over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitDomain {
    pub min: f64,
    pub max: f64,
}

impl FitDomain {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.min && x <= self.max
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.max > self.min
    }

    /// True when this interval lies inside `outer`.
    pub fn within(&self, outer: &FitDomain) -> bool {
        self.min >= outer.min && self.max <= outer.max
    }
}

/// How residuals were weighted in the objective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weighting {
    /// Per-point asymmetric effective errors.
    Errors,
    /// Every selected point had zero error; residuals were left unscaled.
    Unit,
}

/// A fitted parameter with its 1-sigma standard error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamEstimate {
    pub name: String,
    pub value: f64,
    pub error: f64,
}

/// Fit output. Built once by the fit engine and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    pub params: Vec<ParamEstimate>,
    /// Row-major parameter covariance at the optimum.
    pub covariance: Vec<Vec<f64>>,
    pub chi2: f64,
    pub ndf: usize,
    pub n_points: usize,
    pub iterations: usize,
    pub domain: FitDomain,
    pub weighting: Weighting,
}

impl FitResult {
    pub fn values(&self) -> Vec<f64> {
        self.params.iter().map(|p| p.value).collect()
    }

    pub fn chi2_per_ndf(&self) -> f64 {
        if self.ndf == 0 {
            f64::NAN
        } else {
            self.chi2 / self.ndf as f64
        }
    }
}

/// Per-point fitted values (for exports and plots).
#[derive(Debug, Clone)]
pub struct PointResidual {
    pub point: Point,
    pub y_fit: f64,
    pub residual: f64,
    /// Effective error used for this point (`NaN` if the point was not fitted).
    pub sigma: f64,
    /// Whether the point took part in the minimization.
    pub used: bool,
}

impl PointResidual {
    pub fn pull(&self) -> f64 {
        if self.used && self.sigma > 0.0 {
            self.residual / self.sigma
        } else {
            f64::NAN
        }
    }
}

/// RGB colour, kept independent of the drawing backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Presentation settings for the fit chart.
///
/// Passed explicitly to the renderer; nothing about chart appearance lives in
/// global state.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub x_label: String,
    pub y_label: String,
    pub marker_color: Rgb,
    pub marker_size: u32,
    pub curve_color: Rgb,
    /// Draw the fit statistics box (chi2/ndf and parameters).
    pub show_fit_stats: bool,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            title: "ver1".to_string(),
            width: 800,
            height: 600,
            x_range: (0.0, 90.0),
            y_range: (-25.0, 150.0),
            x_label: "x [deg]".to_string(),
            y_label: "y".to_string(),
            marker_color: Rgb(0, 0, 255),
            marker_size: 3,
            curve_color: Rgb(255, 0, 0),
            show_fit_stats: true,
        }
    }
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct FitConfig {
    pub input: PathBuf,
    pub delimiter: u8,
    /// Fit x-range. Defaults to the model's own domain.
    pub domain: Option<FitDomain>,
    pub max_iter: usize,

    pub out_dir: PathBuf,
    pub suffix: String,
    /// `None` disables chart rendering.
    pub chart: Option<ChartStyle>,

    pub ascii: bool,
    pub ascii_width: usize,
    pub ascii_height: usize,

    pub export_residuals: Option<PathBuf>,
    pub export_fit: Option<PathBuf>,
}

impl FitConfig {
    /// Path of the chart artifact: `<out_dir>/fit<suffix>.svg`.
    pub fn chart_path(&self) -> PathBuf {
        self.out_dir.join(format!("fit{}.svg", self.suffix))
    }
}

/// A saved fit file (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitFile {
    pub tool: String,
    pub model: String,
    pub formula: String,
    pub input: String,
    pub result: FitResult,
    pub grid: CurveGrid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveGrid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_is_closed_interval() {
        let d = FitDomain::new(5.0, 90.0);
        assert!(d.contains(5.0));
        assert!(d.contains(90.0));
        assert!(!d.contains(4.999));
        assert!(!d.contains(f64::NAN));
    }

    #[test]
    fn within_checks_both_edges() {
        let outer = FitDomain::new(0.0, 90.0);
        assert!(FitDomain::new(5.0, 90.0).within(&outer));
        assert!(FitDomain::new(0.0, 10.0).within(&outer));
        assert!(!FitDomain::new(5.0, 120.0).within(&outer));
        assert!(!FitDomain::new(-1.0, 60.0).within(&outer));
    }

    #[test]
    fn chart_path_uses_suffix() {
        let config = FitConfig {
            input: PathBuf::from("fit_data.csv"),
            delimiter: b',',
            domain: None,
            max_iter: 100,
            out_dir: PathBuf::from("pic/fit"),
            suffix: "_v2".to_string(),
            chart: Some(ChartStyle::default()),
            ascii: false,
            ascii_width: 80,
            ascii_height: 20,
            export_residuals: None,
            export_fit: None,
        };
        assert_eq!(config.chart_path(), PathBuf::from("pic/fit/fit_v2.svg"));
    }
}
