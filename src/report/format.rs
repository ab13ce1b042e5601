//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the fitting code stays clean and testable
//! - output changes are localized

use crate::domain::{FitResult, Weighting};
use crate::fit::{Exclusion, Selection};
use crate::io::table::ParsedTable;
use crate::models::CurveModel;

/// The parameter block: a header plus one `name = value ± error` line per parameter.
pub fn format_param_report(fit: &FitResult) -> String {
    let mut out = String::from("Fit parameters:\n");
    for p in &fit.params {
        out.push_str(&format!(
            "{} = {} ± {}\n",
            p.name,
            fmt_sig(p.value, 6),
            fmt_sig(p.error, 6)
        ));
    }
    out
}

/// Dataset and fit diagnostics printed ahead of the parameter report.
pub fn format_run_summary(
    input: &str,
    table: &ParsedTable,
    n_points: usize,
    selection: &Selection,
    model: &dyn CurveModel,
    fit: &FitResult,
) -> String {
    let mut out = String::new();

    out.push_str("=== asymfit - asymmetric-error curve fit ===\n");
    out.push_str(&format!("Input: {input}\n"));
    out.push_str(&format!(
        "Rows: read={} | used={} | skipped (short)={} | substituted cells={}\n",
        table.lines_read,
        table.rows.len(),
        table.short_rows.len(),
        table.substituted_cells(),
    ));
    out.push_str(&format!(
        "Points: expanded={n_points} | fitted={} | excluded={}\n",
        selection.used.len(),
        selection.excluded.len(),
    ));
    for reason in [
        Exclusion::NonFinite,
        Exclusion::NonPositiveY,
        Exclusion::OutsideDomain,
        Exclusion::NoUncertainty,
    ] {
        let n = selection.count(reason);
        if n > 0 {
            out.push_str(&format!("  - {}: {n}\n", reason.label()));
        }
    }

    out.push_str(&format!("Model: f(x) = {}\n", model.formula()));
    out.push_str(&format!(
        "Range: [{}, {}]\n",
        fmt_sig(fit.domain.min, 6),
        fmt_sig(fit.domain.max, 6)
    ));
    if fit.weighting == Weighting::Unit {
        out.push_str("Weights: unit (no point carries errors)\n");
    }
    out.push_str(&format!(
        "Chi2 / ndf: {} / {} = {}\n",
        fmt_sig(fit.chi2, 6),
        fit.ndf,
        fmt_sig(fit.chi2_per_ndf(), 6)
    ));
    out.push_str(&format!("Iterations: {}\n", fit.iterations));

    out
}

/// Format with `sig` significant digits, fixed notation for ordinary magnitudes.
pub fn fmt_sig(v: f64, sig: usize) -> String {
    if !v.is_finite() {
        return format!("{v}");
    }
    if v == 0.0 {
        return "0".to_string();
    }
    let mag = v.abs().log10().floor() as i32;
    if !(-5..=15).contains(&mag) {
        return format!("{:.*e}", sig.saturating_sub(1), v);
    }
    let decimals = (sig as i32 - 1 - mag).max(0) as usize;
    let s = format!("{v:.decimals$}");
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    }
}
