//! Plotters-powered fit chart.
//!
//! Draws the point cloud with asymmetric error bars, the fitted curve over the
//! fit domain and (optionally) a statistics box, then saves an SVG file.
//!
//! All appearance settings come from the `ChartStyle` argument.

use std::path::Path;

use plotters::prelude::*;

use crate::domain::{ChartStyle, FitResult, PointResidual, Rgb};
use crate::error::FitError;
use crate::io::fit_file::build_grid;
use crate::models::CurveModel;
use crate::report::fmt_sig;

const CURVE_SAMPLES: usize = 200;

fn rgb(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

/// Render the fit chart to `path`.
pub fn render_chart(
    path: &Path,
    residuals: &[PointResidual],
    model: &dyn CurveModel,
    fit: &FitResult,
    style: &ChartStyle,
) -> Result<(), FitError> {
    let draw_err = |e: &dyn std::fmt::Display| {
        FitError::io("render chart", path, std::io::Error::other(e.to_string()))
    };

    let (x0, x1) = style.x_range;
    let (y0, y1) = style.y_range;

    let root = SVGBackend::new(path, (style.width, style.height)).into_drawing_area();
    root.fill(&WHITE).map_err(|e| draw_err(&e))?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&style.title, ("sans-serif", 22).into_font())
        .margin(12)
        .set_label_area_size(LabelAreaPosition::Left, 50)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(|e| draw_err(&e))?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc(style.x_label.as_str())
        .y_desc(style.y_label.as_str())
        .x_labels(10)
        .y_labels(8)
        .draw()
        .map_err(|e| draw_err(&e))?;

    // Every measurement with y > 0 is drawn, including ones outside the fit domain.
    let shown: Vec<&PointResidual> = residuals
        .iter()
        .filter(|r| r.point.y > 0.0 && r.point.x.is_finite() && r.point.y.is_finite())
        .collect();

    let marker = rgb(style.marker_color);

    // 1) Error bars.
    chart
        .draw_series(shown.iter().map(|r| {
            let p = &r.point;
            PathElement::new(
                vec![(p.x, p.y - p.y_err_low.abs()), (p.x, p.y + p.y_err_high.abs())],
                marker.stroke_width(1),
            )
        }))
        .map_err(|e| draw_err(&e))?;
    chart
        .draw_series(shown.iter().map(|r| {
            let p = &r.point;
            PathElement::new(
                vec![(p.x - p.x_err_low.abs(), p.y), (p.x + p.x_err_high.abs(), p.y)],
                marker.stroke_width(1),
            )
        }))
        .map_err(|e| draw_err(&e))?;

    // 2) Markers.
    chart
        .draw_series(
            shown
                .iter()
                .map(|r| Circle::new((r.point.x, r.point.y), style.marker_size, marker.filled())),
        )
        .map_err(|e| draw_err(&e))?;

    // 3) Fitted curve over the fit domain.
    let grid = build_grid(model, fit, CURVE_SAMPLES);
    chart
        .draw_series(LineSeries::new(
            grid.x.iter().copied().zip(grid.y.iter().copied()),
            rgb(style.curve_color).stroke_width(2),
        ))
        .map_err(|e| draw_err(&e))?;

    if style.show_fit_stats {
        draw_stats_box(&root, fit, style).map_err(|e| draw_err(&e))?;
    }

    root.present().map_err(|e| draw_err(&e))?;
    Ok(())
}

/// Lines shown in the statistics box.
pub fn stats_lines(fit: &FitResult) -> Vec<String> {
    let mut lines = vec![
        format!("chi2 / ndf = {} / {}", fmt_sig(fit.chi2, 4), fit.ndf),
        format!("points = {}", fit.n_points),
    ];
    for p in &fit.params {
        lines.push(format!(
            "{} = {} ± {}",
            p.name,
            fmt_sig(p.value, 5),
            fmt_sig(p.error, 3)
        ));
    }
    lines
}

fn draw_stats_box<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    fit: &FitResult,
    style: &ChartStyle,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let lines = stats_lines(fit);
    let line_h = 18;
    let w = 230;
    let h = line_h * lines.len() as i32 + 12;
    let right = style.width as i32 - 24;
    let left = right - w;
    let top = 48;

    root.draw(&Rectangle::new([(left, top), (right, top + h)], WHITE.filled()))?;
    root.draw(&Rectangle::new([(left, top), (right, top + h)], BLACK.stroke_width(1)))?;
    for (i, line) in lines.iter().enumerate() {
        root.draw(&Text::new(
            line.clone(),
            (left + 8, top + 6 + line_h * i as i32),
            ("sans-serif", 14).into_font(),
        ))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FitDomain, ParamEstimate, Point, Weighting};
    use crate::models::CosinePower;

    fn result() -> FitResult {
        FitResult {
            params: vec![
                ParamEstimate { name: "a".into(), value: 50.0, error: 0.5 },
                ParamEstimate { name: "b".into(), value: 100.0, error: 1.0 },
                ParamEstimate { name: "n".into(), value: 2.0, error: 0.01 },
            ],
            covariance: vec![vec![0.0; 3]; 3],
            chi2: 3.0,
            ndf: 2,
            n_points: 5,
            iterations: 4,
            domain: FitDomain::new(5.0, 90.0),
            weighting: Weighting::Errors,
        }
    }

    #[test]
    fn stats_box_lists_every_parameter() {
        let lines = stats_lines(&result());
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "chi2 / ndf = 3 / 2");
        assert_eq!(lines[4], "n = 2 ± 0.01");
    }

    #[test]
    fn writes_svg_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fit_test.svg");
        let point = Point {
            x: 30.0,
            y: 120.0,
            x_err_low: 1.0,
            x_err_high: 2.0,
            y_err_low: 3.0,
            y_err_high: 4.0,
            line: 1,
            slot: 0,
        };
        let residuals = [PointResidual { point, y_fit: 125.0, residual: -5.0, sigma: 4.0, used: true }];
        let style = ChartStyle {
            title: "unit-test".to_string(),
            ..ChartStyle::default()
        };

        render_chart(&path, &residuals, &CosinePower::default(), &result(), &style).unwrap();

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("unit-test"));
        assert!(svg.contains("chi2 / ndf"));
    }
}
