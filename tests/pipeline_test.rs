use std::fs;
use std::path::Path;

use approx::assert_relative_eq;

use asym_fit::app::pipeline::run_fit;
use asym_fit::data::{SampleSpec, generate_rows, write_table};
use asym_fit::domain::{ChartStyle, FitConfig, FitDomain};
use asym_fit::error::{AppError, FitError};
use asym_fit::io::{read_fit_json, write_fit_json, fit_file};

fn config(input: &Path, out_dir: &Path) -> FitConfig {
    FitConfig {
        input: input.to_path_buf(),
        delimiter: b',',
        domain: None,
        max_iter: 200,
        out_dir: out_dir.to_path_buf(),
        suffix: "_itest".to_string(),
        chart: Some(ChartStyle::default()),
        ascii: false,
        ascii_width: 60,
        ascii_height: 15,
        export_residuals: None,
        export_fit: None,
    }
}

fn synthetic_table(path: &Path, spec: &SampleSpec) {
    let rows = generate_rows(spec).unwrap();
    write_table(path, &rows).unwrap();
}

#[test]
fn generated_table_fits_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("fit_data.csv");
    let spec = SampleSpec {
        rows: 30,
        noise: 1.0,
        ..SampleSpec::default()
    };
    synthetic_table(&input, &spec);

    let out_dir = dir.path().join("pic").join("fit");
    let run = run_fit(&config(&input, &out_dir)).unwrap();

    assert_eq!(run.table.rows.len(), 30);
    assert_eq!(run.points.len(), 150);
    assert_eq!(run.residuals.len(), 150);

    let values = run.fit.result.values();
    assert_relative_eq!(values[0], spec.params[0], max_relative = 0.1);
    assert_relative_eq!(values[1], spec.params[1], max_relative = 0.1);
    assert_relative_eq!(values[2], spec.params[2], max_relative = 0.2);
    assert!(run.fit.result.params.iter().all(|p| p.error > 0.0));
    assert_eq!(run.fit.result.ndf, run.fit.result.n_points - 3);

    let chart = out_dir.join("fit_itest.svg");
    assert_eq!(run.chart_path.as_deref(), Some(chart.as_path()));
    assert!(fs::read_to_string(&chart).unwrap().contains("<svg"));
}

#[test]
fn short_rows_are_skipped_and_counted() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("mixed.csv");
    let rows = generate_rows(&SampleSpec {
        rows: 4,
        ..SampleSpec::default()
    })
    .unwrap();

    let mut text = String::new();
    for (i, row) in rows.iter().enumerate() {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        text.push_str(&cells.join(","));
        text.push('\n');
        if i == 1 {
            text.push_str("1,2,3\n");
        }
    }
    fs::write(&input, text).unwrap();

    let mut cfg = config(&input, dir.path());
    cfg.chart = None;
    let run = run_fit(&cfg).unwrap();

    assert_eq!(run.table.lines_read, 5);
    assert_eq!(run.table.rows.len(), 4);
    assert_eq!(run.table.short_rows.len(), 1);
    assert_eq!(run.table.short_rows[0].line, 3);
    assert_eq!(run.table.short_rows[0].columns, 3);
    assert!(run.chart_path.is_none());
}

#[test]
fn repeated_runs_are_identical() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("fit_data.csv");
    synthetic_table(&input, &SampleSpec::default());

    let mut cfg = config(&input, dir.path());
    cfg.chart = None;
    let a = run_fit(&cfg).unwrap();
    let b = run_fit(&cfg).unwrap();
    assert_eq!(a.fit.result, b.fit.result);
}

#[test]
fn narrowed_domain_changes_selection() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("fit_data.csv");
    synthetic_table(&input, &SampleSpec::default());

    let mut cfg = config(&input, dir.path());
    cfg.chart = None;
    let full = run_fit(&cfg).unwrap();

    cfg.domain = Some(FitDomain::new(20.0, 70.0));
    let narrow = run_fit(&cfg).unwrap();

    assert!(narrow.fit.result.n_points < full.fit.result.n_points);
    assert_eq!(narrow.fit.result.domain, FitDomain::new(20.0, 70.0));
    assert!(
        narrow
            .residuals
            .iter()
            .filter(|r| r.used)
            .all(|r| (20.0..=70.0).contains(&r.point.x))
    );
}

#[test]
fn missing_input_maps_to_exit_code_2() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(&dir.path().join("nope.csv"), dir.path());

    let err = run_fit(&cfg).unwrap_err();
    assert!(matches!(err, FitError::Io { .. }));
    assert_eq!(AppError::from(err).exit_code(), 2);
}

#[test]
fn empty_input_is_an_empty_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("empty.csv");
    fs::write(&input, "").unwrap();

    let mut cfg = config(&input, dir.path());
    cfg.chart = None;
    let err = run_fit(&cfg).unwrap_err();
    assert!(matches!(err, FitError::EmptyDataset));
    assert_eq!(AppError::from(err).exit_code(), 3);
}

#[test]
fn saved_fit_round_trips_through_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("fit_data.csv");
    synthetic_table(&input, &SampleSpec::default());

    let mut cfg = config(&input, dir.path());
    cfg.chart = None;
    let run = run_fit(&cfg).unwrap();

    let path = dir.path().join("fit.json");
    write_fit_json(&path, &fit_file(&run.model, &run.fit.result, &input)).unwrap();
    let loaded = read_fit_json(&path).unwrap();

    assert_eq!(loaded.result, run.fit.result);
    assert_eq!(loaded.model, "cos-power");
}
