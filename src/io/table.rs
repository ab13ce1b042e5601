//! Delimited-text table parsing.
//!
//! Turns raw input lines into numeric rows:
//! - a line is split on the delimiter; one empty trailing field (a line ending
//!   in the delimiter) is not a cell
//! - every cell is converted from its longest numeric prefix (`"12abc"` is 12);
//!   a cell with no numeric prefix becomes `0.0`
//! - a line with fewer than [`MIN_COLUMNS`] cells is skipped and reported
//!
//! Cells are handled as bytes, so non-UTF-8 content only affects the cell it
//! sits in. The `0.0` substitution keeps compatibility with existing data
//! files. It does conflate "missing" with "measured zero", so substitutions are
//! counted per row and logged at debug level.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use log::{debug, warn};

use crate::domain::RawRow;
use crate::error::FitError;
use crate::io::expand::MIN_COLUMNS;

/// A line rejected for having too few cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortRow {
    pub line: u64,
    pub columns: usize,
}

/// Parser output: accepted rows plus per-line diagnostics.
#[derive(Debug, Clone, Default)]
pub struct ParsedTable {
    pub rows: Vec<RawRow>,
    pub short_rows: Vec<ShortRow>,
    pub lines_read: usize,
}

impl ParsedTable {
    pub fn substituted_cells(&self) -> usize {
        self.rows.iter().map(|r| r.substituted).sum()
    }
}

/// Open and parse a table file.
pub fn read_table(path: &Path, delimiter: u8) -> Result<ParsedTable, FitError> {
    let file = File::open(path).map_err(|e| FitError::io("open input", path, e))?;
    parse_table(file, delimiter)
}

/// Parse a table from any reader.
///
/// Quoting is disabled: cells are split on the delimiter only. Blank lines
/// carry no record and are skipped silently.
pub fn parse_table<R: Read>(reader: R, delimiter: u8) -> Result<ParsedTable, FitError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .delimiter(delimiter)
        .from_reader(reader);

    let mut table = ParsedTable::default();

    for (idx, result) in reader.byte_records().enumerate() {
        let record = result?;
        let line = record
            .position()
            .map(|p| p.line())
            .unwrap_or(idx as u64 + 1);
        table.lines_read += 1;

        let mut fields: Vec<&[u8]> = record.iter().collect();
        if fields.last().is_some_and(|f| f.is_empty()) {
            fields.pop();
        }

        let mut substituted = 0usize;
        let cells: Vec<f64> = fields
            .iter()
            .map(|cell| {
                parse_cell(cell).unwrap_or_else(|| {
                    substituted += 1;
                    0.0
                })
            })
            .collect();

        if cells.len() < MIN_COLUMNS {
            warn!(
                "line {line}: unexpected columns ({}), need at least {MIN_COLUMNS}; row skipped",
                cells.len()
            );
            table.short_rows.push(ShortRow {
                line,
                columns: cells.len(),
            });
            continue;
        }

        if substituted > 0 {
            debug!("line {line}: {substituted} unparsable cell(s) read as 0.0");
        }

        table.rows.push(RawRow {
            line,
            cells,
            substituted,
        });
    }

    Ok(table)
}

/// Convert a cell from its longest numeric prefix, after leading whitespace.
///
/// Accepts decimal and hexadecimal (`0x1.8p3`) notation plus `inf`, `infinity`
/// and `nan` in any case. `None` means there is no numeric prefix, or the
/// value overflows (or underflows) `f64`.
pub fn parse_cell(cell: &[u8]) -> Option<f64> {
    let start = cell
        .iter()
        .position(|b| !matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c))?;
    let s = &cell[start..];

    let (negative, body) = match s.first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let sign = if negative { -1.0 } else { 1.0 };

    if let Some(special) = special_value(body) {
        return Some(sign * special);
    }
    if let Some((v, nonzero)) = hex_prefix(body) {
        return in_range(v, nonzero).map(|v| sign * v);
    }

    let len = decimal_prefix_len(body);
    if len == 0 {
        return None;
    }
    let text = std::str::from_utf8(&body[..len]).ok()?;
    let v: f64 = text.parse().ok()?;
    let nonzero = body[..len]
        .iter()
        .take_while(|b| !matches!(b, b'e' | b'E'))
        .any(|b| matches!(b, b'1'..=b'9'));
    in_range(v, nonzero).map(|v| sign * v)
}

/// Overflow and underflow count as conversion failures.
fn in_range(v: f64, nonzero_digits: bool) -> Option<f64> {
    if v.is_infinite() || (nonzero_digits && (v == 0.0 || v.is_subnormal())) {
        None
    } else {
        Some(v)
    }
}

fn special_value(body: &[u8]) -> Option<f64> {
    let starts = |word: &[u8]| body.len() >= word.len() && body[..word.len()].eq_ignore_ascii_case(word);
    if starts(b"inf") {
        Some(f64::INFINITY)
    } else if starts(b"nan") {
        Some(f64::NAN)
    } else {
        None
    }
}

/// Length of the `digits [. digits] [e [sign] digits]` prefix (0 if none).
fn decimal_prefix_len(body: &[u8]) -> usize {
    let digits = |from: usize| body[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let int = digits(0);
    let mut i = int;
    let mut frac = 0;
    if body.get(i) == Some(&b'.') {
        frac = digits(i + 1);
        i += 1 + frac;
    }
    if int + frac == 0 {
        return 0;
    }

    if matches!(body.get(i), Some(b'e' | b'E')) {
        let mut j = i + 1;
        if matches!(body.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp = digits(j);
        if exp > 0 {
            i = j + exp;
        }
    }
    i
}

/// Value of a `0x` hexadecimal-float prefix, if the cell starts with one,
/// and whether its mantissa is nonzero.
fn hex_prefix(body: &[u8]) -> Option<(f64, bool)> {
    if body.len() < 3 || body[0] != b'0' || !matches!(body[1], b'x' | b'X') {
        return None;
    }
    let rest = &body[2..];

    let mut mantissa = 0.0f64;
    let mut scale = 0i32;
    let mut any = false;
    let mut i = 0;
    let mut seen_point = false;
    while let Some(&b) = rest.get(i) {
        if b == b'.' && !seen_point {
            seen_point = true;
        } else if let Some(d) = (b as char).to_digit(16) {
            mantissa = mantissa * 16.0 + d as f64;
            if seen_point {
                scale -= 4;
            }
            any = true;
        } else {
            break;
        }
        i += 1;
    }
    // "0x" without hex digits converts as the plain "0".
    if !any {
        return Some((0.0, false));
    }

    if matches!(rest.get(i), Some(b'p' | b'P')) {
        let mut j = i + 1;
        let negative = rest.get(j) == Some(&b'-');
        if matches!(rest.get(j), Some(b'+' | b'-')) {
            j += 1;
        }
        let exp_digits = &rest[j..];
        let n = exp_digits.iter().take_while(|b| b.is_ascii_digit()).count();
        if n > 0 {
            let exp: i32 = std::str::from_utf8(&exp_digits[..n])
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(i32::MAX);
            scale = scale.saturating_add(if negative { -exp } else { exp });
        }
    }

    Some((mantissa * 2f64.powi(scale), mantissa != 0.0))
}
