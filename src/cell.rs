// src/cell.rs

use std::fmt;

/// A single spreadsheet cell as read from a workbook. Values are loosely typed:
/// numbers may arrive as text and blanks come in several shapes.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    /// Empty, or text that is only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Number(v) => v.is_nan(),
            Cell::Text(s) => s.trim().is_empty(),
        }
    }

    /// Strict parse: `Some` only if the cell holds a finite number or numeric text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) if v.is_finite() => Some(*v),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Safe numeric coercion. Anything that is not a finite number becomes 0.
    pub fn to_f64(&self) -> f64 {
        self.as_number().unwrap_or(0.0)
    }
}

/// Coerce an optional cell (a missing column counts as missing) to a number.
pub fn safe_number(cell: Option<&Cell>) -> f64 {
    cell.map(Cell::to_f64).unwrap_or(0.0)
}

/// Drops float noise left behind by subtracting or summing fractional stats
/// such as innings pitched.
pub fn tidy(v: f64) -> f64 {
    let t = (v * 1e6).round() / 1e6;
    if t == 0.0 {
        0.0
    } else {
        t
    }
}

/// Round to `places` decimals, ties to even (`0.3125` -> `0.312`).
pub fn round_to(v: f64, places: usize) -> f64 {
    let m = 10f64.powi(places as i32);
    let r = (v * m).round_ties_even() / m;
    if r.is_finite() {
        r
    } else {
        0.0
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Empty => Ok(()),
            Cell::Number(v) if !v.is_finite() => Ok(()),
            Cell::Number(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", *v as i64),
            Cell::Number(v) => write!(f, "{}", v),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}
