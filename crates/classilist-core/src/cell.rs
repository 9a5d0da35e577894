//! Cell value types

use std::fmt;

/// Represents the value stored at a row/column intersection
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Missing value
    Missing,

    /// Integer value
    Integer(i64),

    /// Floating point value
    Number(f64),

    /// String value
    Text(String),
}

impl Cell {
    /// Create a new text cell
    pub fn text<S: Into<String>>(s: S) -> Self {
        Cell::Text(s.into())
    }

    /// Check if the cell is missing
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Render the value to the text that gets written out.
    ///
    /// Missing cells render as the empty string; writers substitute their
    /// own missing-value pattern before ever calling this.
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Integer(n) => Some(*n as f64),
            Cell::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as a string
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Missing
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Missing => write!(f, ""),
            Cell::Integer(n) => write!(f, "{}", n),
            // Whole floats keep one fractional digit so they stay
            // distinguishable from integers.
            Cell::Number(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{:.1}", n),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i32> for Cell {
    fn from(n: i32) -> Self {
        Cell::Integer(n as i64)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Integer(n)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::text(s)
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Missing, Into::into)
    }
}
