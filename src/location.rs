//! Source location utilities.

use std::fmt;

use saphyr_parser::Span;
use serde::Serialize;

/// Row/column location within the source YAML document (1-indexed).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Location {
    /// 1-indexed row number in the input stream.
    pub(crate) row: u32,
    /// 1-indexed column number in the input stream.
    pub(crate) column: u32,
}

impl Location {
    /// Sentinel value meaning "location unknown".
    ///
    /// Hand-built source trees carry this location.
    pub const UNKNOWN: Self = Self { row: 0, column: 0 };

    /// Create a new location record from 1-indexed coordinates.
    pub const fn new(row: usize, column: usize) -> Self {
        // Error reporting only; documents past 4G lines are not a concern.
        Self {
            row: row as u32,
            column: column as u32,
        }
    }

    /// Line number, 1-indexed.
    pub fn line(&self) -> u64 {
        self.row as u64
    }

    /// Column number, 1-indexed.
    pub fn column(&self) -> u64 {
        self.column as u64
    }

    pub fn is_known(&self) -> bool {
        self.row != 0 && self.column != 0
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "line {}, column {}", self.row, self.column)
        } else {
            f.write_str("unknown location")
        }
    }
}

/// Convert a `saphyr_parser::Span` to a 1-indexed `Location`.
pub(crate) fn location_from_span(span: &Span) -> Location {
    let start = &span.start;
    Location::new(start.line(), start.col() + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_location_is_not_known() {
        assert!(!Location::UNKNOWN.is_known());
        assert_eq!(Location::UNKNOWN.to_string(), "unknown location");
    }

    #[test]
    fn known_location_renders_line_and_column() {
        let loc = Location::new(3, 7);
        assert!(loc.is_known());
        assert_eq!(loc.line(), 3);
        assert_eq!(loc.column(), 7);
        assert_eq!(loc.to_string(), "line 3, column 7");
    }
}
