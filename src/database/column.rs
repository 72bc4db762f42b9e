use crate::sheet::cell::CellData;
use crate::sheet::cell::NumberFormatKind;

/// Supported column data types for published tables.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColumnType {
    /// Variable-length strings
    String,
    /// Double-precision floating point numbers
    Number,
    /// Boolean values (true/false)
    Boolean,
    /// Date without time component
    Date,
    /// Date and time with microsecond precision
    DateTime,
}

/// Represents a column in a published table with name and data type.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    /// Column name (from the sheet's header row)
    pub name: String,
    /// Column data type
    pub kind: ColumnType,
}

impl ColumnType {
    /// Returns the DuckDB type name used in generated DDL.
    pub const fn as_sql(&self) -> &'static str {
        match self {
            ColumnType::String => "text",
            ColumnType::Number => "double",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::DateTime => "timestamp",
        }
    }

    /// Classifies a probe cell into a column type.
    ///
    /// A number-format hint always wins over the value: a date-typed format
    /// marks the column as `Date`, a date-time-typed format as `DateTime`, and
    /// any other numeric format as `Number`. Only unformatted cells are
    /// classified by their value, with `String` as the fallback.
    pub fn detect(cell: &CellData) -> Self {
        if let Some(kind) = cell.number_format() {
            return match kind {
                NumberFormatKind::Date => ColumnType::Date,
                NumberFormatKind::DateTime => ColumnType::DateTime,
                _ => ColumnType::Number,
            };
        }
        match &cell.effective_value {
            Some(value) if value.bool_value.is_some() => ColumnType::Boolean,
            Some(value) if value.number_value.is_some() => ColumnType::Number,
            _ => ColumnType::String,
        }
    }
}
