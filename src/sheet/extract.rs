use crate::database::column::Column;
use crate::database::column::ColumnType;
use crate::database::table::Table;
use crate::database::value::Row;
use crate::database::value::Value;
use crate::error::SheetSyncError;
use crate::sheet::cell::CellData;
use crate::sheet::cell::Scalar;
use crate::sheet::serial;
use crate::sheet::Sheet;
use thiserror::Error;

/// Longest sheet title or header cell accepted as an identifier.
const MAX_IDENTIFIER_LENGTH: usize = 256;

/// Errors raised while deriving a table schema from a fetched grid.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Sheet title is missing or longer than 256 characters")]
    InvalidTitle,

    #[error("At least two rows are required to determine a schema, found {found}")]
    InsufficientRows { found: usize },

    #[error("Header cell at column {column} must be a non-empty string of at most 256 characters")]
    InvalidColumnName { column: usize },

    #[error("No header columns found in the first row")]
    NoColumns,

    #[error("Cannot determine a type for column '{name}': probe cell is empty")]
    UnresolvedColumnType { name: String },
}

/// Derives the table schema for one fetched sheet.
///
/// The sheet title becomes the table name and the header row the column list;
/// the row below the header serves as the probe row for type detection.
/// Header scanning stops, without error, at the first header cell that has no
/// effective value. A probe cell with neither a format hint nor a value leaves
/// the column type undecidable and is rejected rather than guessed at.
pub fn infer_table(sheet: &Sheet, schema: &str) -> Result<Table, ExtractError> {
    if sheet.title.is_empty() || sheet.title.chars().count() > MAX_IDENTIFIER_LENGTH {
        return Err(ExtractError::InvalidTitle);
    }
    if sheet.row_data.len() < 2 {
        return Err(ExtractError::InsufficientRows {
            found: sheet.row_data.len(),
        });
    }

    let header = &sheet.row_data[0];
    let probe = &sheet.row_data[1];
    let mut columns = Vec::new();
    for (index, cell) in header.values.iter().enumerate() {
        // The first header cell without a value marks the end of the columns.
        let Some(value) = &cell.effective_value else {
            break;
        };
        let name = match value.string_value.as_deref() {
            Some(name) if !name.is_empty() && name.chars().count() <= MAX_IDENTIFIER_LENGTH => {
                name.to_owned()
            }
            _ => return Err(ExtractError::InvalidColumnName { column: index }),
        };
        let kind = match probe.values.get(index) {
            Some(cell) if cell.number_format().is_some() || cell.effective_value.is_some() => {
                ColumnType::detect(cell)
            }
            _ => return Err(ExtractError::UnresolvedColumnType { name }),
        };
        columns.push(Column { name, kind });
    }

    if columns.is_empty() {
        return Err(ExtractError::NoColumns);
    }
    Ok(Table {
        schema: schema.to_owned(),
        name: sheet.title.to_owned(),
        columns,
    })
}

/// Turns one fetched cell into one typed value for the given column. Empty
/// cells yield `None`; date and date-time columns interpret the numeric
/// payload as a serial day-count.
pub fn extract_value(column: &Column, cell: &CellData) -> Result<Option<Value>, SheetSyncError> {
    let Some(effective) = &cell.effective_value else {
        return Ok(None);
    };
    let scalar = effective.scalar()?;
    let value = match column.kind {
        ColumnType::Date => Value::Date(serial::convert(&scalar)?.date()),
        ColumnType::DateTime => Value::DateTime(serial::convert(&scalar)?),
        _ => match scalar {
            Scalar::Text(text) => Value::Text(text),
            Scalar::Number(number) => Value::Number(number),
            Scalar::Bool(value) => Value::Boolean(value),
        },
    };
    Ok(Some(value))
}

/// Extracts the data block below the header as typed rows.
///
/// The real data is assumed to occupy one contiguous block starting right
/// after the header: extraction ends at the first row with fewer populated
/// cells than the schema has columns, or at the first row whose extracted
/// values are all null. Rows past that boundary are never examined.
pub fn extract_rows(table: &Table, sheet: &Sheet) -> Result<Vec<Row>, SheetSyncError> {
    let mut rows = Vec::new();
    for data in sheet.row_data.iter().skip(1) {
        if data.values.len() < table.columns.len() {
            break;
        }
        let mut row = Row::with_capacity(table.columns.len());
        for (column, cell) in table.columns.iter().zip(&data.values) {
            row.push(extract_value(column, cell)?);
        }
        if row.iter().all(Option::is_none) {
            break;
        }
        rows.push(row);
    }
    Ok(rows)
}
