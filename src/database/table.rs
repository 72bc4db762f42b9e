use crate::database::column::Column;

/// Represents one published table: the target schema, the table name taken
/// from the sheet title, and the header-ordered column list.
#[derive(Clone, Debug, PartialEq)]
pub struct Table {
    /// Target schema (namespace) in the backing database
    pub schema: String,
    /// Table name (the sheet title, verbatim)
    pub name: String,
    /// Columns in header left-to-right order; duplicate names are kept as-is
    pub columns: Vec<Column>,
}
