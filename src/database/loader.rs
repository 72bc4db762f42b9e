use crate::database::table::Table;
use crate::database::value;
use crate::database::value::Row;
use duckdb::params;
use duckdb::params_from_iter;
use duckdb::Connection;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Instant;
use tracing::debug;

/// Suffix of the staging table built during a reload.
const STAGING_SUFFIX: &str = "_staging";
/// Suffix of the transient table holding the previous generation mid-swap.
const RETIRED_SUFFIX: &str = "_old";

/// Loads freshly extracted tables into DuckDB and makes them visible through a
/// two-phase staging/swap protocol.
///
/// The stage phase builds the table under a staging name, so build latency
/// never affects visibility. The swap phase is a rename sequence serialized
/// per physical table; a reader always sees either the previous generation or
/// the new one, never an empty or half-written table.
pub struct DatabaseLoader {
    connection: Connection,
    /// One lock per qualified table name; swaps of the same table never interleave
    swap_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl DatabaseLoader {
    /// Creates a loader around an existing DuckDB connection.
    pub fn new(connection: Connection) -> Self {
        Self {
            connection,
            swap_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Opens a loader backed by a fresh in-memory database.
    pub fn in_memory() -> Result<Self, duckdb::Error> {
        Ok(Self::new(Connection::open_in_memory()?))
    }

    /// The live connection to the backing database.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Stage phase: ensure the target schema exists, rebuild the staging table
    /// with the table's column layout, and fill it with one parameterized
    /// insert per row.
    pub fn stage(&self, table: &Table, rows: &[Row]) -> Result<(), duckdb::Error> {
        self.execute(&create_schema_statement(table))?;
        self.execute(&drop_statement(table, STAGING_SUFFIX))?;
        self.execute(&create_statement(table, STAGING_SUFFIX))?;

        let insert = insert_statement(table, STAGING_SUFFIX);
        let mut statement = self.connection.prepare(&insert)?;
        for row in rows {
            statement.execute(params_from_iter(row.iter().map(value::to_sql)))?;
        }
        debug!(table = %table.name, rows = rows.len(), "staged table");
        Ok(())
    }

    /// Swap phase: retire the current permanent table if there is one, promote
    /// the staging table to the permanent name, then drop the retired table.
    pub fn swap(&self, table: &Table) -> Result<(), duckdb::Error> {
        let lock = self.swap_lock(table);
        let _guard = lock.lock().expect("swap lock poisoned");

        if self.table_exists(&table.schema, &table.name)? {
            self.execute(&rename_statement(table, "", RETIRED_SUFFIX))?;
        }
        self.execute(&rename_statement(table, STAGING_SUFFIX, ""))?;
        self.execute(&drop_statement(table, RETIRED_SUFFIX))?;
        debug!(table = %table.name, "swapped table");
        Ok(())
    }

    fn table_exists(&self, schema: &str, name: &str) -> Result<bool, duckdb::Error> {
        let mut statement = self.connection.prepare(
            "SELECT count(*) FROM information_schema.tables \
             WHERE table_schema = ? AND table_name = ?",
        )?;
        let count: i64 = statement.query_row(params![schema, name], |row| row.get(0))?;
        Ok(count > 0)
    }

    fn swap_lock(&self, table: &Table) -> Arc<Mutex<()>> {
        let mut locks = self.swap_locks.lock().expect("swap lock registry poisoned");
        locks.entry(qualified_name(table, "")).or_default().clone()
    }

    fn execute(&self, sql: &str) -> Result<usize, duckdb::Error> {
        let start = Instant::now();
        let count = self.connection.execute(sql, [])?;
        debug!(elapsed_ms = start.elapsed().as_millis() as u64, "executed SQL: {sql}");
        Ok(count)
    }
}

/// Doubles embedded quotes so upstream-controlled names cannot break out of a
/// quoted identifier.
fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn qualified_name(table: &Table, suffix: &str) -> String {
    format!(
        "{}.{}",
        quote(&table.schema),
        quote(&format!("{}{}", table.name, suffix)),
    )
}

fn create_schema_statement(table: &Table) -> String {
    format!("CREATE SCHEMA IF NOT EXISTS {}", quote(&table.schema))
}

fn drop_statement(table: &Table, suffix: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", qualified_name(table, suffix))
}

fn create_statement(table: &Table, suffix: &str) -> String {
    let columns = table
        .columns
        .iter()
        .map(|column| format!("{} {}", quote(&column.name), column.kind.as_sql()))
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({})", qualified_name(table, suffix), columns)
}

fn rename_statement(table: &Table, from_suffix: &str, to_suffix: &str) -> String {
    format!(
        "ALTER TABLE {} RENAME TO {}",
        qualified_name(table, from_suffix),
        quote(&format!("{}{}", table.name, to_suffix)),
    )
}

fn insert_statement(table: &Table, suffix: &str) -> String {
    let columns = table
        .columns
        .iter()
        .map(|column| quote(&column.name))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; table.columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        qualified_name(table, suffix),
        columns,
        placeholders,
    )
}
