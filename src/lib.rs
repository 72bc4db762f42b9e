//! # sheetsync
//!
//! Publishes remote spreadsheet ranges as relational tables in DuckDB. A
//! connection address names one or more documents and a target schema; the
//! connector infers each table's shape from the sheet header, extracts typed
//! rows, and republishes the table atomically whenever the document changes
//! upstream.
//!
//! ## Features
//!
//! - **Address grammar**: one address names several documents sharing a target
//!   schema, with percent-encoded ranges and exact-duplicate collapsing
//! - **Schema inference**: column names from the header row, column types from
//!   a probe data row, with format hints taking precedence over values
//! - **Typed extraction**: serial day-counts become calendar dates and
//!   timestamps; blank cells become SQL NULLs
//! - **Change detection**: an opaque per-document revision marker decides
//!   whether a reload rebuilds or keeps the current table
//! - **Atomic republish**: tables are built under a staging name and promoted
//!   by a rename sequence, so readers never observe a partial table
//!
//! The network side stays outside the crate: implementors provide the
//! [`sheet::GridSource`] and [`sheet::RevisionSource`] capability contracts,
//! which keeps the core deterministic and testable.
pub mod connector;
pub mod database;
pub mod error;
pub mod sheet;

pub use crate::connector::address::{Address, AddressError, Document};
pub use crate::connector::{Connector, ReloadError};
pub use crate::database::column::{Column, ColumnType};
pub use crate::database::loader::DatabaseLoader;
pub use crate::database::table::Table;
pub use crate::database::value::{Row, Value};
pub use crate::error::SheetSyncError;
pub use crate::sheet::{GridSource, Revision, RevisionSource, RowData, Sheet, SourceError};
