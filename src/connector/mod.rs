//! # Connector Module
//!
//! This module orchestrates the life of a connection: it parses connection
//! addresses, tracks the last-applied revision of every document, and drives
//! the fetch, infer, extract, stage, swap pipeline whenever a document is new
//! or has changed upstream.
use crate::connector::address::Address;
use crate::connector::address::Document;
use crate::database::loader::DatabaseLoader;
use crate::error::SheetSyncError;
use crate::sheet::extract::extract_rows;
use crate::sheet::extract::infer_table;
use crate::sheet::GridSource;
use crate::sheet::Revision;
use crate::sheet::RevisionSource;
use duckdb::Connection;
use std::collections::HashMap;
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;
use tracing::info;

pub mod address;

/// A reload failure, tagged with the document whose pipeline failed.
///
/// Documents swapped earlier in the same batch stay visible and keep their
/// updated revision entries; documents after the failing one were not touched.
#[derive(Error, Debug)]
#[error("Reload of document '{}' failed: {source}", document.id)]
pub struct ReloadError {
    pub document: Document,
    pub source: SheetSyncError,
}

/// Last-applied revision per document. Entries are written only after a
/// successful stage and swap, and live as long as the owning connector;
/// nothing is ever evicted.
#[derive(Debug, Default)]
struct RevisionCache {
    entries: HashMap<Document, Revision>,
}

impl RevisionCache {
    fn is_current(&self, document: &Document, revision: &Revision) -> bool {
        self.entries.get(document) == Some(revision)
    }

    fn update(&mut self, document: Document, revision: Revision) {
        self.entries.insert(document, revision);
    }
}

/// Everything the batch lock protects: the backing store and the revision cache.
struct ConnectorState {
    loader: DatabaseLoader,
    revisions: RevisionCache,
}

/// Publishes spreadsheet documents as relational tables and keeps them current.
///
/// One connector owns one backing database and one revision cache. Reload
/// batches from independent callers serialize on a single coarse lock held for
/// the whole batch. The swap inside [`DatabaseLoader`] additionally serializes
/// per physical table.
pub struct Connector<S> {
    source: S,
    state: Mutex<ConnectorState>,
}

impl<S: GridSource + RevisionSource> Connector<S> {
    /// Creates a connector around a document source and a backing loader.
    pub fn new(source: S, loader: DatabaseLoader) -> Self {
        Self {
            source,
            state: Mutex::new(ConnectorState {
                loader,
                revisions: RevisionCache::default(),
            }),
        }
    }

    /// Reloads every document named by the address, in order.
    ///
    /// The current revision is fetched for each document; the build pipeline
    /// runs only when the revision is unknown or differs from the cached one.
    /// The first failure aborts the batch and is returned tagged with the
    /// failing document.
    pub fn reload(&self, address: &Address) -> Result<(), ReloadError> {
        let mut state = self.state.lock().expect("connector state lock poisoned");
        for document in &address.documents {
            self.reload_document(&mut state, document)
                .map_err(|source| ReloadError {
                    document: document.clone(),
                    source,
                })?;
        }
        Ok(())
    }

    fn reload_document(
        &self,
        state: &mut ConnectorState,
        document: &Document,
    ) -> Result<(), SheetSyncError> {
        let revision = self.source.fetch_revision(&document.id)?;
        if state.revisions.is_current(document, &revision) {
            debug!(document = %document.id, "document unchanged, keeping current table");
            return Ok(());
        }

        let sheet = self.source.fetch_grid(&document.id, &document.range)?;
        let table = infer_table(&sheet, &document.schema)?;
        let rows = extract_rows(&table, &sheet)?;
        state.loader.stage(&table, &rows)?;
        state.loader.swap(&table)?;
        state.revisions.update(document.clone(), revision);
        info!(document = %document.id, table = %table.name, rows = rows.len(), "published table");
        Ok(())
    }

    /// Runs a closure against the live backing connection, under the same
    /// lock that reload batches hold.
    pub fn with_store<T>(&self, action: impl FnOnce(&Connection) -> T) -> T {
        let state = self.state.lock().expect("connector state lock poisoned");
        action(state.loader.connection())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::cell::{CellData, ExtendedValue};
    use crate::sheet::{RowData, Sheet, SourceError};
    use std::cell::Cell;
    use std::cell::RefCell;
    use std::collections::HashSet;

    struct FakeSource {
        sheets: HashMap<String, Sheet>,
        revisions: RefCell<HashMap<String, String>>,
        broken: HashSet<String>,
        grid_calls: RefCell<HashMap<String, usize>>,
        revision_calls: Cell<usize>,
    }

    impl FakeSource {
        fn new() -> Self {
            Self {
                sheets: HashMap::new(),
                revisions: RefCell::new(HashMap::new()),
                broken: HashSet::new(),
                grid_calls: RefCell::new(HashMap::new()),
                revision_calls: Cell::new(0),
            }
        }

        fn with_sheet(mut self, document_id: &str, sheet: Sheet) -> Self {
            self.sheets.insert(document_id.to_owned(), sheet);
            self
        }

        fn with_broken(mut self, document_id: &str) -> Self {
            self.broken.insert(document_id.to_owned());
            self
        }

        fn set_revision(&self, document_id: &str, revision: &str) {
            self.revisions
                .borrow_mut()
                .insert(document_id.to_owned(), revision.to_owned());
        }

        fn grid_calls(&self, document_id: &str) -> usize {
            self.grid_calls
                .borrow()
                .get(document_id)
                .copied()
                .unwrap_or(0)
        }
    }

    impl GridSource for FakeSource {
        fn fetch_grid(&self, document_id: &str, _range: &str) -> Result<Sheet, SourceError> {
            *self
                .grid_calls
                .borrow_mut()
                .entry(document_id.to_owned())
                .or_insert(0) += 1;
            if self.broken.contains(document_id) {
                return Err(SourceError::Grid {
                    document_id: document_id.to_owned(),
                    message: "server returned no sheets".to_owned(),
                });
            }
            self.sheets
                .get(document_id)
                .cloned()
                .ok_or_else(|| SourceError::Grid {
                    document_id: document_id.to_owned(),
                    message: "unknown document".to_owned(),
                })
        }
    }

    impl RevisionSource for FakeSource {
        fn fetch_revision(&self, document_id: &str) -> Result<Revision, SourceError> {
            self.revision_calls.set(self.revision_calls.get() + 1);
            Ok(Revision(
                self.revisions
                    .borrow()
                    .get(document_id)
                    .cloned()
                    .unwrap_or_else(|| "rev-1".to_owned()),
            ))
        }
    }

    fn text(value: &str) -> CellData {
        CellData {
            effective_value: Some(ExtendedValue {
                string_value: Some(value.to_owned()),
                ..ExtendedValue::default()
            }),
            effective_format: None,
        }
    }

    fn number(value: f64) -> CellData {
        CellData {
            effective_value: Some(ExtendedValue {
                number_value: Some(value),
                ..ExtendedValue::default()
            }),
            effective_format: None,
        }
    }

    fn sheet(title: &str, salaries: &[f64]) -> Sheet {
        let mut row_data = vec![RowData {
            values: vec![text("Name"), text("Salary")],
        }];
        for (index, salary) in salaries.iter().enumerate() {
            row_data.push(RowData {
                values: vec![text(&format!("employee-{index}")), number(*salary)],
            });
        }
        Sheet {
            title: title.to_owned(),
            row_data,
        }
    }

    fn document(id: &str) -> Document {
        Document {
            id: id.to_owned(),
            range: "Sheet1!A1:B10".to_owned(),
            schema: "hr".to_owned(),
        }
    }

    fn table_rows(connector: &Connector<FakeSource>, table: &str) -> i64 {
        connector.with_store(|connection| {
            connection
                .query_row(&format!("SELECT count(*) FROM \"hr\".\"{table}\""), [], |row| {
                    row.get(0)
                })
                .unwrap()
        })
    }

    #[test]
    fn unchanged_documents_are_built_at_most_once() {
        let source = FakeSource::new().with_sheet("docId", sheet("Employees", &[400000.0]));
        let connector = Connector::new(source, DatabaseLoader::in_memory().unwrap());
        let address = Address {
            documents: vec![document("docId")],
        };

        connector.reload(&address).unwrap();
        connector.reload(&address).unwrap();

        // The revision is checked on every call, the pipeline ran only once.
        assert_eq!(connector.source.revision_calls.get(), 2);
        assert_eq!(connector.source.grid_calls("docId"), 1);
        assert_eq!(table_rows(&connector, "Employees"), 1);
    }

    #[test]
    fn revision_change_triggers_a_rebuild() {
        let source = FakeSource::new().with_sheet("docId", sheet("Employees", &[1.0, 2.0]));
        let connector = Connector::new(source, DatabaseLoader::in_memory().unwrap());
        let address = Address {
            documents: vec![document("docId")],
        };

        connector.reload(&address).unwrap();
        connector.source.set_revision("docId", "rev-2");
        connector.reload(&address).unwrap();

        assert_eq!(connector.source.grid_calls("docId"), 2);
        assert_eq!(table_rows(&connector, "Employees"), 2);
    }

    #[test]
    fn batch_aborts_at_the_first_failing_document() {
        let source = FakeSource::new()
            .with_sheet("good", sheet("Teams", &[10.0]))
            .with_broken("bad")
            .with_sheet("tail", sheet("Offices", &[20.0]));
        let connector = Connector::new(source, DatabaseLoader::in_memory().unwrap());
        let address = Address {
            documents: vec![document("good"), document("bad"), document("tail")],
        };

        let error = connector.reload(&address).unwrap_err();
        assert_eq!(error.document.id, "bad");
        assert!(matches!(error.source, SheetSyncError::SourceError(_)));

        // The document before the failure is published and cached; the one
        // after it was never touched.
        assert_eq!(table_rows(&connector, "Teams"), 1);
        assert_eq!(connector.source.grid_calls("tail"), 0);

        let error = connector.reload(&address).unwrap_err();
        assert_eq!(error.document.id, "bad");
        assert_eq!(connector.source.grid_calls("good"), 1);
    }

    #[test]
    fn schema_failures_are_tagged_with_their_document() {
        let empty = Sheet {
            title: "Empty".to_owned(),
            row_data: Vec::new(),
        };
        let source = FakeSource::new().with_sheet("docId", empty);
        let connector = Connector::new(source, DatabaseLoader::in_memory().unwrap());
        let address = Address {
            documents: vec![document("docId")],
        };

        let error = connector.reload(&address).unwrap_err();
        assert_eq!(error.document.id, "docId");
        assert!(matches!(error.source, SheetSyncError::ExtractError(_)));
    }
}
