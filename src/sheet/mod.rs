//! # Sheet Model Module
//!
//! This module models one fetched sheet the way the upstream service delivers
//! it: a title plus a two-dimensional grid of cells, each cell carrying an
//! optional computed value and an optional number format. It also defines the
//! two capability contracts the connector needs from the outside world,
//! fetching a grid and fetching a document's revision marker, so the core
//! stays free of network and credential concerns.
use crate::sheet::cell::CellData;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

pub mod cell;
pub mod extract;
pub mod serial;

/// Errors reported by the external document source collaborators.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The grid fetch for a document failed
    #[error("Fetching grid for document '{document_id}' failed: {message}")]
    Grid {
        document_id: String,
        message: String,
    },

    /// The revision lookup for a document failed
    #[error("Fetching revision for document '{document_id}' failed: {message}")]
    Revision {
        document_id: String,
        message: String,
    },
}

/// Opaque change marker for a remote document. Two loads of a document are
/// considered identical exactly when their revisions compare equal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision(pub String);

/// One fetched row of cells.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RowData {
    pub values: Vec<CellData>,
}

/// One sheet's grid as returned by the external source for a requested range.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Sheet {
    /// Sheet title, used verbatim as the published table name
    pub title: String,
    /// Cell matrix, header row first
    pub row_data: Vec<RowData>,
}

/// Capability contract: fetch one sheet's grid for a document id and range.
pub trait GridSource {
    fn fetch_grid(&self, document_id: &str, range: &str) -> Result<Sheet, SourceError>;
}

/// Capability contract: fetch a document's current revision marker.
pub trait RevisionSource {
    fn fetch_revision(&self, document_id: &str) -> Result<Revision, SourceError>;
}
