use thiserror::Error;

/// Main error type for the sheetsync crate.
/// Aggregates the failure modes of every module; each variant stays
/// distinguishable so callers can react to the exact failure.
#[derive(Error, Debug)]
pub enum SheetSyncError {
    #[error("{0}")]
    AddressError(#[from] crate::connector::address::AddressError),

    #[error("{0}")]
    CellError(#[from] crate::sheet::cell::CellError),

    #[error("{0}")]
    SerialError(#[from] crate::sheet::serial::SerialError),

    #[error("{0}")]
    ExtractError(#[from] crate::sheet::extract::ExtractError),

    #[error("{0}")]
    SourceError(#[from] crate::sheet::SourceError),

    #[error("{0}")]
    StoreError(#[from] duckdb::Error),
}
