//! Error types for the register sync pipeline
//!
//! Each stage has its own error so callers can tell a fatal fetch failure
//! apart from failures that only affect one record.

use thiserror::Error;

/// Failure to read the source index. Fatal for the whole run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Failed to create HTTP client for the register index")]
    Client {
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to fetch register index from {url}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to fetch register index: HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Register index is malformed")]
    Malformed {
        #[source]
        source: serde_json::Error,
    },
}

/// A source record that cannot be turned into a catalog entry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("Register '{record}' is missing required field '{field}'")]
    MissingField { record: String, field: &'static str },
}

/// Failure talking to the destination catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to create HTTP client for the catalog")]
    Client {
        #[source]
        source: reqwest::Error,
    },

    #[error("Catalog request '{action}' failed")]
    Request {
        action: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Catalog action '{action}' returned HTTP {status}: {body}")]
    Status {
        action: &'static str,
        status: u16,
        body: String,
    },

    #[error("Catalog action '{action}' failed with {kind}: {message}")]
    Api {
        action: &'static str,
        kind: String,
        message: String,
    },

    #[error("Catalog action '{action}' returned a malformed response")]
    Malformed {
        action: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Why a single record could not be reconciled.
#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Gave up renaming '{name}' after {attempts} attempts")]
    RenameExhausted { name: String, attempts: u32 },

    #[error("Search for '{name}' failed")]
    Search {
        name: String,
        #[source]
        source: CatalogError,
    },

    #[error("Create of '{name}' failed")]
    Create {
        name: String,
        #[source]
        source: CatalogError,
    },
}

impl ReconcileError {
    /// Short machine-friendly label used in reports
    pub fn kind(&self) -> &'static str {
        match self {
            ReconcileError::RenameExhausted { .. } => "rename_exhausted",
            ReconcileError::Search { .. } => "search_failed",
            ReconcileError::Create { .. } => "create_failed",
        }
    }
}
