//! Destination catalog access
//!
//! The reconciler only needs two operations from the catalog: a name
//! search and a create. `CatalogClient` abstracts them so the CKAN HTTP
//! client, the dry-run decorator and test doubles are interchangeable.
//!
//! # Architecture
//!
//! ```text
//! Reconciler
//!     │
//!     ▼
//! dyn CatalogClient
//!     ├── CkanClient      ← CKAN action API over HTTP
//!     └── DryRunCatalog   ← wraps another client, never writes
//! ```

mod ckan;
mod dry_run;
mod types;

pub use ckan::{CkanClient, DEFAULT_CATALOG_URL};
pub use dry_run::DryRunCatalog;
pub use types::{
    CatalogEntryDraft, CatalogSearchResult, ExistingEntry, Extra, PackagePayload, Resource,
    REGISTER_MARKER_KEY, REGISTER_MARKER_VALUE,
};

use async_trait::async_trait;

use crate::error::CatalogError;

/// Result of a create call that reached the catalog.
///
/// A reserved name is an expected answer, not an error: the slug may belong
/// to a deleted dataset that search no longer shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateStatus {
    Created,
    NameReserved { message: String },
}

/// Trait for destination catalogs
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Find entries sharing `name`. Must not mutate catalog state.
    async fn search(&self, name: &str) -> Result<CatalogSearchResult, CatalogError>;

    /// Create a new entry from `draft`
    async fn create(&self, draft: &CatalogEntryDraft) -> Result<CreateStatus, CatalogError>;

    /// Backend identifier for logging
    fn name(&self) -> &'static str;
}
