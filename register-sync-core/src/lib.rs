//! register-sync library exports
//!
//! Mirrors registers listed in the register register into a CKAN
//! dataset catalog, one catalog entry per register.
//!
//! # Architecture
//!
//! ```text
//! register register (records.json)
//!     │
//!     ▼
//! RegisterFetcher ──► SourceRecords (single pass, filtered by phase)
//!                            │
//!                            ▼
//!                     RecordTransformer ──► CatalogEntryDraft
//!                            │
//!                            ▼
//!                        Reconciler ──► CatalogClient (search / create)
//!                            │
//!                            ▼
//!                        SyncReport
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod source;
pub mod sync;
pub mod transform;

pub use catalog::{
    CatalogClient, CatalogEntryDraft, CatalogSearchResult, CkanClient, CreateStatus,
    DryRunCatalog, ExistingEntry, Extra, Resource,
};
pub use config::SyncConfig;
pub use error::{CatalogError, FetchError, ReconcileError, TransformError};
pub use reconcile::{Outcome, Reconciler, SkipReason, DEFAULT_MAX_RENAMES};
pub use source::{RegisterFetcher, SourceRecord, SourceRecords};
pub use sync::{RecordReport, RecordResult, SyncReport, SyncSummary, Synchronizer};
pub use transform::{OrganisationMap, RecordTransformer};
