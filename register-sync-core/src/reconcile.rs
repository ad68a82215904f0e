//! Reconciliation of catalog entry drafts against the destination catalog
//!
//! For each draft the reconciler searches the catalog by name and then:
//!
//! ```text
//! Querying ──► no matches ─────────────► Creating ──► Created
//!    ▲    ├──► marked match ───────────► AlreadySynchronized
//!    │    └──► only unmarked matches ──► Renaming ─┐ (attempts += 1)
//!    └─────────────────────────────────────────────┘
//!
//! Creating ──► Created | Skipped(NameReserved) | Failed
//! Renaming ──► Failed(RenameExhausted) once attempts > max_renames
//! ```
//!
//! Search may match on prefixes and may lag behind recent writes, so an
//! unmarked match can keep reappearing. The rename bound guarantees
//! termination regardless of what the catalog reports.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::catalog::{CatalogClient, CatalogEntryDraft, CreateStatus};
use crate::error::ReconcileError;

/// Default number of renames before giving up on a record
pub const DEFAULT_MAX_RENAMES: u32 = 10;

/// Why a record was skipped without being created
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// The catalog rejected the name even though search did not show it
    NameReserved { name: String, message: String },
}

/// Terminal state of one reconciliation
#[derive(Debug)]
pub enum Outcome {
    Created { name: String },
    AlreadySynchronized { name: String },
    Skipped(SkipReason),
    Failed(ReconcileError),
}

impl Outcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    /// Short label used in reports and logs
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Created { .. } => "created",
            Outcome::AlreadySynchronized { .. } => "already_synchronized",
            Outcome::Skipped(SkipReason::NameReserved { .. }) => "skipped_name_reserved",
            Outcome::Failed(_) => "failed",
        }
    }

    /// Catalog name the outcome refers to
    pub fn name(&self) -> &str {
        match self {
            Outcome::Created { name }
            | Outcome::AlreadySynchronized { name }
            | Outcome::Skipped(SkipReason::NameReserved { name, .. }) => name,
            Outcome::Failed(
                ReconcileError::RenameExhausted { name, .. }
                | ReconcileError::Search { name, .. }
                | ReconcileError::Create { name, .. },
            ) => name,
        }
    }
}

/// Places catalog entry drafts in the catalog without duplicating them
pub struct Reconciler {
    catalog: Arc<dyn CatalogClient>,
    max_renames: u32,
}

impl Reconciler {
    pub fn new(catalog: Arc<dyn CatalogClient>, max_renames: u32) -> Self {
        Self {
            catalog,
            max_renames,
        }
    }

    pub fn max_renames(&self) -> u32 {
        self.max_renames
    }

    pub async fn reconcile(&self, draft: CatalogEntryDraft) -> Outcome {
        let mut current = draft;
        let mut attempts: u32 = 0;

        loop {
            let result = match self.catalog.search(&current.name).await {
                Ok(result) => result,
                Err(source) => {
                    warn!("Search for '{}' failed: {}", current.name, source);
                    return Outcome::Failed(ReconcileError::Search {
                        name: current.name,
                        source,
                    });
                }
            };

            if result.is_empty() {
                return self.create(current).await;
            }

            debug!(
                "'{}' matches {} existing entries, checking for marker",
                current.name,
                result.match_count()
            );

            if let Some(existing) = result.managed_entry() {
                info!(
                    "'{}' already synchronized as '{}'",
                    current.name, existing.name
                );
                return Outcome::AlreadySynchronized {
                    name: existing.name.clone(),
                };
            }

            attempts += 1;
            if attempts > self.max_renames {
                warn!(
                    "'{}' still collides after {} renames, giving up",
                    current.name, self.max_renames
                );
                return Outcome::Failed(ReconcileError::RenameExhausted {
                    name: current.name,
                    attempts,
                });
            }

            let suffix = result.match_count().saturating_add(1);
            let new_name = format!("{}-{}", current.name, suffix);
            info!(
                "'{}' is taken by an unrelated entry, retrying as '{}' (attempt {}/{})",
                current.name, new_name, attempts, self.max_renames
            );
            current = current.renamed(new_name);
        }
    }

    async fn create(&self, draft: CatalogEntryDraft) -> Outcome {
        info!("Creating catalog entry '{}' via {}", draft.name, self.catalog.name());

        match self.catalog.create(&draft).await {
            Ok(CreateStatus::Created) => {
                info!("Created '{}'", draft.name);
                Outcome::Created { name: draft.name }
            }
            Ok(CreateStatus::NameReserved { message }) => {
                info!("'{}' is reserved by the catalog: {}", draft.name, message);
                Outcome::Skipped(SkipReason::NameReserved {
                    name: draft.name,
                    message,
                })
            }
            Err(source) => Outcome::Failed(ReconcileError::Create {
                name: draft.name,
                source,
            }),
        }
    }
}
