//! Dry-run catalog decorator
//!
//! Searches go to the wrapped catalog so reconciliation sees real
//! collisions; creates are logged and reported as successful without
//! touching the catalog.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use super::{CatalogClient, CatalogEntryDraft, CatalogSearchResult, CreateStatus};
use crate::error::CatalogError;

pub struct DryRunCatalog {
    inner: Arc<dyn CatalogClient>,
}

impl DryRunCatalog {
    pub fn new(inner: Arc<dyn CatalogClient>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl CatalogClient for DryRunCatalog {
    async fn search(&self, name: &str) -> Result<CatalogSearchResult, CatalogError> {
        self.inner.search(name).await
    }

    async fn create(&self, draft: &CatalogEntryDraft) -> Result<CreateStatus, CatalogError> {
        info!(
            "dry_run: would create '{}' ({}) owned by '{}' with {} resources",
            draft.name,
            draft.title,
            draft.owner_org,
            draft.resources.len()
        );
        Ok(CreateStatus::Created)
    }

    fn name(&self) -> &'static str {
        "dry-run"
    }
}
