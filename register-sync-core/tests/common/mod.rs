//! Test helpers shared by the integration tests
//!
//! Provides in-memory catalogs standing in for CKAN.

#![allow(dead_code)]

use async_trait::async_trait;
use register_sync_core::{
    CatalogClient, CatalogEntryDraft, CatalogError, CatalogSearchResult, CreateStatus,
    ExistingEntry, Extra, SourceRecord,
};
use std::collections::HashSet;
use std::sync::{Mutex, Once};

static INIT: Once = Once::new();

/// Initialize logging for tests (only once per test run)
pub fn init_test_logging() {
    INIT.call_once(|| {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let _ = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_level(true),
            )
            .with(tracing_subscriber::filter::EnvFilter::from_default_env())
            .try_init();
    });
}

/// Catalog kept in memory. Search matches on name prefix, like a fuzzy
/// catalog search would.
#[derive(Default)]
pub struct MemoryCatalog {
    entries: Mutex<Vec<ExistingEntry>>,
    /// Names the catalog refuses even though search does not show them
    reserved: HashSet<String>,
    /// Names whose create fails outright
    broken: HashSet<String>,
    /// Names whose search fails outright
    unsearchable: HashSet<String>,
    drafts: Mutex<Vec<CatalogEntryDraft>>,
    searches: Mutex<Vec<String>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reserved(mut self, name: &str) -> Self {
        self.reserved.insert(name.to_string());
        self
    }

    pub fn with_broken(mut self, name: &str) -> Self {
        self.broken.insert(name.to_string());
        self
    }

    pub fn with_search_failure(mut self, name: &str) -> Self {
        self.unsearchable.insert(name.to_string());
        self
    }

    /// Seed an entry that register-sync did not create
    pub fn with_unrelated(self, name: &str) -> Self {
        self.entries.lock().unwrap().push(ExistingEntry {
            name: name.to_string(),
            extras: vec![],
        });
        self
    }

    pub fn entry_names(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.name.clone())
            .collect()
    }

    /// Drafts accepted by `create`, in order
    pub fn created_drafts(&self) -> Vec<CatalogEntryDraft> {
        self.drafts.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<String> {
        self.searches.lock().unwrap().clone()
    }
}

#[async_trait]
impl CatalogClient for MemoryCatalog {
    async fn search(&self, name: &str) -> Result<CatalogSearchResult, CatalogError> {
        self.searches.lock().unwrap().push(name.to_string());
        if self.unsearchable.contains(name) {
            return Err(CatalogError::Status {
                action: "package_search",
                status: 503,
                body: "Service Unavailable".to_string(),
            });
        }

        let matches: Vec<ExistingEntry> = self
            .entries
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.name.starts_with(name))
            .cloned()
            .collect();

        Ok(CatalogSearchResult {
            count: matches.len() as u64,
            matches,
        })
    }

    async fn create(&self, draft: &CatalogEntryDraft) -> Result<CreateStatus, CatalogError> {
        if self.broken.contains(&draft.name) {
            return Err(CatalogError::Status {
                action: "package_create",
                status: 500,
                body: "Internal Server Error".to_string(),
            });
        }
        if self.reserved.contains(&draft.name) {
            return Ok(CreateStatus::NameReserved {
                message: "name: That URL is already in use.".to_string(),
            });
        }

        let extras = draft.to_payload().extras;
        self.entries.lock().unwrap().push(ExistingEntry {
            name: draft.name.clone(),
            extras,
        });
        self.drafts.lock().unwrap().push(draft.clone());
        Ok(CreateStatus::Created)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Catalog that reports fresh unmarked collisions for every name
#[derive(Default)]
pub struct AlwaysCollidingCatalog {
    pub searches: Mutex<usize>,
    pub creates: Mutex<usize>,
}

#[async_trait]
impl CatalogClient for AlwaysCollidingCatalog {
    async fn search(&self, name: &str) -> Result<CatalogSearchResult, CatalogError> {
        *self.searches.lock().unwrap() += 1;
        Ok(CatalogSearchResult {
            count: 1,
            matches: vec![ExistingEntry {
                name: name.to_string(),
                extras: vec![Extra {
                    key: "theme".to_string(),
                    value: "unrelated".to_string(),
                }],
            }],
        })
    }

    async fn create(&self, _draft: &CatalogEntryDraft) -> Result<CreateStatus, CatalogError> {
        *self.creates.lock().unwrap() += 1;
        Ok(CreateStatus::Created)
    }

    fn name(&self) -> &'static str {
        "always-colliding"
    }
}

pub fn source_record(name: &str, phase: &str, registry: &str) -> SourceRecord {
    SourceRecord {
        name: name.to_string(),
        phase: phase.to_string(),
        fields: Some(vec!["name".to_string(), name.to_string()]),
        registry: Some(registry.to_string()),
        text: Some(format!("Authoritative list of {name}")),
    }
}
