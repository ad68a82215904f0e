//! Catalog entry types
//!
//! Drafts are built by the transformer. Search results mirror the subset
//! of a CKAN package that reconciliation needs.

use serde::{Deserialize, Serialize};

/// Extra key marking entries created by register-sync
pub const REGISTER_MARKER_KEY: &str = "register";

/// Extra value marking entries created by register-sync
pub const REGISTER_MARKER_VALUE: &str = "true";

/// A downloadable resource attached to a catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub description: String,
    pub url: String,
    pub format: String,
}

/// A not-yet-persisted catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntryDraft {
    /// Catalog slug (e.g., "country-register")
    pub name: String,

    pub title: String,

    /// Destination organisation identifier
    pub owner_org: String,

    /// Markdown description
    pub notes: String,

    pub resources: Vec<Resource>,

    pub license_id: String,

    /// Provenance marker: entry is managed by register-sync
    pub is_register: bool,
}

impl CatalogEntryDraft {
    /// Copy of this draft under a different name
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    /// Wire payload for `package_create`
    pub fn to_payload(&self) -> PackagePayload<'_> {
        let extras = if self.is_register {
            vec![Extra {
                key: REGISTER_MARKER_KEY.to_string(),
                value: REGISTER_MARKER_VALUE.to_string(),
            }]
        } else {
            Vec::new()
        };

        PackagePayload {
            name: &self.name,
            title: &self.title,
            notes: &self.notes,
            owner_org: &self.owner_org,
            license_id: &self.license_id,
            resources: &self.resources,
            extras,
        }
    }
}

/// JSON body sent to the catalog's create action
#[derive(Debug, Serialize)]
pub struct PackagePayload<'a> {
    pub name: &'a str,
    pub title: &'a str,
    pub notes: &'a str,
    pub owner_org: &'a str,
    pub license_id: &'a str,
    pub resources: &'a [Resource],
    pub extras: Vec<Extra>,
}

/// A key/value metadata extra
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extra {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// An entry already present in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingEntry {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub extras: Vec<Extra>,
}

impl ExistingEntry {
    /// Whether this entry carries the register-sync provenance marker.
    ///
    /// Only the first `register` extra is consulted.
    pub fn is_register(&self) -> bool {
        self.extras
            .iter()
            .find(|e| e.key == REGISTER_MARKER_KEY)
            .is_some_and(|e| e.value == REGISTER_MARKER_VALUE)
    }
}

/// Entries matching a name search
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSearchResult {
    pub count: u64,

    #[serde(rename = "results", default)]
    pub matches: Vec<ExistingEntry>,
}

impl CatalogSearchResult {
    pub fn is_empty(&self) -> bool {
        self.count == 0 && self.matches.is_empty()
    }

    /// Number of entries sharing the name, as reported by the catalog
    pub fn match_count(&self) -> u64 {
        self.count.max(self.matches.len() as u64)
    }

    /// First match carrying the provenance marker
    pub fn managed_entry(&self) -> Option<&ExistingEntry> {
        self.matches.iter().find(|m| m.is_register())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(extras: &[(&str, &str)]) -> ExistingEntry {
        ExistingEntry {
            name: "x-register".to_string(),
            extras: extras
                .iter()
                .map(|(k, v)| Extra {
                    key: k.to_string(),
                    value: v.to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn test_marker_detection() {
        assert!(entry(&[("register", "true")]).is_register());
        assert!(entry(&[("theme", "x"), ("register", "true")]).is_register());
        assert!(!entry(&[]).is_register());
        assert!(!entry(&[("register", "false")]).is_register());
        assert!(!entry(&[("registered", "true")]).is_register());
    }

    #[test]
    fn test_only_first_marker_counts() {
        assert!(!entry(&[("register", "no"), ("register", "true")]).is_register());
    }

    #[test]
    fn test_search_result_from_ckan_json() {
        let json = r#"{
            "count": 2,
            "results": [
                {"name": "x-register", "extras": [{"key": "register", "value": "true"}]},
                {"name": "x-register-old"}
            ]
        }"#;
        let result: CatalogSearchResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.count, 2);
        assert_eq!(result.matches.len(), 2);
        assert_eq!(
            result.managed_entry().map(|e| e.name.as_str()),
            Some("x-register")
        );
    }

    #[test]
    fn test_payload_carries_marker_extra() {
        let draft = CatalogEntryDraft {
            name: "country-register".to_string(),
            title: "Country Register".to_string(),
            owner_org: "government-digital-services".to_string(),
            notes: "Countries".to_string(),
            resources: vec![],
            license_id: "uk-ogl".to_string(),
            is_register: true,
        };

        let payload = serde_json::to_value(draft.to_payload()).unwrap();
        assert_eq!(
            payload,
            serde_json::json!({
                "name": "country-register",
                "title": "Country Register",
                "notes": "Countries",
                "owner_org": "government-digital-services",
                "license_id": "uk-ogl",
                "resources": [],
                "extras": [{"key": "register", "value": "true"}]
            })
        );
    }

    #[test]
    fn test_renamed_keeps_other_fields() {
        let draft = CatalogEntryDraft {
            name: "x-register".to_string(),
            title: "X Register".to_string(),
            owner_org: "org".to_string(),
            notes: "n".to_string(),
            resources: vec![],
            license_id: "uk-ogl".to_string(),
            is_register: true,
        };
        let renamed = draft.renamed("x-register-3");
        assert_eq!(renamed.name, "x-register-3");
        assert_eq!(draft.name, "x-register");
        assert_eq!(renamed.title, draft.title);
        assert_eq!(renamed.is_register, draft.is_register);
    }
}
