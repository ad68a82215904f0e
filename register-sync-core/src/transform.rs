//! Register → catalog entry transformation
//!
//! Pure mapping from a `SourceRecord` to a `CatalogEntryDraft`. No I/O.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{CatalogEntryDraft, Resource};
use crate::error::TransformError;
use crate::source::SourceRecord;

/// Default licence for register datasets (Open Government Licence)
pub const DEFAULT_LICENSE_ID: &str = "uk-ogl";

const RESOURCE_FORMATS: [&str; 3] = ["csv", "json", "ttl"];

const REGISTERS_GUIDANCE: &str = "Registers - Registers are lists of information. Each register is the most
reliable list of its kind. If you wish to know more about registers, please
visit the registers guidance at
[https://www.gov.uk/government/publications/registers/registers](https://www.gov.uk/government/publications/registers/registers)";

/// Maps register organisation identifiers to catalog organisation identifiers.
///
/// Identifiers without an entry map to themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrganisationMap {
    renames: BTreeMap<String, String>,
}

impl Default for OrganisationMap {
    fn default() -> Self {
        Self::from_pairs([
            ("foreign-commonwealth-office", "foreign-and-commonwealth-office"),
            ("government-digital-service", "government-digital-services"),
        ])
    }
}

impl OrganisationMap {
    /// An empty map (every identifier maps to itself)
    pub fn identity() -> Self {
        Self {
            renames: BTreeMap::new(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            renames: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Add or replace entries from `other`
    pub fn extend(&mut self, other: OrganisationMap) {
        self.renames.extend(other.renames);
    }

    pub fn lookup<'a>(&'a self, org: &'a str) -> &'a str {
        self.renames.get(org).map(String::as_str).unwrap_or(org)
    }

    pub fn len(&self) -> usize {
        self.renames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }
}

/// Builds catalog entry drafts from registers
#[derive(Debug, Clone)]
pub struct RecordTransformer {
    organisations: OrganisationMap,
    license_id: String,
}

impl Default for RecordTransformer {
    fn default() -> Self {
        Self::new(OrganisationMap::default(), DEFAULT_LICENSE_ID)
    }
}

impl RecordTransformer {
    pub fn new(organisations: OrganisationMap, license_id: impl Into<String>) -> Self {
        Self {
            organisations,
            license_id: license_id.into(),
        }
    }

    pub fn transform(&self, record: &SourceRecord) -> Result<CatalogEntryDraft, TransformError> {
        let missing = |field| TransformError::MissingField {
            record: record.name.clone(),
            field,
        };

        let fields = record.fields.as_ref().ok_or_else(|| missing("fields"))?;
        let registry = record.registry.as_deref().ok_or_else(|| missing("registry"))?;
        let text = record.text.as_deref().ok_or_else(|| missing("text"))?;

        Ok(CatalogEntryDraft {
            name: format!("{}-register", record.name),
            title: register_title(&record.name),
            owner_org: self.organisations.lookup(registry).to_string(),
            notes: register_notes(text, fields),
            resources: register_resources(&record.name),
            license_id: self.license_id.clone(),
            is_register: true,
        })
    }
}

/// Title-case a register name word by word and append " Register".
///
/// A letter starts a word when the previous character is not a letter, so
/// "local-authority-eng" becomes "Local Authority Eng".
pub fn register_title(name: &str) -> String {
    let mut title = String::with_capacity(name.len() + 9);
    let mut prev_is_letter = false;

    for c in name.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                title.extend(c.to_lowercase());
            } else {
                title.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            title.push(if c == '-' { ' ' } else { c });
            prev_is_letter = false;
        }
    }

    title.push_str(" Register");
    title
}

/// Markdown description for a register's catalog entry
pub fn register_notes(text: &str, fields: &[String]) -> String {
    format!(
        "{text}\n\n{REGISTERS_GUIDANCE}\n\nFields in this register - {}",
        fields.join(", ")
    )
    .trim()
    .to_string()
}

/// Home page plus CSV, JSON and TTL downloads for a register
pub fn register_resources(name: &str) -> Vec<Resource> {
    let base_url = format!("https://{name}.register.gov.uk/");

    let mut resources = Vec::with_capacity(RESOURCE_FORMATS.len() + 1);
    resources.push(Resource {
        description: "Register home page".to_string(),
        url: base_url.clone(),
        format: "HTML".to_string(),
    });

    for fmt in RESOURCE_FORMATS {
        let upper = fmt.to_uppercase();
        resources.push(Resource {
            description: format!("Register Entries ({upper})"),
            url: format!("{base_url}records.{fmt}?page-size=5000"),
            format: upper,
        });
    }

    resources
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(name: &str, registry: &str) -> SourceRecord {
        SourceRecord {
            name: name.to_string(),
            phase: "beta".to_string(),
            fields: Some(vec!["name".to_string(), name.to_string()]),
            registry: Some(registry.to_string()),
            text: Some(format!("List of {name}")),
        }
    }

    #[test]
    fn test_default_organisation_renames() {
        let orgs = OrganisationMap::default();
        assert_eq!(
            orgs.lookup("foreign-commonwealth-office"),
            "foreign-and-commonwealth-office"
        );
        assert_eq!(
            orgs.lookup("government-digital-service"),
            "government-digital-services"
        );
        assert_eq!(orgs.lookup("land-registry"), "land-registry");
        assert_eq!(orgs.len(), 2);
        assert!(!orgs.is_empty());
        assert!(OrganisationMap::identity().is_empty());
    }

    #[test]
    fn test_substituted_organisation_map() {
        let orgs = OrganisationMap::from_pairs([("a", "b")]);
        let transformer = RecordTransformer::new(orgs, "cc-by");

        let draft = transformer.transform(&record("x", "a")).unwrap();
        assert_eq!(draft.owner_org, "b");
        assert_eq!(draft.license_id, "cc-by");

        let draft = transformer.transform(&record("x", "government-digital-service")).unwrap();
        assert_eq!(draft.owner_org, "government-digital-service");
    }

    #[test]
    fn test_extend_overrides_existing_entries() {
        let mut orgs = OrganisationMap::default();
        orgs.extend(OrganisationMap::from_pairs([
            ("government-digital-service", "gds"),
            ("hm-land-registry", "land-registry"),
        ]));
        assert_eq!(orgs.lookup("government-digital-service"), "gds");
        assert_eq!(orgs.lookup("hm-land-registry"), "land-registry");
        assert_eq!(orgs.len(), 3);
    }

    #[test]
    fn test_titles() {
        assert_eq!(register_title("country"), "Country Register");
        assert_eq!(
            register_title("local-authority-eng"),
            "Local Authority Eng Register"
        );
        assert_eq!(register_title("school-eng2x"), "School Eng2X Register");
        assert_eq!(register_title("UK"), "Uk Register");
    }

    #[test]
    fn test_resources_for_country() {
        assert_eq!(
            register_resources("country"),
            vec![
                Resource {
                    description: "Register home page".to_string(),
                    url: "https://country.register.gov.uk/".to_string(),
                    format: "HTML".to_string(),
                },
                Resource {
                    description: "Register Entries (CSV)".to_string(),
                    url: "https://country.register.gov.uk/records.csv?page-size=5000".to_string(),
                    format: "CSV".to_string(),
                },
                Resource {
                    description: "Register Entries (JSON)".to_string(),
                    url: "https://country.register.gov.uk/records.json?page-size=5000"
                        .to_string(),
                    format: "JSON".to_string(),
                },
                Resource {
                    description: "Register Entries (TTL)".to_string(),
                    url: "https://country.register.gov.uk/records.ttl?page-size=5000".to_string(),
                    format: "TTL".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_notes() {
        let notes = register_notes(
            "  British English-language names of countries  ",
            &["country".to_string(), "name".to_string()],
        );
        assert!(notes.starts_with("British English-language names of countries\n\nRegisters - "));
        assert!(notes.contains("https://www.gov.uk/government/publications/registers/registers"));
        assert!(notes.ends_with("Fields in this register - country, name"));
    }

    #[test]
    fn test_transform_full_draft() {
        let draft = RecordTransformer::default()
            .transform(&record("country", "government-digital-service"))
            .unwrap();

        assert_eq!(draft.name, "country-register");
        assert_eq!(draft.title, "Country Register");
        assert_eq!(draft.owner_org, "government-digital-services");
        assert_eq!(draft.license_id, DEFAULT_LICENSE_ID);
        assert_eq!(draft.resources.len(), 4);
        assert!(draft.is_register);
    }

    #[test]
    fn test_missing_fields_is_transform_error() {
        let mut broken = record("country", "government-digital-service");
        broken.fields = None;

        let err = RecordTransformer::default().transform(&broken).unwrap_err();
        assert_eq!(
            err,
            TransformError::MissingField {
                record: "country".to_string(),
                field: "fields",
            }
        );
    }

    #[test]
    fn test_missing_registry_and_text() {
        let transformer = RecordTransformer::default();

        let mut no_registry = record("a", "x");
        no_registry.registry = None;
        assert!(matches!(
            transformer.transform(&no_registry),
            Err(TransformError::MissingField { field: "registry", .. })
        ));

        let mut no_text = record("a", "x");
        no_text.text = None;
        assert!(matches!(
            transformer.transform(&no_text),
            Err(TransformError::MissingField { field: "text", .. })
        ));
    }
}
