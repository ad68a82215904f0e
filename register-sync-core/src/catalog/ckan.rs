//! CKAN action API client
//!
//! Talks to `package_search` and `package_create`. Responses use the CKAN
//! envelope `{success, result, error}`; a `Validation Error` on create is
//! reported as a reserved name rather than a failure.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, warn};

use super::{CatalogClient, CatalogEntryDraft, CatalogSearchResult, CreateStatus};
use crate::error::CatalogError;

/// Default destination catalog
pub const DEFAULT_CATALOG_URL: &str = "https://test.data.gov.uk";

const SEARCH_ACTION: &str = "package_search";
const CREATE_ACTION: &str = "package_create";
const VALIDATION_ERROR: &str = "Validation Error";

/// CKAN action API response envelope
#[derive(Debug, Deserialize)]
struct ActionResponse<T> {
    success: bool,
    result: Option<T>,
    error: Option<ApiError>,
}

/// CKAN error object (`__type` plus either `message` or per-field errors)
#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "__type", default)]
    kind: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl ApiError {
    fn describe(&self) -> String {
        if let Some(message) = &self.message {
            return message.clone();
        }
        self.fields
            .iter()
            .map(|(field, errors)| match errors {
                Value::Array(items) => {
                    let joined: Vec<String> = items
                        .iter()
                        .map(|i| i.as_str().map_or_else(|| i.to_string(), str::to_string))
                        .collect();
                    format!("{field}: {}", joined.join("; "))
                }
                other => format!("{field}: {other}"),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Decode an action response, falling back to the HTTP status when the
/// body is not a CKAN envelope.
fn decode<T: DeserializeOwned>(
    action: &'static str,
    status: u16,
    body: &str,
) -> Result<ActionResponse<T>, CatalogError> {
    match serde_json::from_str::<ActionResponse<T>>(body) {
        Ok(response) => Ok(response),
        Err(_) if !(200..300).contains(&status) => Err(CatalogError::Status {
            action,
            status,
            body: body.chars().take(500).collect(),
        }),
        Err(source) => Err(CatalogError::Malformed { action, source }),
    }
}

fn api_failure(action: &'static str, status: u16, error: Option<ApiError>) -> CatalogError {
    match error {
        Some(error) => CatalogError::Api {
            action,
            message: error.describe(),
            kind: error.kind,
        },
        None => CatalogError::Status {
            action,
            status,
            body: "request was not successful".to_string(),
        },
    }
}

/// Interpret a `package_search` response
pub(crate) fn interpret_search(
    status: u16,
    body: &str,
) -> Result<CatalogSearchResult, CatalogError> {
    let response: ActionResponse<CatalogSearchResult> = decode(SEARCH_ACTION, status, body)?;
    if !response.success {
        return Err(api_failure(SEARCH_ACTION, status, response.error));
    }
    Ok(response.result.unwrap_or_default())
}

/// Interpret a `package_create` response
pub(crate) fn interpret_create(status: u16, body: &str) -> Result<CreateStatus, CatalogError> {
    let response: ActionResponse<Value> = decode(CREATE_ACTION, status, body)?;
    if response.success {
        return Ok(CreateStatus::Created);
    }

    match response.error {
        Some(error) if error.kind == VALIDATION_ERROR => Ok(CreateStatus::NameReserved {
            message: error.describe(),
        }),
        error => Err(api_failure(CREATE_ACTION, status, error)),
    }
}

/// CKAN catalog over HTTP
pub struct CkanClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl CkanClient {
    /// Create a client for the CKAN instance at `base_url`
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("register-sync/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|source| CatalogError::Client { source })?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        if api_key.is_none() {
            debug!("No catalog API key configured; creates will be unauthenticated");
        }

        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    fn action_url(&self, action: &str) -> String {
        format!("{}/api/3/action/{action}", self.base_url)
    }

    async fn read(
        action: &'static str,
        response: reqwest::Response,
    ) -> Result<(u16, String), CatalogError> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|source| CatalogError::Request { action, source })?;
        Ok((status, body))
    }
}

#[async_trait]
impl CatalogClient for CkanClient {
    async fn search(&self, name: &str) -> Result<CatalogSearchResult, CatalogError> {
        let query = format!("name:{name}");
        debug!("CKAN {} q={}", SEARCH_ACTION, query);

        let response = self
            .client
            .get(self.action_url(SEARCH_ACTION))
            .query(&[("q", query.as_str())])
            .send()
            .await
            .map_err(|source| CatalogError::Request {
                action: SEARCH_ACTION,
                source,
            })?;

        let (status, body) = Self::read(SEARCH_ACTION, response).await?;
        interpret_search(status, &body)
    }

    async fn create(&self, draft: &CatalogEntryDraft) -> Result<CreateStatus, CatalogError> {
        debug!("CKAN {} name={}", CREATE_ACTION, draft.name);

        let mut request = self
            .client
            .post(self.action_url(CREATE_ACTION))
            .json(&draft.to_payload());
        if let Some(key) = &self.api_key {
            request = request.header("Authorization", key);
        }

        let response = request.send().await.map_err(|source| CatalogError::Request {
            action: CREATE_ACTION,
            source,
        })?;

        let (status, body) = Self::read(CREATE_ACTION, response).await?;
        let result = interpret_create(status, &body);
        if let Err(e) = &result {
            warn!("CKAN {} for '{}' failed: {}", CREATE_ACTION, draft.name, e);
        }
        result
    }

    fn name(&self) -> &'static str {
        "ckan"
    }
}
