//! Register index fetching
//!
//! Reads the register register's `records.json` once and yields the
//! registers in the requested phase, in the order the index lists them.

use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::FetchError;

/// Default register register index URL
pub const DEFAULT_SOURCE_URL: &str = "https://register.register.gov.uk/records.json?page-size=500";

/// One register as listed in the register register.
///
/// Only `name` and `phase` are guaranteed. The rest is checked by the
/// transformer so that one malformed register does not sink the whole index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRecord {
    /// Register name (e.g., "country")
    pub name: String,

    /// Publication phase (alpha, beta, live)
    pub phase: String,

    /// Field names held by the register
    pub fields: Option<Vec<String>>,

    /// Owning organisation identifier in the registers world
    pub registry: Option<String>,

    /// Human-readable summary of the register
    pub text: Option<String>,
}

impl SourceRecord {
    /// Build a record from one `name -> properties` entry of the index
    fn from_props(name: &str, phase: String, props: &Value) -> Self {
        Self {
            name: name.to_string(),
            phase,
            fields: string_list(props, "fields"),
            registry: string_field(props, "registry"),
            text: string_field(props, "text"),
        }
    }
}

fn string_field(props: &Value, key: &str) -> Option<String> {
    props.get(key).and_then(Value::as_str).map(str::to_string)
}

fn string_list(props: &Value, key: &str) -> Option<Vec<String>> {
    props
        .get(key)?
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}

/// Single-pass sequence of registers from one fetch.
///
/// Deliberately not `Clone`: iterating again means fetching again.
#[derive(Debug)]
pub struct SourceRecords {
    records: std::vec::IntoIter<SourceRecord>,
    filtered_out: usize,
}

impl SourceRecords {
    /// Parse a `records.json` body, keeping only registers in `phase`
    pub fn from_json(body: &str, phase: &str) -> Result<Self, FetchError> {
        let index: Map<String, Value> =
            serde_json::from_str(body).map_err(|source| FetchError::Malformed { source })?;

        let total = index.len();
        let records: Vec<SourceRecord> = index
            .iter()
            .filter_map(|(name, props)| {
                let record_phase = props.get("phase").and_then(Value::as_str)?;
                if record_phase != phase {
                    return None;
                }
                Some(SourceRecord::from_props(
                    name,
                    record_phase.to_string(),
                    props,
                ))
            })
            .collect();

        let filtered_out = total - records.len();
        debug!(
            "Register index lists {} registers, {} in phase '{}'",
            total,
            records.len(),
            phase
        );

        Ok(Self {
            records: records.into_iter(),
            filtered_out,
        })
    }

    /// Number of index entries dropped because of their phase
    pub fn filtered_out(&self) -> usize {
        self.filtered_out
    }
}

impl Iterator for SourceRecords {
    type Item = SourceRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.records.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl ExactSizeIterator for SourceRecords {}

/// Reads the register register over HTTP
pub struct RegisterFetcher {
    client: reqwest::Client,
    url: String,
}

impl RegisterFetcher {
    /// Create a fetcher for the given index URL
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("register-sync/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Client { source })?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Index URL this fetcher reads
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the index once and return the registers in `phase`
    pub async fn fetch(&self, phase: &str) -> Result<SourceRecords, FetchError> {
        info!("Fetching register index from {}", self.url);

        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: self.url.clone(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: self.url.clone(),
                status: response.status().as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Request {
                url: self.url.clone(),
                source,
            })?;

        SourceRecords::from_json(&body, phase)
    }
}
