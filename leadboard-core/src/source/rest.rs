//! HTTP client for the hosted lead table
//!
//! Talks to a PostgREST-style endpoint (`{url}/rest/v1/{table}`) using its
//! query-string filter syntax. Nothing is retried: a failed request is
//! reported to the caller as-is.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};

use super::{Condition, LeadQuery, LeadSource, Selection};
use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::types::{Column, DeleteOutcome, Lead, LeadId};

/// Lead source backed by the hosted table.
pub struct RestSource {
    http_client: reqwest::Client,
    table_url: String,
}

impl RestSource {
    /// Create a client from configuration.
    ///
    /// Returns an error if the URL or API key is missing.
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let base_url = config
            .rest_url
            .clone()
            .ok_or_else(|| Error::Config("source.rest_url is required".to_string()))?
            .trim_end_matches('/')
            .to_string();
        let api_key = config
            .api_key()
            .ok_or_else(|| Error::Config("source.api_key is required".to_string()))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            "apikey",
            HeaderValue::from_str(&api_key)
                .map_err(|e| Error::Config(format!("invalid api_key: {}", e)))?,
        );
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| Error::Config(format!("invalid api_key: {}", e)))?,
        );

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            table_url: format!(
                "{}/rest/v1/{}",
                base_url,
                urlencoding::encode(&config.table)
            ),
        })
    }

    /// Turn an error response into a data source error.
    async fn rejection(response: reqwest::Response) -> Error {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "unknown".to_string());
        Error::DataSource(format!("API error ({}): {}", status, error_text))
    }
}

/// Timestamp literal used in filters. Always UTC with a `Z` suffix so no `+`
/// needs escaping.
fn timestamp_literal(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Query-string pairs for a select. Values are not yet percent-encoded.
pub fn query_params(query: &LeadQuery) -> Vec<(String, String)> {
    let select = match &query.selection {
        Selection::All => "*".to_string(),
        Selection::Columns(_) => query
            .selected_columns()
            .iter()
            .map(Column::as_str)
            .collect::<Vec<_>>()
            .join(","),
    };

    let mut params = vec![("select".to_string(), select)];
    for condition in &query.conditions {
        let (column, value) = match condition {
            Condition::Eq(column, value) => (column, format!("eq.{}", value)),
            Condition::Gte(column, ts) => (column, format!("gte.{}", timestamp_literal(ts))),
            Condition::Lte(column, ts) => (column, format!("lte.{}", timestamp_literal(ts))),
        };
        params.push((column.as_str().to_string(), value));
    }
    if let Some(column) = query.order_desc {
        params.push(("order".to_string(), format!("{}.desc.nullslast", column)));
    }
    params
}

#[async_trait]
impl LeadSource for RestSource {
    fn describe(&self) -> String {
        self.table_url.clone()
    }

    async fn select(&self, query: &LeadQuery) -> Result<Vec<Lead>> {
        let response = self
            .http_client
            .get(&self.table_url)
            .query(&query_params(query))
            .send()
            .await
            .map_err(|e| Error::DataSource(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let rows: Vec<Lead> = response
            .json()
            .await
            .map_err(|e| Error::DataSource(format!("failed to parse response: {}", e)))?;
        tracing::debug!(rows = rows.len(), "Fetched leads from REST source");
        Ok(rows)
    }

    async fn delete(&self, id: LeadId) -> Result<DeleteOutcome> {
        // return=representation makes the deleted rows observable, so a
        // filter that matched nothing is distinguishable from a real delete
        let response = self
            .http_client
            .delete(&self.table_url)
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .send()
            .await
            .map_err(|e| Error::DataSource(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let deleted: Vec<serde_json::Value> = response
            .json()
            .await
            .map_err(|e| Error::DataSource(format!("failed to parse response: {}", e)))?;
        if deleted.is_empty() {
            Ok(DeleteOutcome::NotFound)
        } else {
            Ok(DeleteOutcome::Deleted)
        }
    }
}
