//! HTTP implementation of the ERP client
//!
//! Talks to the platform's REST surface: the record metadata catalog for
//! entity and schema discovery, and the SQL query endpoint for count and
//! sample probes.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use super::{EntityType, EqFilter, ErpClient, SampleRow, SchemaField};
use crate::config::ErpConfig;

const CATALOG_PATH: &str = "/services/rest/record/v1/metadata-catalog";
const QUERY_PATH: &str = "/services/rest/query/v1/suiteql";

/// Reqwest-backed ERP client
#[derive(Clone)]
pub struct HttpErpClient {
    http: reqwest::Client,
    base_url: String,
    account: String,
}

#[derive(Deserialize)]
struct CatalogResponse {
    #[serde(default)]
    items: Vec<CatalogItem>,
}

#[derive(Deserialize)]
struct CatalogItem {
    name: String,
}

#[derive(Deserialize)]
struct SchemaResponse {
    #[serde(default)]
    fields: Vec<SchemaField>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

impl HttpErpClient {
    /// Build a client from the configured connection settings
    pub fn new(config: &ErpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let bearer = format!("Bearer {}", config.token);
        let mut auth = HeaderValue::from_str(&bearer).context("invalid ERP token")?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            account: config.account.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Run a SQL query and return the raw result rows
    async fn run_query(&self, query: &str) -> Result<Vec<serde_json::Value>> {
        debug!(account = %self.account, "ERP query: {}", query);

        let response = self
            .http
            .post(self.url(QUERY_PATH))
            .header("Prefer", "transient")
            .json(&json!({ "q": query }))
            .send()
            .await?
            .error_for_status()?;

        let body: QueryResponse = response.json().await?;
        Ok(body.items)
    }
}

/// Escape a single-quoted SQL literal
fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Quote an identifier so entity names never leak into the statement raw
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', ""))
}

fn where_clause(filter: Option<&EqFilter>) -> String {
    match filter {
        Some(f) => format!(
            " WHERE {} = '{}'",
            quote_ident(&f.field),
            escape_literal(&f.equals)
        ),
        None => String::new(),
    }
}

#[async_trait]
impl ErpClient for HttpErpClient {
    async fn list_entity_types(&self) -> Result<Vec<EntityType>> {
        let response = self
            .http
            .get(self.url(CATALOG_PATH))
            .send()
            .await?
            .error_for_status()?;

        let body: CatalogResponse = response.json().await?;
        Ok(body
            .items
            .into_iter()
            .map(|item| EntityType { name: item.name })
            .collect())
    }

    async fn count_rows(
        &self,
        target: &str,
        filter: Option<&EqFilter>,
    ) -> Result<serde_json::Value> {
        let query = format!(
            "SELECT COUNT(*) AS cnt FROM {}{}",
            quote_ident(target),
            where_clause(filter)
        );
        let rows = self.run_query(&query).await?;

        let row = rows
            .first()
            .ok_or_else(|| anyhow!("count query returned no rows for {}", target))?;
        row.get("cnt")
            .cloned()
            .ok_or_else(|| anyhow!("count row missing 'cnt' column for {}", target))
    }

    async fn sample_row(
        &self,
        target: &str,
        filter: Option<&EqFilter>,
    ) -> Result<Option<SampleRow>> {
        let query = format!(
            "SELECT * FROM {}{} FETCH FIRST 1 ROWS ONLY",
            quote_ident(target),
            where_clause(filter)
        );
        let rows = self.run_query(&query).await?;

        match rows.into_iter().next() {
            Some(serde_json::Value::Object(map)) => Ok(Some(map)),
            Some(other) => Err(anyhow!("sample row is not an object: {}", other)),
            None => Ok(None),
        }
    }

    async fn describe_schema(&self, entity: &str) -> Result<Vec<SchemaField>> {
        let response = self
            .http
            .get(format!("{}/{}", self.url(CATALOG_PATH), entity))
            .header(ACCEPT, "application/schema+json")
            .send()
            .await?
            .error_for_status()?;

        let body: SchemaResponse = response.json().await?;
        Ok(body.fields)
    }
}
