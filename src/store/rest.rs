//! PostgREST-style HTTP store (the hosted database's REST interface).

use super::{RecordStore, StoreError};
use crate::config::StoreConfig;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::{HazardReport, Sighting, Task};

/// Store that reads rows through `{url}/rest/v1/{table}`.
pub struct RestStore {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
    sightings_table: String,
    hazards_table: String,
    tasks_table: String,
    page_size: usize,
}

impl RestStore {
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().unwrap_or_default(),
            sightings_table: config.sightings_table.clone(),
            hazards_table: config.hazards_table.clone(),
            tasks_table: config.tasks_table.clone(),
            page_size: config.page_size.max(1),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Fetch every row of `table` whose `created_at` is at or after `since`.
    ///
    /// Pages through the result with `Range` headers until a short page
    /// comes back. Rows that do not decode are skipped, not fatal.
    async fn fetch_since<T: DeserializeOwned>(
        &self,
        table: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<T>, StoreError> {
        let filter = format!("gte.{}", since.to_rfc3339_opts(SecondsFormat::Secs, true));

        debug!("Querying {} since {}", table, since);

        let mut rows = Vec::new();
        let mut skipped = 0usize;
        let mut offset = 0usize;

        while let Some(page) = self.fetch_page(table, &filter, offset).await? {
            let page_len = page.len();

            for value in page {
                match serde_json::from_value::<T>(value) {
                    Ok(row) => rows.push(row),
                    Err(e) => {
                        debug!("Skipping row in {}: {}", table, e);
                        skipped += 1;
                    }
                }
            }

            if page_len < self.page_size {
                break;
            }
            offset += page_len;
        }

        if skipped > 0 {
            warn!("Skipped {} undecodable rows in {}", skipped, table);
        }

        Ok(rows)
    }

    /// Fetch one page starting at `offset`. `None` means the range is past the end.
    async fn fetch_page(
        &self,
        table: &str,
        filter: &str,
        offset: usize,
    ) -> Result<Option<Vec<Value>>, StoreError> {
        let range = format!("{}-{}", offset, offset + self.page_size - 1);

        let response = self
            .http_client
            .get(self.table_url(table))
            .query(&[
                ("select", "*"),
                ("created_at", filter),
                ("order", "created_at.asc"),
            ])
            .header("apikey", &self.api_key)
            .header("Range-Unit", "items")
            .header("Range", range)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    StoreError::Connect {
                        url: self.base_url.clone(),
                        source: e,
                    }
                } else {
                    StoreError::Request(e)
                }
            })?;

        let status = response.status();
        if status == StatusCode::RANGE_NOT_SATISFIABLE {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status {
                table: table.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let page = serde_json::from_str(&body).map_err(|source| StoreError::Decode {
            table: table.to_string(),
            source,
        })?;

        Ok(Some(page))
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn sightings_since(&self, since: DateTime<Utc>) -> Result<Vec<Sighting>, StoreError> {
        self.fetch_since(&self.sightings_table, since).await
    }

    async fn hazards_since(&self, since: DateTime<Utc>) -> Result<Vec<HazardReport>, StoreError> {
        self.fetch_since(&self.hazards_table, since).await
    }

    async fn tasks_since(&self, since: DateTime<Utc>) -> Result<Vec<Task>, StoreError> {
        self.fetch_since(&self.tasks_table, since).await
    }
}
