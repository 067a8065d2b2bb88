//! Read-only access to the hosted record store.
//!
//! The analytics pipeline only ever asks one question of the store:
//! "give me every record of kind T created at or after X".

pub mod memory;
pub mod rest;

pub use memory::MemoryStore;
pub use rest::RestStore;

use crate::models::{HazardReport, Sighting, Task};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Errors raised by a single store query.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cannot reach store at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("store request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("store returned {status} for {table}: {body}")]
    Status {
        table: String,
        status: u16,
        body: String,
    },

    #[error("failed to decode {table} rows: {source}")]
    Decode {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    Unavailable(String),
}

/// Capability the collector depends on.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn sightings_since(&self, since: DateTime<Utc>) -> Result<Vec<Sighting>, StoreError>;

    async fn hazards_since(&self, since: DateTime<Utc>) -> Result<Vec<HazardReport>, StoreError>;

    async fn tasks_since(&self, since: DateTime<Utc>) -> Result<Vec<Task>, StoreError>;
}
