//! Lead persistence
//!
//! Leads are append-only: every accepted submission becomes a new row and
//! rows are never updated or deleted here.

use crate::models::LeadRecord;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, info};

/// List holding lead ids in insertion order
const LEADS_INDEX: &str = "leads:all";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Failed to serialize lead: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Durable store for accepted leads
#[async_trait]
pub trait LeadStore: Send + Sync {
    /// Append one lead
    async fn insert(&self, lead: &LeadRecord) -> Result<(), StoreError>;
}

/// Redis-backed lead store
pub struct RedisLeadStore {
    conn: ConnectionManager,
}

impl RedisLeadStore {
    /// Create a new storage instance
    pub async fn new(redis_url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        info!("Connected to Redis at {}", redis_url);

        Ok(Self { conn })
    }

    fn lead_key(id: &uuid::Uuid) -> String {
        format!("lead:{}", id)
    }

    /// Fetch a stored lead by id
    pub async fn get(&self, id: &uuid::Uuid) -> Result<Option<LeadRecord>, StoreError> {
        let mut conn = self.conn.clone();
        let json: Option<String> = redis::cmd("GET")
            .arg(Self::lead_key(id))
            .query_async(&mut conn)
            .await?;

        match json {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    /// Number of stored leads
    pub async fn count(&self) -> Result<usize, StoreError> {
        let mut conn = self.conn.clone();
        let count: usize = redis::cmd("LLEN")
            .arg(LEADS_INDEX)
            .query_async(&mut conn)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl LeadStore for RedisLeadStore {
    async fn insert(&self, lead: &LeadRecord) -> Result<(), StoreError> {
        let json = serde_json::to_string(lead)?;
        let mut conn = self.conn.clone();

        // Row and index entry land together or not at all
        redis::pipe()
            .atomic()
            .cmd("SET")
            .arg(Self::lead_key(&lead.id))
            .arg(json)
            .ignore()
            .cmd("RPUSH")
            .arg(LEADS_INDEX)
            .arg(lead.id.to_string())
            .ignore()
            .query_async::<_, ()>(&mut conn)
            .await?;

        debug!("Stored lead {}", lead.id);
        Ok(())
    }
}

/// In-process lead store for tests and local runs without Redis
#[derive(Default)]
pub struct MemoryLeadStore {
    rows: Mutex<Vec<LeadRecord>>,
    failing: AtomicBool,
}

impl MemoryLeadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent inserts fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Snapshot of stored rows, oldest first
    pub fn rows(&self) -> Vec<LeadRecord> {
        self.rows.lock().map(|rows| rows.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().map(|rows| rows.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl LeadStore for MemoryLeadStore {
    async fn insert(&self, lead: &LeadRecord) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("simulated write failure".to_string()));
        }

        let mut rows = self
            .rows
            .lock()
            .map_err(|_| StoreError::Unavailable("lock poisoned".to_string()))?;
        rows.push(lead.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClientMeta;
    use quota_common::LeadSubmission;

    fn record(name: &str) -> LeadRecord {
        LeadRecord::new(
            LeadSubmission {
                name: name.to_string(),
                email: "mario@acme.it".to_string(),
                company: String::new(),
                message: String::new(),
                share: 20.0,
                client_hours: 368.0,
                client_cost: 16000.0,
                target: 80000.0,
                weeks: 46.0,
                days_per_week: 5.0,
                hours_per_day: 8.0,
            },
            ClientMeta {
                ip: "127.0.0.1".to_string(),
                user_agent: "test".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_memory_store_appends() {
        let store = MemoryLeadStore::new();
        store.insert(&record("a")).await.unwrap();
        store.insert(&record("a")).await.unwrap();

        let rows = store.rows();
        assert_eq!(rows.len(), 2);
        assert_ne!(rows[0].id, rows[1].id);
    }

    #[tokio::test]
    async fn test_memory_store_failure() {
        let store = MemoryLeadStore::new();
        store.set_failing(true);

        let err = store.insert(&record("a")).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert!(store.is_empty());

        store.set_failing(false);
        store.insert(&record("a")).await.unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    #[ignore] // Requires Redis to be running
    async fn test_redis_insert_and_get() {
        let store = RedisLeadStore::new("redis://127.0.0.1:6379/15")
            .await
            .expect("Failed to connect to test Redis");

        let before = store.count().await.unwrap();
        let lead = record("Mario Rossi");
        store.insert(&lead).await.unwrap();

        let stored = store.get(&lead.id).await.unwrap().expect("Lead not found");
        assert_eq!(stored.name, "Mario Rossi");
        assert_eq!(stored.client_hours, 368);
        assert_eq!(store.count().await.unwrap(), before + 1);
    }
}
