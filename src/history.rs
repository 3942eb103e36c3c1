//! Durable calculation history log

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

/// One saved calculation: the accumulation inputs plus the derived result,
/// stored as a flat record of stringified numeric fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalculationRecord {
    pub start_amount: String,
    pub daily_percent: String,
    pub days: String,
    pub total_result: String,
    pub total_profit: String,
    pub created_at: DateTime<Utc>,
}

impl CalculationRecord {
    /// Rejects records whose stringified fields do not parse back to finite
    /// numbers. The engine happily produces NaN; the log must not.
    fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("start_amount", &self.start_amount),
            ("daily_percent", &self.daily_percent),
            ("total_result", &self.total_result),
            ("total_profit", &self.total_profit),
        ] {
            let parsed: f64 = value
                .parse()
                .with_context(|| format!("Field {field} is not numeric: {value:?}"))?;
            if !parsed.is_finite() {
                bail!("Field {field} is not a finite number: {value:?}");
            }
        }
        self.days
            .parse::<u32>()
            .with_context(|| format!("Field days is not an integer: {:?}", self.days))?;
        Ok(())
    }
}

#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Validates and persists a record, returning the stored copy.
    async fn append(&self, record: CalculationRecord) -> Result<CalculationRecord>;

    /// Returns all records in creation order.
    async fn list(&self) -> Result<Vec<CalculationRecord>>;
}

/// Fjall-backed history under the data directory. Keys are RFC 3339
/// timestamps with a per-process sequence suffix, so lexicographic partition
/// order is creation order.
pub struct FjallHistory {
    _keyspace: Keyspace,
    partition: PartitionHandle,
    sequence: AtomicU64,
}

impl FjallHistory {
    pub fn new(data_path: &Path) -> Result<Self> {
        let history_dir = data_path.join("history");
        std::fs::create_dir_all(&history_dir)
            .with_context(|| format!("Failed to create data directory: {}", history_dir.display()))?;

        let keyspace = fjall::Config::new(&history_dir)
            .open()
            .context("Failed to open history keyspace")?;
        let partition = keyspace
            .open_partition("calculations", PartitionCreateOptions::default())
            .context("Failed to open calculations partition")?;

        Ok(Self {
            _keyspace: keyspace,
            partition,
            sequence: AtomicU64::new(0),
        })
    }

    fn record_key(&self, created_at: &DateTime<Utc>) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        format!("{}#{seq:06}", created_at.format("%Y-%m-%dT%H:%M:%S%.6fZ"))
    }
}

#[async_trait]
impl HistoryStore for FjallHistory {
    async fn append(&self, record: CalculationRecord) -> Result<CalculationRecord> {
        record.validate()?;

        let key = self.record_key(&record.created_at);
        self.partition
            .insert(key.as_bytes(), serde_json::to_vec(&record)?)
            .context("Failed to write history record")?;
        debug!(%key, "Stored calculation record");
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<CalculationRecord>> {
        let mut records = Vec::new();
        for entry in self.partition.iter() {
            let (_key, value) = entry.context("Failed to read history record")?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }
}

/// In-memory history for tests and dry runs.
#[derive(Default)]
pub struct MemoryHistory {
    records: Mutex<Vec<CalculationRecord>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn append(&self, record: CalculationRecord) -> Result<CalculationRecord> {
        record.validate()?;
        self.records.lock().await.push(record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<CalculationRecord>> {
        Ok(self.records.lock().await.clone())
    }
}
