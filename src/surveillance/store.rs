//! Symptom record storage
//!
//! Records are partitioned by region (`REGION#<pincode>`) and sorted by
//! report date. Two backends:
//!
//! - [`MemorySymptomStore`]: process memory only
//! - [`FileSymptomStore`]: one JSON file per record, loaded on open
//!
//! Directory layout of the file backend:
//! ```text
//! <base_dir>/
//! ├── 560034/
//! │   ├── 2026-03-01-<uuid>.json
//! │   └── ...
//! └── 110001/
//!     └── ...
//! ```
//!
//! Queries against a slow or failing backend go through
//! [`query_with_retry`], which bounds each attempt with a timeout and
//! backs off exponentially between attempts.

use crate::config::{StorageBackend, StorageConfig};
use crate::error::{Error, Result};
use crate::privacy::AnonymizedSymptomRecord;
use crate::surveillance::aggregator::{partition_key, sort_key, RegionKey};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

/// Storage collaborator for anonymized records
#[async_trait]
pub trait SymptomStore: Send + Sync {
    /// Persist one record.
    async fn put(&self, record: &AnonymizedSymptomRecord) -> Result<()>;

    /// All records for the key's region whose date falls in its window.
    async fn query(&self, key: &RegionKey) -> Result<Vec<AnonymizedSymptomRecord>>;

    /// Backend name (used in logs)
    fn name(&self) -> &str;
}

/// Build the configured store backend
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn SymptomStore>> {
    let store: Arc<dyn SymptomStore> = match config.backend {
        StorageBackend::Memory => Arc::new(MemorySymptomStore::new()),
        StorageBackend::File => Arc::new(FileSymptomStore::open(config.base_dir.clone()).await?),
    };
    tracing::info!(backend = store.name(), "Symptom store ready");
    Ok(store)
}

/// Pincodes become directory names, so only ASCII alphanumerics are allowed.
fn check_pincode(pincode: &str) -> Result<()> {
    if pincode.is_empty() || !pincode.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::Validation(format!(
            "pincode must be non-empty ASCII alphanumeric, got '{}'",
            pincode
        )));
    }
    Ok(())
}

// =============================================================================
// Memory backend
// =============================================================================

/// In-memory store keyed by partition, records sorted by date within each
#[derive(Default)]
pub struct MemorySymptomStore {
    partitions: RwLock<BTreeMap<String, Vec<AnonymizedSymptomRecord>>>,
}

impl MemorySymptomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held across all partitions
    pub async fn len(&self) -> usize {
        self.partitions.read().await.values().map(Vec::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn insert(&self, record: AnonymizedSymptomRecord) {
        let mut partitions = self.partitions.write().await;
        let partition = partitions.entry(partition_key(&record.pincode)).or_default();
        // Insert after any record with the same timestamp to keep arrival order.
        let idx = partition.partition_point(|r| r.timestamp <= record.timestamp);
        partition.insert(idx, record);
    }

    async fn select(&self, key: &RegionKey) -> Vec<AnonymizedSymptomRecord> {
        let partitions = self.partitions.read().await;
        partitions
            .get(&key.partition_key())
            .map(|records| {
                records
                    .iter()
                    .filter(|r| key.contains(r))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait]
impl SymptomStore for MemorySymptomStore {
    async fn put(&self, record: &AnonymizedSymptomRecord) -> Result<()> {
        check_pincode(&record.pincode)?;
        self.insert(record.clone()).await;
        Ok(())
    }

    async fn query(&self, key: &RegionKey) -> Result<Vec<AnonymizedSymptomRecord>> {
        Ok(self.select(key).await)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

// =============================================================================
// File backend
// =============================================================================

/// JSON-file store with an in-memory index
pub struct FileSymptomStore {
    base_dir: PathBuf,
    index: MemorySymptomStore,
}

impl FileSymptomStore {
    /// Open (or create) a store at `base_dir` and load existing records.
    pub async fn open(base_dir: PathBuf) -> Result<Self> {
        tokio::fs::create_dir_all(&base_dir).await?;

        let store = Self {
            base_dir,
            index: MemorySymptomStore::new(),
        };
        store.load_from_disk().await;
        Ok(store)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Records currently indexed
    pub async fn len(&self) -> usize {
        self.index.len().await
    }

    async fn load_from_disk(&self) {
        let mut loaded = 0usize;
        let regions = match std::fs::read_dir(&self.base_dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Failed to read directory {}: {}", self.base_dir.display(), e);
                return;
            }
        };

        for region in regions.flatten() {
            let dir = region.path();
            if !dir.is_dir() {
                continue;
            }
            for record in load_json_files::<AnonymizedSymptomRecord>(&dir) {
                self.index.insert(record).await;
                loaded += 1;
            }
        }

        tracing::debug!(
            base_dir = %self.base_dir.display(),
            records = loaded,
            "Loaded symptom records from disk"
        );
    }

    fn record_path(&self, record: &AnonymizedSymptomRecord) -> PathBuf {
        let day = record
            .date()
            .map(sort_key)
            .unwrap_or_else(|| "undated".to_string());
        self.base_dir
            .join(&record.pincode)
            .join(format!("{}-{}.json", day, uuid::Uuid::new_v4()))
    }
}

#[async_trait]
impl SymptomStore for FileSymptomStore {
    async fn put(&self, record: &AnonymizedSymptomRecord) -> Result<()> {
        check_pincode(&record.pincode)?;

        let path = self.record_path(record);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| Error::Storage(format!("Failed to create {}: {}", dir.display(), e)))?;
        }

        let json = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| Error::Storage(format!("Failed to write {}: {}", path.display(), e)))?;

        self.index.insert(record.clone()).await;
        Ok(())
    }

    async fn query(&self, key: &RegionKey) -> Result<Vec<AnonymizedSymptomRecord>> {
        Ok(self.index.select(key).await)
    }

    fn name(&self) -> &str {
        "file"
    }
}

/// Load all JSON files from a directory, skipping unreadable ones
fn load_json_files<T: serde::de::DeserializeOwned>(dir: &Path) -> Vec<T> {
    let mut items = Vec::new();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Failed to read directory {}: {}", dir.display(), e);
            }
            return items;
        }
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(data) => match serde_json::from_str(&data) {
                Ok(item) => items.push(item),
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", path.display(), e);
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
            }
        }
    }

    items
}

// =============================================================================
// Retry
// =============================================================================

/// Timeout and backoff settings for store queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub backoff_max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&StorageConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            timeout: config.query_timeout(),
            max_attempts: config.max_attempts.max(1),
            backoff_base: Duration::from_millis(config.backoff_base_ms),
            backoff_max: Duration::from_millis(config.backoff_max_ms),
        }
    }

    /// Delay after failed attempt `attempt` (1-based): base·2^(attempt-1), capped
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        self.backoff_base
            .checked_mul(factor)
            .unwrap_or(self.backoff_max)
            .min(self.backoff_max)
    }
}

/// Query a store, retrying timeouts and storage errors with backoff.
///
/// Validation errors are returned immediately. After the last attempt the
/// failure surfaces as [`Error::Storage`].
pub async fn query_with_retry(
    store: &dyn SymptomStore,
    key: &RegionKey,
    policy: &RetryPolicy,
) -> Result<Vec<AnonymizedSymptomRecord>> {
    let attempts = policy.max_attempts.max(1);
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        match tokio::time::timeout(policy.timeout, store.query(key)).await {
            Ok(Ok(records)) => return Ok(records),
            Ok(Err(e @ Error::Validation(_))) => return Err(e),
            Ok(Err(e)) => last_error = e.to_string(),
            Err(_) => {
                last_error = format!("query timed out after {:?}", policy.timeout);
            }
        }

        tracing::warn!(
            backend = store.name(),
            region = %key.partition_key(),
            attempt,
            max_attempts = attempts,
            error = %last_error,
            "Symptom store query failed"
        );

        if attempt < attempts {
            tokio::time::sleep(policy.backoff(attempt)).await;
        }
    }

    Err(Error::Storage(format!(
        "{} store unavailable after {} attempts: {}",
        store.name(),
        attempts,
        last_error
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::privacy::Severity;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicU32, Ordering};

    // 2026-03-01T00:00:00Z
    const MARCH_1: i64 = 1_772_323_200_000;
    const DAY_MS: i64 = 86_400_000;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn record(symptom: &str, pincode: &str, day: u32) -> AnonymizedSymptomRecord {
        AnonymizedSymptomRecord {
            hashed_subject_id: "cd".repeat(32),
            symptom_type: symptom.to_string(),
            severity: Severity::Low,
            pincode: pincode.to_string(),
            timestamp: MARCH_1 + (day as i64 - 1) * DAY_MS,
            count: None,
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_millis(50),
            max_attempts,
            backoff_base: Duration::from_millis(1),
            backoff_max: Duration::from_millis(4),
        }
    }

    /// Fails the first `failures` queries, then delegates.
    struct FlakyStore {
        inner: MemorySymptomStore,
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl SymptomStore for FlakyStore {
        async fn put(&self, record: &AnonymizedSymptomRecord) -> Result<()> {
            self.inner.put(record).await
        }

        async fn query(&self, key: &RegionKey) -> Result<Vec<AnonymizedSymptomRecord>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(Error::Storage("connection reset".to_string()));
            }
            self.inner.query(key).await
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    struct SlowStore;

    #[async_trait]
    impl SymptomStore for SlowStore {
        async fn put(&self, _record: &AnonymizedSymptomRecord) -> Result<()> {
            Ok(())
        }

        async fn query(&self, _key: &RegionKey) -> Result<Vec<AnonymizedSymptomRecord>> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    // ---- Memory backend ----

    #[tokio::test]
    async fn test_memory_put_and_query() {
        let store = MemorySymptomStore::new();
        store.put(&record("fever", "560034", 1)).await.unwrap();
        store.put(&record("cough", "560034", 2)).await.unwrap();
        store.put(&record("fever", "560034", 5)).await.unwrap();
        store.put(&record("fever", "110001", 1)).await.unwrap();

        let key = RegionKey::new("560034", date(1), date(2)).unwrap();
        let found = store.query(&key).await.unwrap();
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|r| r.pincode == "560034"));
        assert_eq!(store.len().await, 4);
    }

    #[tokio::test]
    async fn test_memory_query_sorted_by_time() {
        let store = MemorySymptomStore::new();
        store.put(&record("b", "560034", 3)).await.unwrap();
        store.put(&record("a", "560034", 1)).await.unwrap();
        store.put(&record("c", "560034", 2)).await.unwrap();

        let key = RegionKey::new("560034", date(1), date(3)).unwrap();
        let found = store.query(&key).await.unwrap();
        let order: Vec<_> = found.iter().map(|r| r.symptom_type.as_str()).collect();
        assert_eq!(order, vec!["a", "c", "b"]);
    }

    #[test]
    fn test_unknown_region_is_empty() {
        let store = MemorySymptomStore::new();
        let key = RegionKey::single_day("999999", date(1)).unwrap();
        let found = tokio_test::block_on(store.query(&key)).unwrap();
        assert!(found.is_empty());
        assert!(tokio_test::block_on(store.is_empty()));
    }

    #[tokio::test]
    async fn test_rejects_path_like_pincode() {
        let store = MemorySymptomStore::new();
        let err = store.put(&record("fever", "../etc", 1)).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    // ---- File backend ----

    #[tokio::test]
    async fn test_file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("symptoms");

        {
            let store = FileSymptomStore::open(base.clone()).await.unwrap();
            store.put(&record("fever", "560034", 1)).await.unwrap();
            store.put(&record("rash", "560034", 2)).await.unwrap();
            assert_eq!(store.len().await, 2);
        }

        let files: Vec<_> = std::fs::read_dir(base.join("560034"))
            .unwrap()
            .flatten()
            .collect();
        assert_eq!(files.len(), 2);

        let reopened = FileSymptomStore::open(base).await.unwrap();
        assert_eq!(reopened.len().await, 2);
        let key = RegionKey::single_day("560034", date(2)).unwrap();
        let found = reopened.query(&key).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].symptom_type, "rash");
    }

    #[tokio::test]
    async fn test_file_store_skips_corrupt_files() {
        let dir = tempfile::tempdir().unwrap();
        let region = dir.path().join("560034");
        std::fs::create_dir_all(&region).unwrap();
        std::fs::write(region.join("broken.json"), "{not json").unwrap();
        std::fs::write(region.join("notes.txt"), "ignored").unwrap();

        let store = FileSymptomStore::open(dir.path().to_path_buf()).await.unwrap();
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test]
    async fn test_file_records_hold_no_identifiers() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSymptomStore::open(dir.path().to_path_buf()).await.unwrap();
        store.put(&record("fever", "560034", 1)).await.unwrap();

        let entry = std::fs::read_dir(dir.path().join("560034"))
            .unwrap()
            .flatten()
            .next()
            .unwrap();
        assert!(entry.file_name().to_string_lossy().starts_with("2026-03-01-"));
        let content = std::fs::read_to_string(entry.path()).unwrap();
        assert!(content.contains("hashedSubjectId"));
        assert!(!content.contains("\"name\""));
    }

    #[tokio::test]
    async fn test_open_store_memory_backend() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            ..Default::default()
        };
        let store = open_store(&config).await.unwrap();
        assert_eq!(store.name(), "memory");
    }

    // ---- Retry ----

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            timeout: Duration::from_millis(100),
            max_attempts: 10,
            backoff_base: Duration::from_millis(100),
            backoff_max: Duration::from_millis(2000),
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
        assert_eq!(policy.backoff(6), Duration::from_millis(2000));
        assert_eq!(policy.backoff(64), Duration::from_millis(2000));
    }

    #[test]
    fn test_policy_from_config() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.timeout, Duration::from_millis(2000));
        assert_eq!(policy.max_attempts, 3);

        let config = StorageConfig {
            max_attempts: 0,
            ..Default::default()
        };
        assert_eq!(RetryPolicy::from_config(&config).max_attempts, 1);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failure() {
        let store = FlakyStore {
            inner: MemorySymptomStore::new(),
            failures: 2,
            calls: AtomicU32::new(0),
        };
        store.put(&record("fever", "560034", 1)).await.unwrap();

        let key = RegionKey::single_day("560034", date(1)).unwrap();
        let found = query_with_retry(&store, &key, &fast_policy(3)).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_with_storage_error() {
        let store = FlakyStore {
            inner: MemorySymptomStore::new(),
            failures: u32::MAX,
            calls: AtomicU32::new(0),
        };
        let key = RegionKey::single_day("560034", date(1)).unwrap();
        let err = query_with_retry(&store, &key, &fast_policy(3))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
        assert_eq!(store.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_times_out_slow_store() {
        let key = RegionKey::single_day("560034", date(1)).unwrap();
        let err = query_with_retry(&SlowStore, &key, &fast_policy(2))
            .await
            .unwrap_err();
        match err {
            Error::Storage(msg) => assert!(msg.contains("timed out")),
            other => panic!("expected storage error, got {:?}", other),
        }
    }
}
