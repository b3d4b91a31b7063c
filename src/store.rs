use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use serde_json::json;
use tokio::io::AsyncWriteExt;
use tokio::sync::{broadcast, OnceCell, RwLock};

use crate::constants::FEED_CHANNEL_CAPACITY;
use crate::logging;
use crate::model::{
    generate_app_id, generate_native_key, CreateNewsRequest, NewsFilter, NewsKey, NewsRecord,
};

/// Document store for news records, with JSONL file durability and an insert
/// notification feed.
///
/// Records are immutable once written; the only mutations are insertion and
/// deletion. Every insertion is published to all active watchers in the order
/// it was applied.
pub struct NewsStore {
    path: Option<PathBuf>,
    records: RwLock<Vec<NewsRecord>>,
    inserts: broadcast::Sender<NewsRecord>,
    watchers: Arc<AtomicUsize>,
}

impl NewsStore {
    /// Open a file-backed store, loading any previously persisted records.
    pub async fn open(path: impl Into<PathBuf>) -> Result<NewsStore> {
        let path = path.into();
        let records = load_records(&path)
            .await
            .with_context(|| format!("failed to load news records from {path:?}"))?;
        logging::info(
            "store.open",
            "News store opened",
            json!({ "path": path.display().to_string(), "records": records.len() }),
        );
        Ok(Self::with_records(records, Some(path)))
    }

    /// In-memory store without a backing file.
    pub fn ephemeral() -> NewsStore {
        Self::with_records(Vec::new(), None)
    }

    fn with_records(records: Vec<NewsRecord>, path: Option<PathBuf>) -> NewsStore {
        let (inserts, _) = broadcast::channel(FEED_CHANNEL_CAPACITY);
        NewsStore {
            path,
            records: RwLock::new(records),
            inserts,
            watchers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Durably write a new record and notify every active watcher.
    ///
    /// The notification is published while the write lock is held, so the
    /// feed order every subscriber observes matches insertion order.
    pub async fn insert(&self, request: CreateNewsRequest) -> Result<NewsRecord> {
        let record = {
            let mut rng = rand::thread_rng();
            NewsRecord {
                key: generate_native_key(&mut rng),
                id: generate_app_id(&mut rng),
                title: request.title,
                category: request.category,
                details: request.details,
                created_at: Utc::now(),
            }
        };

        let mut records = self.records.write().await;
        if let Some(ref path) = self.path {
            append_record(path, &record)
                .await
                .with_context(|| format!("failed to append news record to {path:?}"))?;
        }
        records.push(record.clone());
        let _ = self.inserts.send(record.clone());
        Ok(record)
    }

    /// Filtered listing, newest first.
    pub async fn find_many(&self, filter: &NewsFilter) -> Vec<NewsRecord> {
        let records = self.records.read().await;
        let mut selected: Vec<NewsRecord> = records
            .iter()
            .rev()
            .filter(|record| filter.accepts(record))
            .cloned()
            .collect();
        // A zero limit means "no limit", as in the original API.
        if let Some(limit) = filter.limit {
            if limit > 0 {
                selected.truncate(limit);
            }
        }
        selected
    }

    /// Lookup by either identifier; the newest match wins should app ids
    /// ever collide.
    pub async fn find(&self, key: &NewsKey) -> Option<NewsRecord> {
        let records = self.records.read().await;
        records.iter().rev().find(|record| key.matches(record)).cloned()
    }

    /// Remove a record by either identifier. Returns false when nothing
    /// matched. The backing file is rewritten in full.
    pub async fn delete(&self, key: &NewsKey) -> Result<bool> {
        let mut records = self.records.write().await;
        let Some(index) = records.iter().rposition(|record| key.matches(record)) else {
            return Ok(false);
        };
        records.remove(index);
        if let Some(ref path) = self.path {
            rewrite_records(path, &records)
                .await
                .with_context(|| format!("failed to rewrite news records at {path:?}"))?;
        }
        Ok(true)
    }

    /// Open a subscription to insert notifications. The subscription only
    /// sees records inserted after this call; dropping it releases the
    /// watcher slot.
    pub fn watch_inserts(&self) -> InsertSubscription {
        self.watchers.fetch_add(1, Ordering::SeqCst);
        InsertSubscription {
            receiver: self.inserts.subscribe(),
            watchers: Arc::clone(&self.watchers),
        }
    }

    /// Number of live insert subscriptions.
    pub fn active_watchers(&self) -> usize {
        self.watchers.load(Ordering::SeqCst)
    }
}

/// A single client's view of the insert feed.
///
/// `next` yields full records in insertion order until the subscription can
/// no longer honor that guarantee (the receiver lagged) or the store went
/// away, at which point it returns `None` and the owning channel should be
/// closed so the client reconnects.
pub struct InsertSubscription {
    receiver: broadcast::Receiver<NewsRecord>,
    watchers: Arc<AtomicUsize>,
}

impl InsertSubscription {
    pub async fn next(&mut self) -> Option<NewsRecord> {
        match self.receiver.recv().await {
            Ok(record) => Some(record),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                logging::warn(
                    "feed.subscription.lagged",
                    "Insert subscription lagged; closing so the client reconnects",
                    json!({ "skipped": skipped }),
                );
                None
            }
            Err(broadcast::error::RecvError::Closed) => None,
        }
    }
}

impl Drop for InsertSubscription {
    fn drop(&mut self) {
        self.watchers.fetch_sub(1, Ordering::SeqCst);
    }
}

static SHARED: OnceCell<Arc<NewsStore>> = OnceCell::const_new();

/// Process-wide store handle, established once on first use. Concurrent first
/// callers are serialised by the cell, so only a single open ever runs; the
/// path is only consulted on that first call.
pub async fn shared(path: &Path) -> Result<Arc<NewsStore>> {
    let store = SHARED
        .get_or_try_init(|| async { NewsStore::open(path).await.map(Arc::new) })
        .await?;
    Ok(Arc::clone(store))
}

async fn load_records(path: &Path) -> Result<Vec<NewsRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = tokio::fs::read_to_string(path).await?;
    let mut records = Vec::new();
    for (number, line) in raw.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record: NewsRecord = serde_json::from_str(line)
            .with_context(|| format!("malformed record on line {}", number + 1))?;
        records.push(record);
    }
    Ok(records)
}

async fn append_record(path: &Path, record: &NewsRecord) -> Result<()> {
    let mut payload = serde_json::to_vec(record)?;
    payload.push(b'\n');
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(&payload).await?;
    file.flush().await?;
    Ok(())
}

async fn rewrite_records(path: &Path, records: &[NewsRecord]) -> Result<()> {
    let mut payload = Vec::new();
    for record in records {
        payload.extend(serde_json::to_vec(record)?);
        payload.push(b'\n');
    }
    tokio::fs::write(path, payload).await?;
    Ok(())
}
