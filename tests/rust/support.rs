use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use record_search::core::backend::{RecordStore, RowStream, SchemaOutcome, SearchIndex};
use record_search::core::errors::{CoreError, CoreResult};
use record_search::core::model::Record;

/// Row as seen by a full scan; `Err` stands for a row that fails to decode.
pub type RowFixture = Result<Record, String>;

pub fn sample_rows() -> Vec<RowFixture> {
    vec![
        Ok(Record::new(1, "apple pie")),
        Ok(Record::new(2, "banana split")),
        Ok(Record::new(3, "apple tart")),
    ]
}

#[derive(Default)]
pub struct MemoryRecordStore {
    rows: Mutex<Vec<RowFixture>>,
    unreachable: AtomicBool,
    delay: Option<Duration>,
    /// Full scan breaks off with a store error after this many rows.
    fail_after: Option<usize>,
    calls: AtomicUsize,
}

impl MemoryRecordStore {
    pub fn new(rows: Vec<RowFixture>) -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(rows),
            ..Self::default()
        })
    }

    pub fn slow(rows: Vec<RowFixture>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(rows),
            delay: Some(delay),
            ..Self::default()
        })
    }

    pub fn failing_after(rows: Vec<RowFixture>, fail_after: usize) -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(rows),
            fail_after: Some(fail_after),
            ..Self::default()
        })
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self) -> CoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(CoreError::Db("connection refused".to_string()));
        }
        Ok(())
    }

    fn scanned_rows(&self) -> Vec<CoreResult<CoreResult<Record>>> {
        let rows = self.rows.lock().unwrap().clone();
        let mut scanned = rows
            .into_iter()
            .map(|row| Ok(row.map_err(CoreError::Db)))
            .collect::<Vec<_>>();

        if let Some(fail_after) = self.fail_after {
            scanned.truncate(fail_after);
            scanned.push(Err(CoreError::Db("connection reset by peer".to_string())));
        }
        scanned
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    fn scan_all(&self) -> RowStream<'_> {
        stream::once(async move {
            let scanned = match self.enter().await {
                Ok(()) => self.scanned_rows(),
                Err(error) => vec![Err(error)],
            };
            stream::iter(scanned)
        })
        .flatten()
        .boxed()
    }

    async fn scan_matching(&self, term: &str) -> CoreResult<Vec<Record>> {
        self.enter().await?;
        let needle = term.to_lowercase();
        let rows = self.rows.lock().unwrap().clone();
        Ok(rows
            .into_iter()
            .filter_map(Result::ok)
            .filter(|record| record.text.to_lowercase().contains(&needle))
            .collect())
    }
}

#[derive(Default)]
pub struct MemorySearchIndex {
    documents: Mutex<BTreeMap<i64, Record>>,
    schema_exists: AtomicBool,
    unreachable: AtomicBool,
    /// Accepts the schema step, then refuses every later connection.
    lost_after_schema: bool,
    rejected_ids: HashSet<i64>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MemorySearchIndex {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn rejecting(ids: &[i64]) -> Arc<Self> {
        Arc::new(Self {
            rejected_ids: ids.iter().copied().collect(),
            ..Self::default()
        })
    }

    pub fn lost_after_schema() -> Arc<Self> {
        Arc::new(Self {
            lost_after_schema: true,
            ..Self::default()
        })
    }

    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay: Some(delay),
            ..Self::default()
        })
    }

    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    async fn enter(&self) -> CoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(CoreError::Connection("connection refused".to_string()));
        }
        Ok(())
    }

    async fn enter_after_schema(&self) -> CoreResult<()> {
        self.enter().await?;
        if self.lost_after_schema {
            return Err(CoreError::Connection("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl SearchIndex for MemorySearchIndex {
    async fn ensure_schema(&self) -> CoreResult<SchemaOutcome> {
        self.enter().await?;
        if self.schema_exists.swap(true, Ordering::SeqCst) {
            Ok(SchemaOutcome::AlreadyExists)
        } else {
            Ok(SchemaOutcome::Created)
        }
    }

    async fn upsert(&self, record: &Record) -> CoreResult<()> {
        self.enter_after_schema().await?;
        if self.rejected_ids.contains(&record.id) {
            return Err(CoreError::Http(format!("mapper_parsing_exception id={}", record.id)));
        }
        self.documents
            .lock()
            .unwrap()
            .insert(record.id, record.clone());
        Ok(())
    }

    /// Ranks by number of matched query tokens, ties broken by id descending
    /// so relevance order differs from store order.
    async fn query(&self, term: &str, max_results: usize) -> CoreResult<Vec<Record>> {
        self.enter().await?;
        let tokens = term
            .split_whitespace()
            .map(str::to_lowercase)
            .collect::<Vec<_>>();

        let documents = self.documents.lock().unwrap();
        let mut scored = documents
            .values()
            .filter_map(|record| {
                let words = record
                    .text
                    .split_whitespace()
                    .map(str::to_lowercase)
                    .collect::<HashSet<_>>();
                let score = tokens.iter().filter(|token| words.contains(*token)).count();
                (score > 0).then(|| (score, record.clone()))
            })
            .collect::<Vec<_>>();

        scored.sort_by(|left, right| right.0.cmp(&left.0).then(right.1.id.cmp(&left.1.id)));
        Ok(scored
            .into_iter()
            .take(max_results)
            .map(|(_, record)| record)
            .collect())
    }

    async fn refresh(&self) -> CoreResult<()> {
        self.enter_after_schema().await
    }

    async fn document_count(&self) -> CoreResult<u64> {
        self.enter().await?;
        Ok(self.documents.lock().unwrap().len() as u64)
    }
}

pub fn ids(records: &[Record]) -> Vec<i64> {
    records.iter().map(|record| record.id).collect()
}
