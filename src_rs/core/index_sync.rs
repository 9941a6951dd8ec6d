// 목적:
// - 기본 저장소의 레코드를 검색 인덱스로 미러링한다.
//
// 설명:
// - 스키마 보장 -> 전체 스캔(스트림) -> id 기준 upsert -> refresh 순서로 처리한다.
// - 스캔 행은 도착하는 대로 upsert하며, 테이블 전체를 메모리에 올리지 않는다.
// - 행 단위 실패(디코딩 실패, 인덱스가 문서를 거부)는 집계 후 건너뛴다.
// - 저장소 스트림 오류나 인덱스 연결 실패(CoreError::Connection)는 실행을 중단한다.
// - upsert 병렬 처리 수는 semaphore로 제한한다.
// - 시작 시 1회 실행은 별도 task로 띄우고 상태를 watch 채널로 공개한다.
//
// 디자인 패턴:
// - 파이프라인(Pipeline) + 제한 병렬 처리(Bounded Concurrency).
//
// 참조:
// - src_rs/core/backend.rs
// - src_rs/api/handlers.rs

use std::sync::Arc;

use futures::StreamExt;
use serde::Serialize;
use tokio::sync::{watch, OwnedSemaphorePermit, Semaphore};
use tokio::task::{JoinError, JoinHandle, JoinSet};

use crate::core::backend::{RecordStore, SchemaOutcome, SearchIndex};
use crate::core::errors::{CoreError, CoreResult};

pub const DEFAULT_SYNC_CONCURRENCY: usize = 8;
pub const DEFAULT_PROGRESS_EVERY: u64 = 5_000;

/// 미러링 1회 실행 결과.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub scanned: u64,
    pub indexed: u64,
    pub failed: u64,
    pub schema_created: bool,
}

/// 시작 시 동기화 작업의 공개 상태.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SyncState {
    Pending,
    Running,
    Completed { report: SyncReport },
    Failed { message: String },
}

impl SyncState {
    pub fn is_completed(&self) -> bool {
        matches!(self, SyncState::Completed { .. })
    }
}

pub struct IndexSynchronizer {
    store: Arc<dyn RecordStore>,
    index: Arc<dyn SearchIndex>,
    concurrency: usize,
    progress_every: u64,
}

impl IndexSynchronizer {
    pub fn new(store: Arc<dyn RecordStore>, index: Arc<dyn SearchIndex>) -> Self {
        Self {
            store,
            index,
            concurrency: DEFAULT_SYNC_CONCURRENCY,
            progress_every: DEFAULT_PROGRESS_EVERY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_progress_every(mut self, progress_every: u64) -> Self {
        self.progress_every = progress_every.max(1);
        self
    }

    /// 인덱스 스키마를 보장한다. 이미 존재하면 AlreadyExists로 성공한다.
    pub async fn ensure_schema(&self) -> CoreResult<SchemaOutcome> {
        let outcome = self.index.ensure_schema().await?;
        match outcome {
            SchemaOutcome::Created => tracing::info!("search index created"),
            SchemaOutcome::AlreadyExists => tracing::info!("search index already exists"),
        }
        Ok(outcome)
    }

    /// 전체 레코드를 인덱스로 미러링한다.
    pub async fn mirror_all(&self) -> CoreResult<SyncReport> {
        tracing::info!("Syncing data to search index...");

        let schema = self.ensure_schema().await?;

        let mut report = SyncReport {
            schema_created: schema == SchemaOutcome::Created,
            ..SyncReport::default()
        };

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        // drop 시 남은 upsert task는 모두 abort된다.
        let mut join_set = JoinSet::new();
        let mut rows = self.store.scan_all();

        while let Some(fetched) = rows.next().await {
            let row = fetched.inspect_err(|error| {
                tracing::error!(%error, scanned = report.scanned, "record scan failed");
            })?;
            report.scanned += 1;

            let record = match row {
                Ok(record) => record,
                Err(error) => {
                    report.failed += 1;
                    tracing::warn!(%error, "skipping undecodable row");
                    continue;
                }
            };

            let permit = semaphore.clone().acquire_owned().await.map_err(|error| {
                CoreError::Runtime(format!("동기화 semaphore 획득 실패: {}", error))
            })?;
            let index = Arc::clone(&self.index);

            join_set.spawn(async move {
                let _permit: OwnedSemaphorePermit = permit;
                let result = index.upsert(&record).await;
                (record.id, result)
            });

            while let Some(joined) = join_set.try_join_next() {
                self.tally(joined, &mut report)?;
            }
        }
        drop(rows);

        while let Some(joined) = join_set.join_next().await {
            self.tally(joined, &mut report)?;
        }

        if let Err(error) = self.index.refresh().await {
            tracing::warn!(%error, "search index refresh failed after sync");
        }

        tracing::info!(
            indexed = report.indexed,
            failed = report.failed,
            "Sync complete: {} records indexed",
            report.indexed
        );
        Ok(report)
    }

    /// upsert 결과를 집계한다. 인덱스 연결 실패는 Err로 돌려 실행을 중단시킨다.
    fn tally(
        &self,
        joined: Result<(i64, CoreResult<()>), JoinError>,
        report: &mut SyncReport,
    ) -> CoreResult<()> {
        match joined {
            Ok((_, Ok(()))) => {
                report.indexed += 1;
                if report.indexed % self.progress_every == 0 {
                    tracing::info!("Synced {} records", report.indexed);
                }
            }
            Ok((id, Err(error))) if error.is_connection() => {
                tracing::error!(
                    id,
                    %error,
                    indexed = report.indexed,
                    "search index unreachable"
                );
                return Err(error);
            }
            Ok((id, Err(error))) => {
                report.failed += 1;
                tracing::warn!(id, %error, "skipping record that failed to index");
            }
            Err(error) => {
                report.failed += 1;
                tracing::warn!(%error, "upsert task did not complete");
            }
        }
        Ok(())
    }
}

/// 백그라운드로 띄운 동기화 작업.
pub struct SyncTask {
    pub handle: JoinHandle<CoreResult<SyncReport>>,
    pub state: watch::Receiver<SyncState>,
}

/// 동기화를 요청 처리 경로 밖에서 1회 실행한다.
pub fn spawn_initial_sync(synchronizer: IndexSynchronizer) -> SyncTask {
    let (state_tx, state_rx) = watch::channel(SyncState::Pending);

    let handle = tokio::spawn(async move {
        state_tx.send_replace(SyncState::Running);

        // 내부 task의 panic도 Failed 상태로 공개되도록 한 단계 감싼다.
        let result = match tokio::spawn(async move { synchronizer.mirror_all().await }).await {
            Ok(result) => result,
            Err(error) => Err(CoreError::Runtime(format!(
                "동기화 task가 비정상 종료되었습니다: {}",
                error
            ))),
        };

        match &result {
            Ok(report) => {
                state_tx.send_replace(SyncState::Completed {
                    report: report.clone(),
                });
            }
            Err(error) => {
                tracing::error!(%error, "sync aborted; serving with previous index state");
                state_tx.send_replace(SyncState::Failed {
                    message: error.to_string(),
                });
            }
        }
        result
    });

    SyncTask {
        handle,
        state: state_rx,
    }
}
