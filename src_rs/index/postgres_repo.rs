// 목적:
// - PostgreSQL 기반 레코드 저장소 접근을 담당한다.
//
// 설명:
// - 전체 스캔과 ILIKE 부분 문자열 스캔을 제공한다(읽기 전용).
// - 테이블명은 실행 시 검증해 SQL 주입 위험을 줄이고, 검색어는 항상 bind로 전달한다.
// - 전체 스캔은 커서로 행을 하나씩 흘려보내며, 행 단위 디코딩 실패를 건너뛸 수 있도록 행별 결과를 돌려준다.
//
// 디자인 패턴:
// - 저장소 패턴(Repository Pattern).
//
// 참조:
// - src_rs/index/sql.rs
// - src_rs/core/backend.rs

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{Executor, PgPool, Row};

use crate::core::backend::{RecordStore, RowStream};
use crate::core::config::PostgresConfig;
use crate::core::errors::{CoreError, CoreResult};
use crate::core::model::Record;
use crate::index::sql::{to_substring_pattern, validate_identifier};

pub struct PostgresRecordStore {
    pool: PgPool,
    scan_all_sql: String,
    scan_matching_sql: String,
}

impl PostgresRecordStore {
    pub async fn connect(config: &PostgresConfig) -> CoreResult<Self> {
        validate_identifier(&config.table, "postgres.table")?;

        let statement_timeout_ms = config.statement_timeout_ms.max(1);
        let pool = PgPoolOptions::new()
            .min_connections(config.pool_min)
            .max_connections(config.pool_max.max(config.pool_min))
            .acquire_timeout(Duration::from_millis(config.connect_timeout_ms.max(1)))
            .after_connect(move |connection, _meta| {
                Box::pin(async move {
                    let statement = format!("SET statement_timeout = {}", statement_timeout_ms);
                    connection.execute(statement.as_str()).await?;
                    Ok(())
                })
            })
            .connect_with(config.connect_options())
            .await
            .map_err(|error| CoreError::Db(format!("Postgres 연결 실패: {}", error)))?;

        Ok(Self::from_pool(pool, &config.table))
    }

    /// 이미 만들어진 pool을 감싼다. 테이블명은 호출자가 검증한 값이어야 한다.
    pub fn from_pool(pool: PgPool, table: &str) -> Self {
        Self {
            pool,
            scan_all_sql: format!("SELECT id, text FROM {} ORDER BY id", table),
            scan_matching_sql: format!(
                "SELECT id, text FROM {} WHERE text ILIKE $1 ESCAPE '\\' ORDER BY id",
                table
            ),
        }
    }

    /// 연결 상태를 확인한다.
    pub async fn ping(&self) -> CoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|error| CoreError::Db(format!("Postgres ping 실패: {}", error)))?;
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PostgresRecordStore {
    fn scan_all(&self) -> RowStream<'_> {
        sqlx::query(&self.scan_all_sql)
            .fetch(&self.pool)
            .map(|fetched| {
                fetched
                    .map(map_record_row)
                    .map_err(|error| CoreError::Db(format!("전체 스캔 실패: {}", error)))
            })
            .boxed()
    }

    async fn scan_matching(&self, term: &str) -> CoreResult<Vec<Record>> {
        let rows = sqlx::query(&self.scan_matching_sql)
            .bind(to_substring_pattern(term))
            .fetch_all(&self.pool)
            .await
            .map_err(|error| CoreError::Db(format!("부분 문자열 스캔 실패: {}", error)))?;

        // 조회 경로에서는 디코딩 불가 행을 건너뛴다.
        Ok(rows
            .into_iter()
            .filter_map(|row| match map_record_row(row) {
                Ok(record) => Some(record),
                Err(error) => {
                    tracing::warn!(%error, "skipping undecodable row in scan search");
                    None
                }
            })
            .collect())
    }
}

fn map_record_row(row: PgRow) -> CoreResult<Record> {
    let id = row
        .try_get::<i64, _>("id")
        .or_else(|_| row.try_get::<i32, _>("id").map(i64::from))
        .map_err(|error| CoreError::Db(format!("record.id 파싱 실패: {}", error)))?;
    let text = row
        .try_get::<String, _>("text")
        .map_err(|error| CoreError::Db(format!("record.text 파싱 실패: {}", error)))?;

    Ok(Record { id, text })
}
