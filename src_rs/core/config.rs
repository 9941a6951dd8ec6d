// 목적:
// - 프로세스 설정을 CLI 인자/환경 변수에서 읽고 검증한다.
//
// 설명:
// - 모든 항목은 환경 변수(DB_HOST, ELASTICSEARCH_URL 등)로도 지정할 수 있다.
// - 테이블/인덱스 이름은 SQL/URL 경로에 들어가므로 식별자 규칙을 검증한다.
//
// 디자인 패턴:
// - 설정 객체(Configuration Object) + 실패 빠르게(Fail Fast).
//
// 참조:
// - src_rs/index/sql.rs
// - src_rs/main.rs

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Args, Parser};
use sqlx::postgres::PgConnectOptions;

use crate::core::errors::{CoreError, CoreResult};
use crate::index::sql::validate_identifier;

#[derive(Debug, Clone, Args)]
pub struct PostgresConfig {
    #[arg(long = "db-host", env = "DB_HOST", default_value = "localhost")]
    pub host: String,

    #[arg(long = "db-port", env = "DB_PORT", default_value_t = 5432)]
    pub port: u16,

    #[arg(long = "db-user", env = "DB_USER", default_value = "postgres")]
    pub user: String,

    #[arg(
        long = "db-password",
        env = "DB_PASSWORD",
        default_value = "",
        hide_env_values = true
    )]
    pub password: String,

    #[arg(long = "db-name", env = "DB_NAME", default_value = "postgres")]
    pub database: String,

    /// Table holding the `id`/`text` records
    #[arg(long = "record-table", env = "RECORD_TABLE", default_value = "search_data")]
    pub table: String,

    #[arg(long = "db-pool-min", env = "DB_POOL_MIN", default_value_t = 1)]
    pub pool_min: u32,

    #[arg(long = "db-pool-max", env = "DB_POOL_MAX", default_value_t = 10)]
    pub pool_max: u32,

    #[arg(
        long = "db-connect-timeout-ms",
        env = "DB_CONNECT_TIMEOUT_MS",
        default_value_t = 5_000
    )]
    pub connect_timeout_ms: u64,

    #[arg(
        long = "db-statement-timeout-ms",
        env = "DB_STATEMENT_TIMEOUT_MS",
        default_value_t = 30_000
    )]
    pub statement_timeout_ms: u64,
}

impl PostgresConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .database(&self.database);

        if self.password.is_empty() {
            options
        } else {
            options.password(&self.password)
        }
    }

    fn validate(&self) -> CoreResult<()> {
        require_non_empty(&self.host, "DB_HOST")?;
        require_non_empty(&self.user, "DB_USER")?;
        require_non_empty(&self.database, "DB_NAME")?;
        validate_identifier(&self.table, "RECORD_TABLE")?;
        require_positive(self.connect_timeout_ms, "DB_CONNECT_TIMEOUT_MS")?;
        require_positive(self.statement_timeout_ms, "DB_STATEMENT_TIMEOUT_MS")?;

        if self.pool_max == 0 {
            return Err(CoreError::InvalidConfig(
                "DB_POOL_MAX는 1 이상이어야 합니다".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Args)]
pub struct SearchIndexConfig {
    #[arg(
        long = "elasticsearch-url",
        env = "ELASTICSEARCH_URL",
        default_value = "http://localhost:9200"
    )]
    pub url: String,

    #[arg(long = "index-name", env = "INDEX_NAME", default_value = "search_data")]
    pub index_name: String,

    #[arg(long = "index-timeout-ms", env = "INDEX_TIMEOUT_MS", default_value_t = 10_000)]
    pub timeout_ms: u64,
}

impl SearchIndexConfig {
    fn validate(&self) -> CoreResult<()> {
        require_non_empty(&self.url, "ELASTICSEARCH_URL")?;
        require_positive(self.timeout_ms, "INDEX_TIMEOUT_MS")?;

        // Elasticsearch 인덱스 이름은 소문자만 허용한다.
        validate_identifier(&self.index_name, "INDEX_NAME")?;
        if self.index_name.chars().any(|ch| ch.is_ascii_uppercase()) {
            return Err(CoreError::InvalidConfig(format!(
                "INDEX_NAME은 소문자여야 합니다: {}",
                self.index_name
            )));
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "record-search",
    about = "Record search over Postgres scan and Elasticsearch mirror"
)]
pub struct AppConfig {
    #[arg(long = "bind-addr", env = "BIND_ADDR", default_value = "0.0.0.0:8080")]
    pub bind_addr: SocketAddr,

    /// Deadline applied to every query backend call
    #[arg(long = "query-timeout-ms", env = "QUERY_TIMEOUT_MS", default_value_t = 5_000)]
    pub query_timeout_ms: u64,

    #[arg(
        long = "indexed-max-results",
        env = "INDEXED_MAX_RESULTS",
        default_value_t = 100
    )]
    pub indexed_max_results: usize,

    /// Upserts in flight during the startup sync
    #[arg(long = "sync-concurrency", env = "SYNC_CONCURRENCY", default_value_t = 8)]
    pub sync_concurrency: usize,

    #[arg(
        long = "sync-progress-every",
        env = "SYNC_PROGRESS_EVERY",
        default_value_t = 5_000
    )]
    pub sync_progress_every: u64,

    #[command(flatten)]
    pub postgres: PostgresConfig,

    #[command(flatten)]
    pub search_index: SearchIndexConfig,
}

impl AppConfig {
    pub fn validate(&self) -> CoreResult<()> {
        require_positive(self.query_timeout_ms, "QUERY_TIMEOUT_MS")?;
        require_positive(self.indexed_max_results as u64, "INDEXED_MAX_RESULTS")?;
        require_positive(self.sync_concurrency as u64, "SYNC_CONCURRENCY")?;
        require_positive(self.sync_progress_every, "SYNC_PROGRESS_EVERY")?;

        self.postgres.validate()?;
        self.search_index.validate()
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

fn require_non_empty(value: &str, field_name: &str) -> CoreResult<()> {
    if value.trim().is_empty() {
        return Err(CoreError::InvalidConfig(format!(
            "{}는 비어 있을 수 없습니다",
            field_name
        )));
    }
    Ok(())
}

fn require_positive(value: u64, field_name: &str) -> CoreResult<()> {
    if value == 0 {
        return Err(CoreError::InvalidConfig(format!(
            "{}는 1 이상이어야 합니다",
            field_name
        )));
    }
    Ok(())
}
