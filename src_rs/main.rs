// 목적:
// - 레코드 검색 서버 바이너리를 실행한다.
//
// 설명:
// - 설정 검증 -> Postgres 연결 확인 -> 인덱스 클라이언트 생성 -> 동기화 task 기동 -> HTTP 서빙 순서로 처리한다.
// - 동기화는 서빙 시작을 막지 않는다.
//
// 참조:
// - src_rs/core/config.rs
// - src_rs/core/index_sync.rs
// - src_rs/api/mod.rs

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use record_search::api::create_router;
use record_search::api::handlers::AppState;
use record_search::core::config::AppConfig;
use record_search::core::errors::{CoreError, CoreResult};
use record_search::core::index_sync::{spawn_initial_sync, IndexSynchronizer};
use record_search::core::query_router::QueryRouter;
use record_search::index::elastic::ElasticSearchIndex;
use record_search::index::postgres_repo::PostgresRecordStore;

#[tokio::main]
async fn main() -> CoreResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("record_search=info,tower_http=info")),
        )
        .init();

    let config = AppConfig::parse();
    config.validate()?;

    let store = PostgresRecordStore::connect(&config.postgres).await?;
    store.ping().await?;
    tracing::info!("Connected to database successfully");

    let index = ElasticSearchIndex::new(&config.search_index)?;
    tracing::info!(url = %config.search_index.url, "search index client ready");

    let store = Arc::new(store);
    let index = Arc::new(index);

    let synchronizer = IndexSynchronizer::new(store.clone(), index.clone())
        .with_concurrency(config.sync_concurrency)
        .with_progress_every(config.sync_progress_every);
    let sync_task = spawn_initial_sync(synchronizer);

    let router = QueryRouter::new(store, index)
        .with_max_results(config.indexed_max_results)
        .with_deadline(config.query_timeout());

    let app = create_router(AppState {
        router,
        sync_state: sync_task.state,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .map_err(|error| {
            CoreError::Runtime(format!("{} 바인드 실패: {}", config.bind_addr, error))
        })?;
    tracing::info!("Server starting on {}...", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_signal())
        .await
        .map_err(|error| CoreError::Runtime(format!("HTTP 서버 오류: {}", error)))?;

    sync_task.handle.abort();
    tracing::info!("Server stopped");
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
