// 목적:
// - Elasticsearch 검색 인덱스에 대한 HTTP 어댑터를 제공한다.
//
// 설명:
// - 인덱스 생성(매핑 포함), id 기준 문서 upsert, match 질의, refresh, count를 담당한다.
// - 질의 본문은 serde_json으로 구조적으로 만들며 검색어를 문자열 보간하지 않는다.
// - 이미 존재하는 인덱스(resource_already_exists_exception)는 성공으로 취급한다.
// - 요청 전송 실패는 CoreError::Connection, 비정상 상태 응답은 CoreError::Http로 구분한다.
//
// 디자인 패턴:
// - 어댑터(Adapter).
//
// 참조:
// - src_rs/core/backend.rs
// - src_rs/core/index_sync.rs

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::core::backend::{SchemaOutcome, SearchIndex};
use crate::core::config::SearchIndexConfig;
use crate::core::errors::{CoreError, CoreResult};
use crate::core::model::Record;
use crate::index::sql::validate_identifier;

const ALREADY_EXISTS_ERROR: &str = "resource_already_exists_exception";

#[derive(Clone)]
pub struct ElasticSearchIndex {
    client: Client,
    base_url: String,
    index_name: String,
}

impl ElasticSearchIndex {
    pub fn new(config: &SearchIndexConfig) -> CoreResult<Self> {
        if config.url.trim().is_empty() {
            return Err(CoreError::InvalidConfig(
                "search_index.url은 비어 있을 수 없습니다".to_string(),
            ));
        }

        if config.timeout_ms == 0 {
            return Err(CoreError::InvalidConfig(
                "search_index.timeout_ms는 1 이상이어야 합니다".to_string(),
            ));
        }

        validate_identifier(&config.index_name, "search_index.index_name")?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|error| {
                CoreError::Http(format!("HTTP 클라이언트 생성 실패: {}", error))
            })?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            index_name: config.index_name.clone(),
        })
    }

    fn index_url(&self, suffix: &str) -> String {
        format!("{}/{}{}", self.base_url, self.index_name, suffix)
    }
}

#[async_trait]
impl SearchIndex for ElasticSearchIndex {
    async fn ensure_schema(&self) -> CoreResult<SchemaOutcome> {
        let response = self
            .client
            .put(self.index_url(""))
            .json(&schema_definition())
            .send()
            .await
            .map_err(|error| {
                CoreError::Connection(format!("인덱스 생성 요청 실패: {}", error))
            })?;

        let (status, body) = read_body(response).await?;
        if status.is_success() {
            return Ok(SchemaOutcome::Created);
        }

        if is_already_exists(&body) {
            return Ok(SchemaOutcome::AlreadyExists);
        }

        Err(CoreError::Http(format!(
            "인덱스 생성 실패: status={}, body={}",
            status, body
        )))
    }

    async fn upsert(&self, record: &Record) -> CoreResult<()> {
        let url = self.index_url(&format!("/_doc/{}", record.document_id()));
        let response = self
            .client
            .put(url)
            .json(record)
            .send()
            .await
            .map_err(|error| {
                CoreError::Connection(format!("문서 upsert 요청 실패: {}", error))
            })?;

        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            return Err(CoreError::Http(format!(
                "문서 upsert 실패: id={}, status={}, body={}",
                record.id, status, body
            )));
        }

        Ok(())
    }

    async fn query(&self, term: &str, max_results: usize) -> CoreResult<Vec<Record>> {
        let response = self
            .client
            .post(self.index_url("/_search"))
            .json(&match_query(term, max_results))
            .send()
            .await
            .map_err(|error| {
                CoreError::Connection(format!("검색 요청 실패: {}", error))
            })?;

        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            return Err(CoreError::Http(format!(
                "검색 상태 오류: status={}, body={}",
                status, body
            )));
        }

        parse_search_hits(&body)
    }

    async fn refresh(&self) -> CoreResult<()> {
        let response = self
            .client
            .post(self.index_url("/_refresh"))
            .send()
            .await
            .map_err(|error| {
                CoreError::Connection(format!("refresh 요청 실패: {}", error))
            })?;

        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            return Err(CoreError::Http(format!(
                "refresh 실패: status={}, body={}",
                status, body
            )));
        }

        Ok(())
    }

    async fn document_count(&self) -> CoreResult<u64> {
        #[derive(Deserialize)]
        struct CountResponse {
            count: u64,
        }

        let response = self
            .client
            .get(self.index_url("/_count"))
            .send()
            .await
            .map_err(|error| {
                CoreError::Connection(format!("count 요청 실패: {}", error))
            })?;

        let (status, body) = read_body(response).await?;
        if !status.is_success() {
            return Err(CoreError::Http(format!(
                "count 실패: status={}, body={}",
                status, body
            )));
        }

        let parsed: CountResponse = serde_json::from_str(&body).map_err(|error| {
            CoreError::Serialization(format!("count 응답 파싱 실패: {}", error))
        })?;
        Ok(parsed.count)
    }
}

async fn read_body(response: Response) -> CoreResult<(StatusCode, String)> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|error| CoreError::Http(format!("응답 본문 읽기 실패: {}", error)))?;
    Ok((status, body))
}

fn schema_definition() -> Value {
    json!({
        "mappings": {
            "properties": {
                "id": { "type": "long" },
                "text": { "type": "text" }
            }
        }
    })
}

fn match_query(term: &str, max_results: usize) -> Value {
    json!({
        "query": {
            "match": {
                "text": term
            }
        },
        "size": max_results
    })
}

fn is_already_exists(body: &str) -> bool {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/type")
                .and_then(Value::as_str)
                .map(|kind| kind == ALREADY_EXISTS_ERROR)
        })
        .unwrap_or(false)
}

fn parse_search_hits(body: &str) -> CoreResult<Vec<Record>> {
    #[derive(Deserialize)]
    struct Hit {
        #[serde(rename = "_source")]
        source: Record,
    }

    #[derive(Deserialize)]
    struct Hits {
        hits: Vec<Hit>,
    }

    #[derive(Deserialize)]
    struct SearchBody {
        hits: Hits,
    }

    let parsed: SearchBody = serde_json::from_str(body).map_err(|error| {
        CoreError::Serialization(format!("검색 응답 파싱 실패: {}", error))
    })?;

    Ok(parsed.hits.hits.into_iter().map(|hit| hit.source).collect())
}
