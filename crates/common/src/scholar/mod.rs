//! Semantic Scholar graph client
//!
//! One [`GraphClient`] is built per run. It owns the HTTP session that carries
//! the `x-api-key` header and is shared by every graph call:
//! - title search (top match or none)
//! - paper detail (citing and referenced papers)
//! - batch lookup of external ids (ARXIV:..., DOI:...)
//!
//! All calls go through the rate-limit backoff in [`crate::retry`].

use crate::config::GraphConfig;
use crate::errors::{Result, ScoutError};
use crate::metrics::RequestTimer;
use crate::models::{Neighbors, Paper, PaperId};
use crate::retry::{retry_rate_limited, BackoffPolicy, Sleeper, TokioSleeper};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-api-key";

const NEIGHBOR_FIELDS: &str =
    "citations.paperId,citations.title,references.paperId,references.title";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<PaperData>,
}

#[derive(Debug, Deserialize)]
struct PaperData {
    #[serde(rename = "paperId")]
    paper_id: Option<String>,
    title: Option<String>,
}

impl PaperData {
    fn into_paper(self) -> Option<Paper> {
        let id = self.paper_id?;
        Some(Paper::new(id, self.title.unwrap_or_default()))
    }
}

#[derive(Debug, Deserialize)]
struct PaperDetail {
    #[serde(default)]
    citations: Option<Vec<PaperData>>,
    #[serde(default)]
    references: Option<Vec<PaperData>>,
}

#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    ids: &'a [String],
}

/// Client for the Semantic Scholar Graph API
pub struct GraphClient {
    http: reqwest::Client,
    base_url: String,
    policy: BackoffPolicy,
    batch_policy: BackoffPolicy,
    batch_size: usize,
    sleeper: Arc<dyn Sleeper>,
}

impl GraphClient {
    /// Build the shared session. Fails when no API key is configured.
    pub fn new(config: &GraphConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| ScoutError::MissingApiKey {
                var: crate::API_KEY_ENV.to_string(),
            })?;

        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key).map_err(|e| ScoutError::Configuration {
            message: format!("API key is not a valid header value: {}", e),
        })?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .user_agent(concat!("editorscout/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let initial = Duration::from_millis(config.initial_backoff_ms);

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            policy: BackoffPolicy::attempts(config.max_attempts, initial),
            batch_policy: BackoffPolicy::wait_ceiling(
                Duration::from_secs(config.batch_max_wait_secs),
                initial,
            ),
            batch_size: config.batch_size,
            sleeper: Arc::new(TokioSleeper),
        })
    }

    /// Replace the sleeper used between rate-limited attempts
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Maximum number of ids sent in one batch lookup
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// GET `url` on the shared session, backing off while rate limited.
    ///
    /// The last response is returned whatever its status.
    pub async fn request_with_retry(
        &self,
        endpoint: &'static str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<reqwest::Response> {
        let timer = RequestTimer::new(endpoint);
        let response = retry_rate_limited(&self.policy, self.sleeper.as_ref(), || {
            self.http.get(url).query(query).send()
        })
        .await?;
        timer.finish(response.status().as_u16());
        Ok(response)
    }

    /// Best search match for a title, if the service finds any
    pub async fn search_top_match(&self, title: &str) -> Result<Option<Paper>> {
        let url = format!("{}/paper/search", self.base_url);
        let response = self
            .request_with_retry("search", &url, &[("query", title), ("fields", "title")])
            .await?;

        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), query = %title, "HTTP error {}", response.status().as_u16());
            return Ok(None);
        }

        let result: SearchResponse = match response.json().await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, query = %title, "Undecodable search response");
                return Ok(None);
            }
        };

        Ok(result
            .data
            .into_iter()
            .next()
            .and_then(PaperData::into_paper))
    }

    /// Papers citing and referenced by `paper_id`.
    ///
    /// A non-success status or an undecodable body yields no neighbors.
    pub async fn neighbors(&self, paper_id: &PaperId) -> Result<Neighbors> {
        let url = format!("{}/paper/{}", self.base_url, paper_id);
        let response = self
            .request_with_retry("paper", &url, &[("fields", NEIGHBOR_FIELDS)])
            .await?;

        if !response.status().is_success() {
            debug!(paper_id = %paper_id, status = response.status().as_u16(), "No neighbors");
            return Ok(Neighbors::default());
        }

        let detail: PaperDetail = match response.json().await {
            Ok(detail) => detail,
            Err(e) => {
                debug!(paper_id = %paper_id, error = %e, "Undecodable paper detail");
                return Ok(Neighbors::default());
            }
        };

        let collect = |rows: Option<Vec<PaperData>>| -> Vec<Paper> {
            rows.unwrap_or_default()
                .into_iter()
                .filter_map(PaperData::into_paper)
                .collect()
        };

        Ok(Neighbors {
            citing: collect(detail.citations),
            referenced: collect(detail.references),
        })
    }

    /// Resolve external ids to graph ids.
    ///
    /// At most [`batch_size`](Self::batch_size) ids are sent. Rate limiting is
    /// retried until the cumulative wait ceiling; unresolved ids and
    /// non-success answers are dropped.
    pub async fn resolve_batch(&self, external_ids: &[String]) -> Result<Vec<PaperId>> {
        let ids = &external_ids[..external_ids.len().min(self.batch_size)];
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/paper/batch", self.base_url);
        let body = BatchRequest { ids };

        let timer = RequestTimer::new("batch");
        let response = retry_rate_limited(&self.batch_policy, self.sleeper.as_ref(), || {
            self.http
                .post(&url)
                .query(&[("fields", "paperId,title")])
                .json(&body)
                .send()
        })
        .await?;
        timer.finish(response.status().as_u16());

        if !response.status().is_success() {
            warn!(status = response.status().as_u16(), ids = ids.len(), "Batch lookup failed");
            return Ok(Vec::new());
        }

        let rows: Vec<Option<PaperData>> = match response.json().await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "Undecodable batch response");
                return Ok(Vec::new());
            }
        };

        Ok(rows
            .into_iter()
            .flatten()
            .filter_map(|row| row.paper_id.map(PaperId::from))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct NoSleep;

    #[async_trait]
    impl Sleeper for NoSleep {
        async fn sleep(&self, _duration: Duration) {}
    }

    fn client_for(server: &MockServer) -> GraphClient {
        let config = GraphConfig {
            base_url: server.uri(),
            api_key: Some("test-key".to_string()),
            ..GraphConfig::default()
        };
        GraphClient::new(&config).unwrap().with_sleeper(Arc::new(NoSleep))
    }

    #[test]
    fn test_requires_api_key() {
        let err = GraphClient::new(&GraphConfig::default()).err().unwrap();
        assert!(matches!(err, ScoutError::MissingApiKey { .. }));
    }

    #[tokio::test]
    async fn test_search_takes_top_match() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/paper/search"))
            .and(query_param("query", "Attention Is All You Need"))
            .and(header(API_KEY_HEADER, "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 2,
                "data": [
                    {"paperId": "P1", "title": "Attention Is All You Need"},
                    {"paperId": "P7", "title": "Attention Is Not All You Need"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let paper = client_for(&server)
            .search_top_match("Attention Is All You Need")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(paper.id().as_str(), "P1");
        assert_eq!(paper.title(), "Attention Is All You Need");
        assert_eq!(paper.path_depth(), 0);
    }

    #[tokio::test]
    async fn test_search_without_results_or_with_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/paper/search"))
            .and(query_param("query", "nothing"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total": 0, "data": []})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/paper/search"))
            .and(query_param("query", "broken"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.search_top_match("nothing").await.unwrap().is_none());
        assert!(client.search_top_match("broken").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rate_limited_request_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/paper/P1"))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/paper/P1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "paperId": "P1",
                "citations": [{"paperId": "P2", "title": "Citing"}],
                "references": []
            })))
            .mount(&server)
            .await;

        let neighbors = client_for(&server).neighbors(&PaperId::from("P1")).await.unwrap();
        assert_eq!(neighbors.citing.len(), 1);
        assert_eq!(neighbors.citing[0].id().as_str(), "P2");
    }

    #[tokio::test]
    async fn test_neighbors_skip_rows_without_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/paper/P1"))
            .and(query_param("fields", NEIGHBOR_FIELDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "paperId": "P1",
                "citations": [
                    {"paperId": "P2", "title": "Citing"},
                    {"paperId": null, "title": "Unknown"}
                ],
                "references": [{"paperId": "P3", "title": null}]
            })))
            .mount(&server)
            .await;

        let neighbors = client_for(&server).neighbors(&PaperId::from("P1")).await.unwrap();
        assert_eq!(neighbors.citing.len(), 1);
        assert_eq!(neighbors.referenced.len(), 1);
        assert_eq!(neighbors.referenced[0].title(), "");
    }

    #[tokio::test]
    async fn test_neighbors_on_failure_are_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/paper/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/paper/garbled"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.neighbors(&PaperId::from("missing")).await.unwrap().is_empty());
        assert!(client.neighbors(&PaperId::from("garbled")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_batch_drops_unresolved_ids() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/paper/batch"))
            .and(query_param("fields", "paperId,title"))
            .and(body_json(json!({"ids": ["ARXIV:1706.03762", "DOI:10.1/x"]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"paperId": "P1", "title": "Attention Is All You Need"},
                null
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let ids = client_for(&server)
            .resolve_batch(&["ARXIV:1706.03762".to_string(), "DOI:10.1/x".to_string()])
            .await
            .unwrap();
        assert_eq!(ids, vec![PaperId::from("P1")]);
    }

    #[tokio::test]
    async fn test_empty_batch_sends_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(0)
            .mount(&server)
            .await;

        let ids = client_for(&server).resolve_batch(&[]).await.unwrap();
        assert!(ids.is_empty());
    }
}
