//! HTTP client helpers for tests.

use std::time::Duration;

use ragcite::cache::RAGCITE_CACHE_HEADER;
use ragcite::pipeline::{AskRequest, AskResponse, ErrorResponse};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct TestClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug)]
pub enum AskResult {
    Answered { response: AskResponse, cache_header: String },
    Failed(ErrorResponse),
}

#[derive(Debug, thiserror::Error)]
pub enum TestClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {0}: {1}")]
    UnexpectedStatus(u16, String),
}

impl TestClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub async fn ask(&self, question: &str) -> Result<AskResult, TestClientError> {
        let resp = self
            .client
            .post(self.url("/ask"))
            .json(&AskRequest {
                question: question.to_string(),
            })
            .send()
            .await?;

        match resp.status().as_u16() {
            200 => {
                let cache_header = resp
                    .headers()
                    .get(RAGCITE_CACHE_HEADER)
                    .and_then(|h| h.to_str().ok())
                    .unwrap_or("unknown")
                    .to_string();
                Ok(AskResult::Answered {
                    response: resp.json().await?,
                    cache_header,
                })
            }
            500 => Ok(AskResult::Failed(resp.json().await?)),
            status => {
                let body = resp.text().await.unwrap_or_default();
                Err(TestClientError::UnexpectedStatus(status, body))
            }
        }
    }

    pub async fn get_json(&self, path: &str) -> Result<(u16, serde_json::Value), TestClientError> {
        let resp = self.client.get(self.url(path)).send().await?;
        let status = resp.status().as_u16();
        Ok((status, resp.json().await?))
    }
}
