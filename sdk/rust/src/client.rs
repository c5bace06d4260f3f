use std::time::Duration;

use async_trait::async_trait;
use judge_core::samples::SampleInfo;
use judge_core::{GatewayError, Verdict, VerdictGateway, VerdictRequest};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3131";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Sample listing entry as the server reports it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteSample {
    pub name: String,
    pub filename: String,
    pub title: String,
}

impl From<&SampleInfo> for RemoteSample {
    fn from(s: &SampleInfo) -> Self {
        Self {
            name: s.name.to_string(),
            filename: s.filename.to_string(),
            title: s.title.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct VerdictEnvelope {
    verdict: Verdict,
}

/// HTTP client for a running judge server.
///
/// Implements [`VerdictGateway`], so a `CaseController<JudgeClient>` drives a
/// case against a remote server exactly as it would against the in-process
/// model client.
#[derive(Debug, Clone)]
pub struct JudgeClient {
    base_url: String,
    http: reqwest::Client,
}

impl JudgeClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Result<Self, ClientError> {
        self.http = reqwest::Client::builder()
            .timeout(Duration::from_secs(secs))
            .build()?;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_checked(&self, path: &str) -> Result<reqwest::Response, ClientError> {
        let resp = self.http.get(self.url(path)).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }

    pub async fn health(&self) -> Result<Value, ClientError> {
        Ok(self.get_checked("/api/health").await?.json().await?)
    }

    pub async fn list_samples(&self) -> Result<Vec<RemoteSample>, ClientError> {
        Ok(self.get_checked("/api/samples").await?.json().await?)
    }

    pub async fn fetch_sample(&self, name: &str) -> Result<String, ClientError> {
        let path = format!("/api/samples/{}", urlencoding::encode(name));
        Ok(self.get_checked(&path).await?.text().await?)
    }
}

fn rejection(status: u16, body: &str) -> GatewayError {
    match serde_json::from_str::<Value>(body) {
        Ok(v) => GatewayError::Rejected {
            status,
            message: v
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string(),
            details: v.get("details").cloned(),
        },
        Err(_) => GatewayError::Rejected {
            status,
            message: body.trim().to_string(),
            details: None,
        },
    }
}

#[async_trait]
impl VerdictGateway for JudgeClient {
    async fn request_verdict(&self, request: &VerdictRequest) -> Result<Verdict, GatewayError> {
        debug!(case_id = %request.case_id(), kind = request.kind(), "posting verdict request");
        let resp = self
            .http
            .post(self.url("/api/verdict"))
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        if !status.is_success() {
            warn!(case_id = %request.case_id(), status = %status, "judge service rejected request");
            return Err(rejection(status.as_u16(), &body));
        }

        serde_json::from_str::<VerdictEnvelope>(&body)
            .map(|env| env.verdict)
            .map_err(|e| GatewayError::UpstreamShape(e.to_string()))
    }
}
