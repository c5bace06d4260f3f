use std::time::Duration;

use async_trait::async_trait;
use judge_core::config::Config;
use judge_core::extract::decode_verdict;
use judge_core::{GatewayError, Verdict, VerdictGateway, VerdictRequest};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::instruction::build_prompt;

/// Calls an OpenAI-compatible chat completions endpoint and decodes the
/// model's reply into a [`Verdict`].
///
/// Holds no case state. The API key is checked per call so the service can
/// start without one and report the problem on each verdict request instead.
pub struct ChatCompletionsJudge {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    /// 0 disables the client-side timeout.
    pub timeout_secs: u64,
    http: reqwest::Client,
}

impl ChatCompletionsJudge {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.7,
            timeout_secs: 0,
            http: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.llm_url, &config.llm_api_key, &config.llm_model)
            .with_temperature(config.llm_temperature)
            .with_timeout(config.llm_timeout_s)
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        let mut builder = reqwest::Client::builder();
        if secs > 0 {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        // Builder only fails on TLS backend init; keep the default client then.
        if let Ok(client) = builder.build() {
            self.http = client;
        }
        self
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl VerdictGateway for ChatCompletionsJudge {
    async fn request_verdict(&self, request: &VerdictRequest) -> Result<Verdict, GatewayError> {
        request.validate()?;
        if self.api_key.trim().is_empty() {
            warn!(case_id = %request.case_id(), "LLM gateway API key is not configured");
            return Err(GatewayError::MissingCredential);
        }

        let prompt = build_prompt(request);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            temperature: self.temperature,
        };

        info!(
            case_id = %request.case_id(),
            kind = request.kind(),
            language = request.language().code(),
            model = %self.model,
            "requesting verdict"
        );

        let response = match self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) if e.is_timeout() => {
                warn!(
                    case_id = %request.case_id(),
                    timeout_secs = self.timeout_secs,
                    "AI gateway request timed out"
                );
                return Err(GatewayError::Transport(format!(
                    "timed out after {}s",
                    self.timeout_secs
                )));
            },
            Err(e) => {
                warn!(case_id = %request.case_id(), "AI gateway request failed: {}", e);
                return Err(GatewayError::Transport(e.to_string()));
            },
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                case_id = %request.case_id(),
                status = %status,
                "AI gateway returned non-200: {}",
                body
            );
            return Err(GatewayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            warn!(case_id = %request.case_id(), "failed to parse AI gateway response: {}", e);
            GatewayError::UpstreamShape(e.to_string())
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| {
                warn!(case_id = %request.case_id(), "AI gateway response has no message content");
                GatewayError::UpstreamShape("missing choices[0].message.content".into())
            })?;

        let verdict = decode_verdict(&content).map_err(|e| {
            warn!(
                case_id = %request.case_id(),
                reply_chars = content.chars().count(),
                "could not decode verdict: {}",
                e
            );
            GatewayError::Reply(e)
        })?;

        info!(
            case_id = %request.case_id(),
            kind = request.kind(),
            confidence = verdict.confidence,
            bias = %verdict.bias.label(),
            "verdict received"
        );
        Ok(verdict)
    }
}
