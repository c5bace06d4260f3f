use std::collections::HashMap;

use anyhow::Result;

pub const DEFAULT_LLM_URL: &str = "https://ai.gateway.lovable.dev/v1/chat/completions";
pub const DEFAULT_LLM_MODEL: &str = "google/gemini-2.5-flash";

/// Full application configuration.
/// Values come from the process environment, falling back to `.env`.
#[derive(Debug, Clone)]
pub struct Config {
    // Web
    pub web_bind: String,
    pub web_port: u16,
    /// Built frontend served for any path the API does not handle.
    pub static_dir: String,

    // Upstream model
    pub llm_url: String,
    /// Bearer credential. Empty is allowed at startup; each call then fails.
    pub llm_api_key: String,
    pub llm_model: String,
    pub llm_temperature: f32,
    /// Per-request timeout in seconds (0 = rely on the network stack).
    pub llm_timeout_s: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            web_bind: "0.0.0.0".into(),
            web_port: 3131,
            static_dir: "frontend/dist".into(),
            llm_url: DEFAULT_LLM_URL.into(),
            llm_api_key: String::new(),
            llm_model: DEFAULT_LLM_MODEL.into(),
            llm_temperature: 0.7,
            llm_timeout_s: 0,
        }
    }
}

fn parse_dotenv(contents: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            let v = v.trim().trim_matches('"');
            map.insert(k.trim().to_string(), v.to_string());
        }
    }
    map
}

fn read_dotenv() -> HashMap<String, String> {
    std::fs::read_to_string(".env")
        .map(|c| parse_dotenv(&c))
        .unwrap_or_default()
}

fn get(key: &str, dotenv: &HashMap<String, String>) -> Option<String> {
    std::env::var(key).ok().or_else(|| dotenv.get(key).cloned())
}

fn get_str(key: &str, dotenv: &HashMap<String, String>, default: &str) -> String {
    get(key, dotenv).unwrap_or_else(|| default.to_string())
}

fn get_parsed<T: std::str::FromStr>(key: &str, dotenv: &HashMap<String, String>, default: T) -> T {
    get(key, dotenv)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_sources(&read_dotenv()))
    }

    fn from_sources(dotenv: &HashMap<String, String>) -> Self {
        let d = Self::default();
        let config = Self {
            web_bind: get_str("WEB_BIND", dotenv, &d.web_bind),
            web_port: get_parsed("WEB_PORT", dotenv, d.web_port),
            static_dir: get_str("STATIC_DIR", dotenv, &d.static_dir),
            llm_url: get_str("LLM_GATEWAY_URL", dotenv, &d.llm_url),
            llm_api_key: get_str("LLM_GATEWAY_API_KEY", dotenv, ""),
            llm_model: get_str("LLM_MODEL", dotenv, &d.llm_model),
            llm_temperature: get_parsed("LLM_TEMPERATURE", dotenv, d.llm_temperature),
            llm_timeout_s: get_parsed("LLM_TIMEOUT_S", dotenv, d.llm_timeout_s),
        };
        if config.llm_api_key.is_empty() {
            tracing::warn!("LLM_GATEWAY_API_KEY is not set; verdict requests will fail");
        }
        config
    }
}
