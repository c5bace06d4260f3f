use std::sync::Arc;
use std::time::Instant;

use judge_agent::ChatCompletionsJudge;
use judge_core::{config::Config, VerdictGateway};
use tokio::sync::broadcast;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod logging;
mod routes;

use logging::{BroadcastLayer, LogRing};

// ── AppState ──────────────────────────────────────────────────────────────

pub struct AppState {
    pub judge: Arc<dyn VerdictGateway>,
    pub start_time: Instant,
    pub log_tx: broadcast::Sender<String>,
    pub log_ring: LogRing,
}

// ── main ──────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (log_tx, _) = broadcast::channel::<String>(1024);
    let log_ring: LogRing = Arc::default();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "judge_server=info,judge_agent=info,tower_http=debug".into());
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(BroadcastLayer::new(log_tx.clone(), Arc::clone(&log_ring)));
    if std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    let config = Config::from_env()?;
    info!(
        url = %config.llm_url,
        model = %config.llm_model,
        timeout_s = config.llm_timeout_s,
        "AI gateway configured"
    );
    let judge: Arc<dyn VerdictGateway> = Arc::new(ChatCompletionsJudge::from_config(&config));

    let state = Arc::new(AppState {
        judge,
        start_time: Instant::now(),
        log_tx,
        log_ring,
    });

    let app = routes::router(state, &config.static_dir);

    let addr = format!("{}:{}", config.web_bind, config.web_port);
    info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
