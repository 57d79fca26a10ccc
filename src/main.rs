use anyhow::Context;
use axum::http::HeaderValue;
use axum_extra::extract::cookie::Key;
use std::sync::Arc;

use parrot_chat::{
    build_router,
    config::{self, AppConfig, SessionBackend},
    modules::session::crud::{MemorySessionStore, RedisSessionStore, SessionStore},
    services::ModelRegistry,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    config::logging::init("info");

    let config = AppConfig::from_env().context("failed to load config")?;

    let truncator = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || ModelRegistry::load_truncator(&config))
            .await
            .context("tokenizer loader panicked")?
            .context("failed to load paraphraser tokenizer")?
    };
    tracing::info!(max_input_tokens = truncator.max_tokens(), "paraphraser tokenizer loaded");

    let models = ModelRegistry::from_config(&config, truncator).context("failed to build model clients")?;
    tracing::info!(
        chat_model = %config.chat_model,
        ollama = %config.ollama_base_url,
        paraphraser = %config.paraphrase_model,
        candidates = config.paraphrase_candidates,
        "model clients ready"
    );

    let sessions: Arc<dyn SessionStore> = match &config.session_backend {
        SessionBackend::Memory => {
            tracing::info!("using in-memory session store");
            Arc::new(MemorySessionStore::new())
        }
        SessionBackend::Redis { uri } => {
            let redis = config::redis::connect(uri)
                .await
                .context("failed to connect to Redis")?;
            tracing::info!(ttl_secs = config.session_ttl_secs, "using Redis session store");
            Arc::new(RedisSessionStore::new(redis, config.session_ttl_secs))
        }
    };

    let cookie_key = match &config.session_secret {
        Some(secret) => Key::try_from(secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("invalid SESSION_SECRET: {e}"))?,
        None => {
            tracing::warn!("SESSION_SECRET not set; sessions will not survive a restart");
            Key::generate()
        }
    };

    let state = AppState {
        models,
        sessions,
        cookie_key,
    };

    let origin = HeaderValue::from_str(&config.allowed_origin).context("invalid ALLOWED_ORIGIN")?;
    let app = build_router(state, origin);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, allowed_origin = %config.allowed_origin, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
