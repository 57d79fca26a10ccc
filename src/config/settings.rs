use axum::http::HeaderValue;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Minimum length accepted for `SESSION_SECRET`; cookie signing keys are 64 bytes.
pub const MIN_SECRET_LEN: usize = 64;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} is required but not set")]
    Missing(&'static str),
    #[error("invalid {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionBackend {
    Memory,
    Redis { uri: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origin: String,
    pub ollama_base_url: String,
    pub chat_model: String,
    pub paraphrase_base_url: String,
    pub paraphrase_model: String,
    pub paraphrase_api_key: Option<String>,
    pub paraphrase_tokenizer: Option<String>,
    pub paraphrase_candidates: u32,
    pub model_timeout: Duration,
    pub session_backend: SessionBackend,
    pub session_ttl_secs: u64,
    pub session_secret: Option<String>,
}

impl AppConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let allowed_origin = var_or("ALLOWED_ORIGIN", "http://localhost:5173");
        HeaderValue::from_str(&allowed_origin).map_err(|e| ConfigError::Invalid {
            key: "ALLOWED_ORIGIN",
            reason: e.to_string(),
        })?;

        let paraphrase_candidates: u32 = parse("PARAPHRASE_CANDIDATES", &var_or("PARAPHRASE_CANDIDATES", "4"))?;
        if paraphrase_candidates == 0 {
            return Err(ConfigError::Invalid {
                key: "PARAPHRASE_CANDIDATES",
                reason: "must be at least 1".to_string(),
            });
        }

        let session_backend = match var_or("SESSION_BACKEND", "memory").to_lowercase().as_str() {
            "memory" => SessionBackend::Memory,
            "redis" => SessionBackend::Redis {
                uri: lookup("REDIS_URI").ok_or(ConfigError::Missing("REDIS_URI"))?,
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "SESSION_BACKEND",
                    reason: format!("expected `memory` or `redis`, got `{other}`"),
                })
            }
        };

        let session_secret = lookup("SESSION_SECRET").filter(|s| !s.is_empty());
        if let Some(secret) = &session_secret {
            if secret.len() < MIN_SECRET_LEN {
                return Err(ConfigError::Invalid {
                    key: "SESSION_SECRET",
                    reason: format!("must be at least {MIN_SECRET_LEN} bytes"),
                });
            }
        }

        Ok(Self {
            host: var_or("HOST", "127.0.0.1"),
            port: parse("PORT", &var_or("PORT", "5000"))?,
            allowed_origin,
            ollama_base_url: trim_slash(var_or("OLLAMA_BASE_URL", "http://localhost:11434")),
            chat_model: var_or("CHAT_MODEL", "llama2"),
            paraphrase_base_url: trim_slash(var_or(
                "PARAPHRASE_BASE_URL",
                "https://api-inference.huggingface.co",
            )),
            paraphrase_model: var_or("PARAPHRASE_MODEL", "Ateeqq/Text-Rewriter-Paraphraser"),
            paraphrase_api_key: lookup("PARAPHRASE_API_KEY").filter(|k| !k.is_empty()),
            paraphrase_tokenizer: lookup("PARAPHRASE_TOKENIZER").filter(|p| !p.is_empty()),
            paraphrase_candidates,
            model_timeout: Duration::from_secs(parse("MODEL_TIMEOUT_SECS", &var_or("MODEL_TIMEOUT_SECS", "120"))?),
            session_backend,
            session_ttl_secs: parse("SESSION_TTL_SECS", &var_or("SESSION_TTL_SECS", "86400"))?,
            session_secret,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T>(key: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_match_local_setup() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.bind_addr(), "127.0.0.1:5000");
        assert_eq!(cfg.allowed_origin, "http://localhost:5173");
        assert_eq!(cfg.chat_model, "llama2");
        assert_eq!(cfg.paraphrase_model, "Ateeqq/Text-Rewriter-Paraphraser");
        assert_eq!(cfg.paraphrase_candidates, 4);
        assert_eq!(cfg.model_timeout, Duration::from_secs(120));
        assert_eq!(cfg.session_backend, SessionBackend::Memory);
        assert!(cfg.session_secret.is_none());
        assert!(cfg.paraphrase_api_key.is_none());
        assert!(cfg.paraphrase_tokenizer.is_none());
    }

    #[test]
    fn trailing_slash_is_stripped_from_base_urls() {
        let cfg = load(&[("OLLAMA_BASE_URL", "http://gpu-box:11434/")]).unwrap();
        assert_eq!(cfg.ollama_base_url, "http://gpu-box:11434");
    }

    #[test]
    fn redis_backend_requires_uri() {
        let err = load(&[("SESSION_BACKEND", "redis")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("REDIS_URI")));

        let cfg = load(&[("SESSION_BACKEND", "Redis"), ("REDIS_URI", "redis://127.0.0.1/")]).unwrap();
        assert_eq!(
            cfg.session_backend,
            SessionBackend::Redis { uri: "redis://127.0.0.1/".to_string() }
        );
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let err = load(&[("SESSION_BACKEND", "postgres")]).unwrap_err();
        assert!(err.to_string().contains("SESSION_BACKEND"));
    }

    #[test]
    fn short_secret_is_rejected() {
        let err = load(&[("SESSION_SECRET", "your_secret_key")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SESSION_SECRET", .. }));

        let long = "k".repeat(MIN_SECRET_LEN);
        let cfg = load(&[("SESSION_SECRET", long.as_str())]).unwrap();
        assert_eq!(cfg.session_secret.as_deref(), Some(long.as_str()));
    }

    #[test]
    fn bad_numbers_are_reported_with_their_key() {
        let err = load(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().starts_with("invalid PORT"));

        let err = load(&[("PARAPHRASE_CANDIDATES", "0")]).unwrap_err();
        assert!(err.to_string().contains("PARAPHRASE_CANDIDATES"));
    }
}
