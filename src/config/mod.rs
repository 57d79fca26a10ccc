pub mod logging;
pub mod redis;
pub mod settings;

pub use settings::{AppConfig, ConfigError, SessionBackend};
