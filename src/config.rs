use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// Which backend the record store runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub store_backend: StoreBackend,
    pub redis_url: String,
    pub jwt_secret: String,
    pub auth_issuer: String,
    /// Origins allowed by CORS; ignored when `cors_allow_any_origin` is set.
    pub cors_allowed_origins: Vec<String>,
    pub cors_allow_any_origin: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            environment: "development".to_string(),
            log_level: "info".to_string(),
            log_json: false,
            store_backend: StoreBackend::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            jwt_secret: "change-me-in-production".to_string(),
            auth_issuer: "adeylink".to_string(),
            cors_allowed_origins: vec!["http://localhost:3000".to_string()],
            cors_allow_any_origin: false,
        }
    }
}

/// Loads configuration from defaults, then `config/{default,<env>}.toml`,
/// then `APP__*` environment variables (e.g. `APP__PORT=9090`).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let run_env = std::env::var("RUN_ENV").unwrap_or_else(|_| "development".into());
    let defaults = AppConfig::default();

    let config = Config::builder()
        .set_default("host", defaults.host)?
        .set_default("port", defaults.port as i64)?
        .set_default("environment", run_env.clone())?
        .set_default("log_level", defaults.log_level)?
        .set_default("log_json", defaults.log_json)?
        .set_default("store_backend", "memory")?
        .set_default("redis_url", defaults.redis_url)?
        .set_default("jwt_secret", defaults.jwt_secret)?
        .set_default("auth_issuer", defaults.auth_issuer)?
        .set_default("cors_allowed_origins", defaults.cors_allowed_origins)?
        .set_default("cors_allow_any_origin", defaults.cors_allow_any_origin)?
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{}", run_env)).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    config.try_deserialize()
}

/// Installs the global tracing subscriber. `RUST_LOG` wins over the
/// configured level when set.
pub fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = AppConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(!config.cors_allow_any_origin);
    }

    #[test]
    fn load_without_files_uses_defaults() {
        let config = load_config().expect("default config should load");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.auth_issuer, "adeylink");
    }
}
