use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::auth::config::AuthConfig;
use crate::pagination::PaginationConfig;

/// Top-level service configuration.
///
/// Sources, later ones winning:
/// 1. built-in defaults
/// 2. `storydesk.toml` (or `.yaml`/`.json`) in the working directory, if present
/// 3. `STORYDESK__*` environment variables, e.g. `STORYDESK__MONGODB__URI`
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub mongodb: MongoConfig,
    pub auth: AuthConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path the story routes are nested under. Empty or `/` mounts at the root.
    pub api_prefix: String,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl AppConfig {
    /// Load configuration from defaults, the optional config file and the
    /// process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(
            Environment::with_prefix("STORYDESK")
                .separator("__")
                .try_parsing(true),
        )
    }

    fn load_with(environment: Environment) -> Result<Self, ConfigError> {
        let pagination = PaginationConfig::default();

        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("server.api_prefix", "/api")?
            .set_default("mongodb.uri", "mongodb://localhost:27017")?
            .set_default("mongodb.database", "storydesk")?
            .set_default("auth.jwt_secret", "dev-secret")?
            .set_default("pagination.default_limit", pagination.default_limit as i64)?
            .set_default("pagination.max_limit", pagination.max_limit as i64)?
            .add_source(File::with_name("storydesk").required(false))
            .add_source(environment)
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn environment(vars: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        Environment::with_prefix("STORYDESK")
            .separator("__")
            .try_parsing(true)
            .source(Some(source))
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::load_with(environment(&[])).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.api_prefix, "/api");
        assert_eq!(config.mongodb.database, "storydesk");
        assert_eq!(config.pagination, PaginationConfig::default());
        assert_eq!(config.server.bind_address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_environment_overrides() {
        let config = AppConfig::load_with(environment(&[
            ("STORYDESK__SERVER__PORT", "8081"),
            ("STORYDESK__MONGODB__URI", "mongodb://db:27017"),
            ("STORYDESK__AUTH__JWT_SECRET", "from-env"),
            ("STORYDESK__PAGINATION__MAX_LIMIT", "20"),
        ]))
        .unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.mongodb.uri, "mongodb://db:27017");
        assert_eq!(config.auth.jwt_secret, "from-env");
        assert_eq!(config.pagination.max_limit, 20);
        assert_eq!(config.pagination.default_limit, 10);
    }
}
