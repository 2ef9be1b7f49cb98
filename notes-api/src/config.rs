use std::sync::OnceLock;

use serde::Deserialize;

#[derive(Deserialize, Debug, PartialEq, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Comma separated list of allowed origins, `*` allows any origin.
    /// Empty means no cross-origin request is allowed.
    #[serde(default)]
    pub cors_allowed_origins: String,

    // tracing
    #[serde(default)]
    pub log_format: LogFormat,
    #[serde(default)]
    pub tokio_console: bool,

    // build
    #[serde(default = "default_local")]
    pub source: String,
    #[serde(default = "default_local")]
    pub git_commit: String,
    #[serde(default = "default_local")]
    pub pipeline_id: String,
    #[serde(default = "default_local")]
    pub version: String,
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    4000
}

fn default_database_url() -> String {
    "sqlite.db".into()
}

fn default_local() -> String {
    "local".into()
}

/// Allowed CORS origins as configured.
#[derive(Debug, PartialEq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

impl Config {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env::<Self>()
    }

    pub fn cors_origins(&self) -> CorsOrigins {
        let origins = self
            .cors_allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(String::from)
            .collect::<Vec<_>>();

        if origins.iter().any(|origin| origin == "*") {
            CorsOrigins::Any
        } else {
            CorsOrigins::List(origins)
        }
    }
}

static CONFIG: OnceLock<Config> = OnceLock::new();

pub fn config() -> &'static Config {
    CONFIG.get_or_init(|| Config::from_env().expect("invalid configuration in environment"))
}

#[cfg(test)]
pub fn config_override<F>(override_config: F) -> &'static Config
where
    F: FnOnce(Config) -> Config,
{
    CONFIG.get_or_init(|| override_config(Config::from_env().expect("invalid configuration in environment")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_origins(origins: &str) -> Config {
        Config {
            host: default_host(),
            port: default_port(),
            database_url: default_database_url(),
            cors_allowed_origins: origins.into(),
            log_format: LogFormat::Compact,
            tokio_console: false,
            source: default_local(),
            git_commit: default_local(),
            pipeline_id: default_local(),
            version: default_local(),
        }
    }

    #[test]
    fn empty_origins_allow_nothing() {
        assert_eq!(with_origins("").cors_origins(), CorsOrigins::List(vec![]));
        assert_eq!(with_origins(" , ").cors_origins(), CorsOrigins::List(vec![]));
    }

    #[test]
    fn origins_are_split_and_trimmed() {
        assert_eq!(
            with_origins("https://a.example, https://b.example").cors_origins(),
            CorsOrigins::List(vec!["https://a.example".into(), "https://b.example".into()])
        );
    }

    #[test]
    fn wildcard_allows_any_origin() {
        assert_eq!(with_origins("https://a.example,*").cors_origins(), CorsOrigins::Any);
    }
}
