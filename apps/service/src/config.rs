//! Service configuration.
//!
//! Loaded once at startup from a TOML file; read-only afterwards. The
//! Discord token may come from the file or the `DISCORD_TOKEN` environment
//! variable (the environment wins, so tokens can stay out of the file).

use std::path::Path;
use std::{env, fs};

use botup::Target;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_PATH: &str = "botup.toml";
const TOKEN_ENV: &str = "DISCORD_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: std::io::Error },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("no Discord token: set [discord] token or the {TOKEN_ENV} environment variable")]
    MissingToken,
    #[error("metrics port must be between 1 and 65535")]
    InvalidPort,
    #[error("no [[targets]] configured")]
    NoTargets,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub discord: Discord,
    #[serde(default)]
    pub metrics: Metrics,
    #[serde(default)]
    pub targets: Vec<Target>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Discord {
    #[serde(default)]
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Metrics {
    pub bind: String,
    pub port: u16,
}

impl Default for Metrics {
    fn default() -> Self {
        Self { bind: "0.0.0.0".into(), port: 8080 }
    }
}

impl Config {
    /// Load and validate the configuration from `path`, defaulting to
    /// `./botup.toml`. Any failure here is fatal at startup.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let mut config: Self = toml::from_str(&raw)?;
        if let Ok(token) = env::var(TOKEN_ENV) {
            config.discord.token = token;
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.discord.token.is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.metrics.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        if self.targets.is_empty() {
            return Err(ConfigError::NoTargets);
        }
        Ok(())
    }

    /// Bind address for the metrics endpoint
    pub fn metrics_addr(&self) -> String {
        format!("{}:{}", self.metrics.bind, self.metrics.port)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn write_config(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const VALID: &str = r#"
        [discord]
        token = "secret"

        [metrics]
        bind = "127.0.0.1"
        port = 9100

        [[targets]]
        bot = 111
        channel = 222
        keyword = "ping"
        timeout = 10

        [[targets]]
        bot = 333
        channel = 222
        keyword = "status"
        timeout = 5
    "#;

    #[test]
    fn loads_targets_in_order() {
        let file = write_config(VALID);
        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.discord.token, "secret");
        assert_eq!(config.metrics_addr(), "127.0.0.1:9100");
        assert_eq!(config.targets.len(), 2);
        assert_eq!(config.targets[0].bot, 111);
        assert_eq!(config.targets[1].keyword, "status");
    }

    #[test]
    fn metrics_section_is_optional() {
        let file = write_config(
            r#"
            [discord]
            token = "secret"

            [[targets]]
            bot = 1
            channel = 2
            keyword = "ping"
            timeout = 10
            "#,
        );
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.metrics_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn missing_token_is_rejected() {
        let file = write_config(
            r#"
            [[targets]]
            bot = 1
            channel = 2
            keyword = "ping"
            timeout = 10
            "#,
        );
        assert!(matches!(Config::load(Some(file.path())), Err(ConfigError::MissingToken)));
    }

    #[test]
    fn empty_target_list_is_rejected() {
        let file = write_config("[discord]\ntoken = \"secret\"\n");
        assert!(matches!(Config::load(Some(file.path())), Err(ConfigError::NoTargets)));
    }

    #[test]
    fn zero_port_is_rejected() {
        let file = write_config(
            r#"
            [discord]
            token = "secret"

            [metrics]
            port = 0

            [[targets]]
            bot = 1
            channel = 2
            keyword = "ping"
            timeout = 10
            "#,
        );
        assert!(matches!(Config::load(Some(file.path())), Err(ConfigError::InvalidPort)));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        assert!(matches!(
            Config::load(Some(Path::new("/nonexistent/botup.toml"))),
            Err(ConfigError::Read { .. })
        ));
    }
}
