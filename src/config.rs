use serde::{Deserialize, Serialize};

use crate::impersonation::ImpersonationConfig;
use crate::render::{DisplayConfig, Position};
use crate::session::SessionConfig;
use crate::utils::get_env_with_prefix;

/// Main configuration for switchboard
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub impersonation: ImpersonationConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_json")]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_json(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_json() -> bool {
    false
}

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    pub fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.config.session.default_ttl_seconds = seconds;
        self
    }

    pub fn with_session_key(mut self, key: impl Into<String>) -> Self {
        self.config.impersonation.session_key = key.into();
        self
    }

    pub fn with_position(mut self, position: impl Into<Position>) -> Self {
        self.config.display.position = position.into();
        self
    }

    pub fn with_z_index(mut self, z_index: i64) -> Self {
        self.config.display.z_index = z_index;
        self
    }

    pub fn with_param_name(mut self, name: impl Into<String>) -> Self {
        self.config.display.param_name = name.into();
        self
    }

    pub fn with_display(mut self, display: DisplayConfig) -> Self {
        self.config.display = display;
        self
    }

    /// Override settings from environment variables
    ///
    /// Every variable may carry the `SWITCHBOARD_` prefix:
    /// `LOG_LEVEL`, `LOG_JSON`, `SESSION_TTL_SECONDS`,
    /// `IMPERSONATION_SESSION_KEY`, `SWITCHER_POSITION`,
    /// `SWITCHER_Z_INDEX` and `SWITCHER_PARAM_NAME`.
    pub fn from_env(mut self) -> Self {
        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }

        if let Some(json) = get_env_with_prefix("LOG_JSON") {
            if let Ok(json) = json.parse() {
                self.config.logging.json = json;
            }
        }

        if let Some(ttl) = get_env_with_prefix("SESSION_TTL_SECONDS") {
            if let Ok(seconds) = ttl.parse() {
                self.config.session.default_ttl_seconds = seconds;
            }
        }

        if let Some(key) = get_env_with_prefix("IMPERSONATION_SESSION_KEY") {
            if !key.trim().is_empty() {
                self.config.impersonation.session_key = key;
            }
        }

        if let Some(position) = get_env_with_prefix("SWITCHER_POSITION") {
            self.config.display.position = Position::parse(&position);
        }

        if let Some(z_index) = get_env_with_prefix("SWITCHER_Z_INDEX") {
            if let Ok(z_index) = z_index.trim().parse() {
                self.config.display.z_index = z_index;
            }
        }

        if let Some(name) = get_env_with_prefix("SWITCHER_PARAM_NAME") {
            self.config.display.param_name = name;
        }

        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
