use crate::identity::UserId;
use crate::utils::get_env_with_prefix;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Default stacking order of the widget.
pub const DEFAULT_Z_INDEX: i64 = 9999;

/// Default query parameter the widget writes.
pub const DEFAULT_PARAM_NAME: &str = "_switch_user";

/// Screen corner the widget is pinned to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Position {
    #[default]
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
}

impl Position {
    /// Parse a position name. Names are matched exactly; anything else is
    /// bottom-right.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "bottom-left" => Self::BottomLeft,
            "top-right" => Self::TopRight,
            "top-left" => Self::TopLeft,
            _ => Self::BottomRight,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BottomRight => "bottom-right",
            Self::BottomLeft => "bottom-left",
            Self::TopRight => "top-right",
            Self::TopLeft => "top-left",
        }
    }

    /// Offsets placing the container in its corner.
    #[must_use]
    pub fn css(&self) -> &'static str {
        match self {
            Self::BottomRight => "bottom: 20px; right: 20px;",
            Self::BottomLeft => "bottom: 20px; left: 20px;",
            Self::TopRight => "top: 20px; right: 20px;",
            Self::TopLeft => "top: 20px; left: 20px;",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Position {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for Position {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<Position> for String {
    fn from(value: Position) -> Self {
        value.as_str().to_string()
    }
}

/// Display settings for the switcher widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// Corner the widget is pinned to
    #[serde(default, deserialize_with = "lenient_position")]
    pub position: Position,

    /// CSS z-index of the container
    #[serde(default = "default_z_index", deserialize_with = "lenient_z_index")]
    pub z_index: i64,

    /// Query parameter carrying the chosen identifier
    #[serde(default = "default_param_name", deserialize_with = "lenient_param_name")]
    pub param_name: String,

    /// Identifier to highlight instead of the one stored in the session
    #[serde(default, deserialize_with = "lenient_current_user_id")]
    pub current_user_id: Option<UserId>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            position: Position::default(),
            z_index: DEFAULT_Z_INDEX,
            param_name: default_param_name(),
            current_user_id: None,
        }
    }
}

impl DisplayConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn position(mut self, position: impl Into<Position>) -> Self {
        self.position = position.into();
        self
    }

    #[must_use]
    pub fn z_index(mut self, z_index: i64) -> Self {
        self.z_index = z_index;
        self
    }

    #[must_use]
    pub fn param_name(mut self, name: impl Into<String>) -> Self {
        self.param_name = name.into();
        self
    }

    /// Highlight `id` regardless of what the session holds.
    #[must_use]
    pub fn current_user_id(mut self, id: impl Into<UserId>) -> Self {
        self.current_user_id = Some(id.into());
        self
    }

    /// The parameter name, or the default when blank.
    #[must_use]
    pub fn effective_param_name(&self) -> &str {
        if self.param_name.trim().is_empty() {
            DEFAULT_PARAM_NAME
        } else {
            &self.param_name
        }
    }

    /// Load display configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(position) = get_env_with_prefix("SWITCHER_POSITION") {
            config.position = Position::parse(&position);
        }

        if let Some(z_index) = get_env_with_prefix("SWITCHER_Z_INDEX") {
            if let Ok(z_index) = z_index.trim().parse() {
                config.z_index = z_index;
            }
        }

        if let Some(name) = get_env_with_prefix("SWITCHER_PARAM_NAME") {
            config.param_name = name;
        }

        config
    }
}

fn default_z_index() -> i64 {
    DEFAULT_Z_INDEX
}

fn default_param_name() -> String {
    DEFAULT_PARAM_NAME.to_string()
}

/// Either a well-typed value or anything else, which is ignored.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Value(T),
    Other(serde::de::IgnoredAny),
}

impl<T> Lenient<T> {
    fn or_else(self, fallback: impl FnOnce() -> T) -> T {
        match self {
            Self::Value(value) => value,
            Self::Other(_) => fallback(),
        }
    }
}

fn lenient_position<'de, D>(deserializer: D) -> Result<Position, D::Error>
where
    D: Deserializer<'de>,
{
    let name = Lenient::<String>::deserialize(deserializer)?.or_else(String::new);
    Ok(Position::parse(&name))
}

fn lenient_z_index<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Lenient::deserialize(deserializer)?.or_else(default_z_index))
}

fn lenient_param_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Lenient::deserialize(deserializer)?.or_else(default_param_name))
}

fn lenient_current_user_id<'de, D>(deserializer: D) -> Result<Option<UserId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Lenient::<UserId>::deserialize(deserializer)? {
        Lenient::Value(id) => Some(id),
        Lenient::Other(_) => None,
    })
}
