use serde::Deserialize;

use crate::error::BackendError;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_NAME: &str = "quarry";

/// Where the store lives and which database to use.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub host: String,
    /// `None` lets the driver pick its default port.
    pub port: Option<u16>,
    pub name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: None,
            name: DEFAULT_NAME.into(),
        }
    }
}

impl Settings {
    /// Read `QUARRY_HOST`, `QUARRY_PORT` and `QUARRY_NAME`, falling back to the
    /// defaults for unset variables.
    pub fn from_env() -> Result<Self, BackendError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, BackendError> {
        let defaults = Self::default();
        let host = lookup("QUARRY_HOST").unwrap_or(defaults.host);
        let name = lookup("QUARRY_NAME").unwrap_or(defaults.name);
        let port = match lookup("QUARRY_PORT").filter(|p| !p.is_empty()) {
            Some(raw) => Some(
                raw.parse()
                    .map_err(|e| BackendError::Config(format!("QUARRY_PORT={raw}: {e}")))?,
            ),
            None => None,
        };
        Ok(Self { host, port, name })
    }
}
