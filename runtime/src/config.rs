use crate::error::{NavigatorError, NavigatorResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_DEFAULT_SCHEME: &str = "WAYMARK_DEFAULT_SCHEME";
pub const ENV_ALLOWED_SCHEMES: &str = "WAYMARK_ALLOWED_SCHEMES";
pub const ENV_SNAPSHOT_LOGGING: &str = "WAYMARK_SNAPSHOT_LOGGING";

/// Navigator settings, loadable from TOML and overridable from the environment.
///
/// ```toml
/// default_scheme = "myapp"
/// allowed_schemes = ["myapp", "https"]
/// snapshot_logging = true
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Scheme used by `Navigator::uri_for` when the caller gives none.
    pub default_scheme: String,
    /// Schemes accepted by `handle_deep_link`. Empty accepts any.
    pub allowed_schemes: Vec<String>,
    /// Log every committed tree as JSON at `trace` level.
    pub snapshot_logging: bool,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            default_scheme: "app".to_string(),
            allowed_schemes: Vec::new(),
            snapshot_logging: false,
        }
    }
}

impl NavigatorConfig {
    pub fn from_toml_str(text: &str) -> NavigatorResult<Self> {
        toml::from_str(text).map_err(|e| NavigatorError::Config(e.to_string()))
    }

    pub fn from_file(path: impl AsRef<Path>) -> NavigatorResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| NavigatorError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Defaults overlaid with `WAYMARK_*` environment variables.
    pub fn from_env() -> NavigatorResult<Self> {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(self) -> NavigatorResult<Self> {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable source; used directly by tests so
    /// they never touch the process environment.
    pub fn with_overrides<F>(mut self, lookup: F) -> NavigatorResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(scheme) = lookup(ENV_DEFAULT_SCHEME) {
            let scheme = scheme.trim();
            if scheme.is_empty() {
                return Err(NavigatorError::Config(format!(
                    "{ENV_DEFAULT_SCHEME} must not be empty"
                )));
            }
            self.default_scheme = scheme.to_ascii_lowercase();
        }
        if let Some(list) = lookup(ENV_ALLOWED_SCHEMES) {
            self.allowed_schemes = list
                .split(',')
                .map(|s| s.trim().to_ascii_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(flag) = lookup(ENV_SNAPSHOT_LOGGING) {
            self.snapshot_logging = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                other => {
                    return Err(NavigatorError::Config(format!(
                        "{ENV_SNAPSHOT_LOGGING}: unrecognised value {other:?}"
                    )));
                }
            };
        }
        Ok(self)
    }
}
