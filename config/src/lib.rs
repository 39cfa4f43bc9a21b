//! Configuration file for the `isochrone` binary.
//!
//! Lives at `~/.isochrone/config.toml`. Every section is optional and a missing
//! file is not an error. String values accept `${VAR}` references.
//!
//! ```toml
//! [api]
//! key = "${GOOGLE_MAPS_API_KEY}"
//!
//! [search]
//! number_of_angles = 12
//! tolerance = 0.1
//!
//! [travel]
//! mode = "transit"
//! avoid = ["tolls", "ferries"]
//! departure_now = false
//!
//! [google]
//! base_url = "https://maps.googleapis.com/"
//! timeout_secs = 30
//! min_call_interval_ms = 100
//! max_retries = 2
//! ```

use std::env;
use std::path::{Path, PathBuf};

use isochrone_types::{ApiKey, Avoid, TravelMode, TravelOptions};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IsochroneConfig {
    pub api: Option<ApiConfig>,
    pub search: Option<SearchConfig>,
    pub travel: Option<TravelConfig>,
    pub google: Option<GoogleConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    pub key: Option<String>,
}

// Manual Debug impl to prevent leaking the API key in logs.
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let key = if self.key.is_some() { "[REDACTED]" } else { "None" };
        f.debug_struct("ApiConfig").field("key", &key).finish()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchConfig {
    pub number_of_angles: Option<usize>,
    /// Minutes.
    pub tolerance: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TravelConfig {
    pub mode: Option<TravelMode>,
    /// Replaces the default avoid list. An empty array avoids nothing.
    pub avoid: Option<Vec<Avoid>>,
    pub departure_now: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GoogleConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub min_call_interval_ms: Option<u64>,
    pub max_retries: Option<u32>,
}

impl IsochroneConfig {
    /// Loads the default config file. `Ok(None)` when there is none.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Loads `path`. `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file");
            return Ok(None);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// `[travel]` overrides applied on top of [`TravelOptions::default`].
    #[must_use]
    pub fn travel_options(&self) -> TravelOptions {
        let mut options = TravelOptions::default();
        if let Some(travel) = &self.travel {
            if let Some(mode) = travel.mode {
                options.mode = mode;
            }
            if let Some(avoid) = &travel.avoid {
                options.avoid.clone_from(avoid);
            }
            if let Some(departure_now) = travel.departure_now {
                options.departure_now = departure_now;
            }
        }
        options
    }

    /// `[google] base_url` with `${VAR}` references expanded.
    #[must_use]
    pub fn base_url(&self) -> Option<String> {
        self.google
            .as_ref()
            .and_then(|g| g.base_url.as_deref())
            .map(expand_env_vars)
            .filter(|url| !url.trim().is_empty())
    }
}

/// Resolves the API key: `GOOGLE_MAPS_API_KEY` first, then `[api] key`.
#[must_use]
pub fn resolve_api_key(config: Option<&IsochroneConfig>) -> Option<ApiKey> {
    resolve_api_key_with(env::var(ApiKey::ENV_VAR).ok(), config)
}

fn resolve_api_key_with(
    from_env: Option<String>,
    config: Option<&IsochroneConfig>,
) -> Option<ApiKey> {
    if let Some(key) = from_env.and_then(|raw| ApiKey::new(raw).ok()) {
        return Some(key);
    }
    let raw = config?.api.as_ref()?.key.as_deref()?;
    ApiKey::new(expand_env_vars(raw)).ok()
}

pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".isochrone").join("config.toml"))
}
