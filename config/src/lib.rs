//! `~/.excuse/config.toml` loading and startup settings resolution.
//!
//! The file is optional. Every string value may reference environment variables
//! with `${VAR}` syntax; missing variables expand to the empty string.

use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::Deserialize;
use thiserror::Error;

use excuse_types::{ApiKey, ModelName, ModelParseError};

/// Output language used when the config does not name one.
pub const DEFAULT_LANGUAGE: &str = "English";

/// Environment variables consulted for the API key, in order, after the config file.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "GOOGLE_API_KEY"];

#[derive(Debug, Default, Deserialize)]
pub struct ExcuseConfig {
    pub app: Option<AppConfig>,
    pub api_keys: Option<ApiKeys>,
    pub google: Option<GoogleConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
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

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    pub model: Option<String>,
    /// Natural language the generated message is written in.
    pub language: Option<String>,
    #[serde(default)]
    pub high_contrast: bool,
    /// Use ASCII-only glyphs for markers and spinners.
    #[serde(default)]
    pub ascii_only: bool,
}

#[derive(Default, Deserialize)]
pub struct ApiKeys {
    pub google: Option<String>,
}

// Manual Debug impl to prevent leaking API keys in logs.
impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let google = if self.google.is_some() {
            "[REDACTED]"
        } else {
            "None"
        };
        f.debug_struct("ApiKeys").field("google", &google).finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GoogleConfig {
    /// Override for the generation endpoint (local mock servers, proxies).
    pub base_url: Option<String>,
}

pub fn expand_env_vars(value: &str) -> String {
    expand_env_vars_with(value, |name| env::var(name).ok())
}

/// `${VAR}` expansion against an arbitrary lookup. Unclosed references are kept verbatim.
pub fn expand_env_vars_with(value: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        if !name.is_empty() {
            out.push_str(&lookup(name).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

impl ExcuseConfig {
    /// Load the user config. `Ok(None)` when there is no home directory or no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file");
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config at {:?}: {}", path, source);
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        toml::from_str(&content).map_err(|source| {
            tracing::warn!("Failed to parse config at {:?}: {}", path, source);
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".excuse").join("config.toml"))
}

// ============================================================================
// Resolved settings
// ============================================================================

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(
        "no Gemini API key found: set [api_keys].google in ~/.excuse/config.toml or export GEMINI_API_KEY"
    )]
    MissingApiKey,
    #[error("invalid model in config: {0}")]
    InvalidModel(#[from] ModelParseError),
}

/// Everything the binary needs at startup, with defaults applied.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api_key: ApiKey,
    pub model: ModelName,
    pub base_url: Option<String>,
    pub language: String,
    pub high_contrast: bool,
    pub ascii_only: bool,
}

impl Settings {
    /// Resolve against the process environment.
    pub fn resolve(config: Option<&ExcuseConfig>) -> Result<Self, SettingsError> {
        Self::resolve_with(config, |name| env::var(name).ok())
    }

    /// Resolve with an injected environment lookup.
    ///
    /// API key order: `[api_keys].google`, then each of [`API_KEY_ENV_VARS`].
    /// Blank values (including `${VAR}` references to unset variables) are skipped.
    pub fn resolve_with(
        config: Option<&ExcuseConfig>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SettingsError> {
        let expand = |raw: &str| expand_env_vars_with(raw, &lookup);

        let from_config = config
            .and_then(|c| c.api_keys.as_ref())
            .and_then(|keys| keys.google.as_deref())
            .map(expand);
        let api_key = from_config
            .into_iter()
            .chain(API_KEY_ENV_VARS.iter().filter_map(|name| lookup(name)))
            .find_map(|candidate| ApiKey::new(candidate).ok())
            .ok_or(SettingsError::MissingApiKey)?;

        let app = config.and_then(|c| c.app.as_ref());

        let model = match app.and_then(|a| a.model.as_deref()).map(expand) {
            Some(raw) if !raw.trim().is_empty() => ModelName::parse(&raw)?,
            _ => ModelName::default(),
        };

        let language = app
            .and_then(|a| a.language.as_deref())
            .map(expand)
            .map(|raw| raw.trim().to_string())
            .filter(|lang| !lang.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        let base_url = config
            .and_then(|c| c.google.as_ref())
            .and_then(|g| g.base_url.as_deref())
            .map(expand)
            .map(|raw| raw.trim().to_string())
            .filter(|url| !url.is_empty());

        Ok(Self {
            api_key,
            model,
            base_url,
            language,
            high_contrast: app.is_some_and(|a| a.high_contrast),
            ascii_only: app.is_some_and(|a| a.ascii_only),
        })
    }
}
