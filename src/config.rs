//! Client configuration - server endpoint and player identity
//!
//! Browser builds read the page query string, native builds read environment variables.

use crate::settings::Difficulty;

/// Default local backend
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";

/// Who is playing; the server keys game sessions on this pair
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerIdentity {
    pub username: String,
    pub profile_name: String,
}

impl Default for PlayerIdentity {
    fn default() -> Self {
        Self {
            username: "guest".to_string(),
            profile_name: "guest".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the game API, without trailing slash
    pub api_base_url: String,
    pub identity: PlayerIdentity,
    /// Overrides the stored preference when set
    pub difficulty: Option<Difficulty>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            identity: PlayerIdentity::default(),
            difficulty: None,
        }
    }
}

impl ClientConfig {
    /// Build from optional raw values; absent or blank values take defaults
    pub fn from_parts(
        api_url: Option<String>,
        username: Option<String>,
        profile_name: Option<String>,
    ) -> Result<Self, ConfigError> {
        let defaults = PlayerIdentity::default();
        let api_base_url = match api_url {
            Some(url) => validate_url(&url)?,
            None => DEFAULT_API_URL.to_string(),
        };

        Ok(Self {
            api_base_url,
            identity: PlayerIdentity {
                username: non_blank(username).unwrap_or(defaults.username),
                profile_name: non_blank(profile_name).unwrap_or(defaults.profile_name),
            },
            difficulty: None,
        })
    }

    /// Apply an optional difficulty override (`easy`, `medium`, `hard`)
    pub fn with_difficulty(mut self, raw: Option<String>) -> Result<Self, ConfigError> {
        if let Some(raw) = non_blank(raw) {
            let difficulty =
                Difficulty::from_str(&raw).ok_or(ConfigError::InvalidDifficulty(raw))?;
            self.difficulty = Some(difficulty);
        }
        Ok(self)
    }

    /// Load from `ASTEROIDS_API_URL`, `ASTEROIDS_USERNAME`, `ASTEROIDS_PROFILE`
    /// and `ASTEROIDS_DIFFICULTY`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Result<Self, ConfigError> {
        use std::env;

        Self::from_parts(
            env::var("ASTEROIDS_API_URL").ok(),
            env::var("ASTEROIDS_USERNAME").ok(),
            env::var("ASTEROIDS_PROFILE").ok(),
        )?
        .with_difficulty(env::var("ASTEROIDS_DIFFICULTY").ok())
    }

    /// Load from the page query string (`?api=..&username=..&profile=..&difficulty=..`)
    #[cfg(target_arch = "wasm32")]
    pub fn from_location() -> Result<Self, ConfigError> {
        let search = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        let params = web_sys::UrlSearchParams::new_with_str(&search)
            .map_err(|_| ConfigError::InvalidQuery)?;

        Self::from_parts(
            params.get("api"),
            params.get("username"),
            params.get("profile"),
        )?
        .with_difficulty(params.get("difficulty"))
    }

    /// Full URL for an API endpoint
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_url(url: &str) -> Result<String, ConfigError> {
    let url = url.trim().trim_end_matches('/');
    if url.is_empty() {
        return Err(ConfigError::Missing("api url"));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(ConfigError::InvalidUrl(url.to_string()));
    }
    Ok(url.to_string())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required value: {0}")]
    Missing(&'static str),

    #[error("API url must be http(s): {0}")]
    InvalidUrl(String),

    #[error("Unknown difficulty: {0}")]
    InvalidDifficulty(String),

    #[error("Could not parse page query string")]
    InvalidQuery,
}
