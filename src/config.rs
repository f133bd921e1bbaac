use std::path::PathBuf;

use crate::error::ConfigError;

/// Everything the bot needs from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub guild_id: u64,
    pub owner_id: u64,
    pub spotify: SpotifyConfig,
}

#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Overrides rspotify's default token cache file
    pub token_cache: Option<PathBuf>,
}

impl Config {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Values from .env files often carry stray whitespace or a trailing newline
        let optional = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));
        let id = |name: &'static str| -> Result<u64, ConfigError> {
            let value = required(name)?;
            // Discord snowflakes are never zero
            match value.parse::<u64>() {
                Ok(id) if id != 0 => Ok(id),
                _ => Err(ConfigError::InvalidId { name, value }),
            }
        };

        Ok(Self {
            discord_token: required("DISCORD_TOKEN")?,
            guild_id: id("GUILD_ID")?,
            owner_id: id("OWNER_ID")?,
            spotify: SpotifyConfig {
                client_id: required("SPOTIFY_CLIENT_ID")?,
                client_secret: required("SPOTIFY_CLIENT_SECRET")?,
                redirect_uri: required("SPOTIFY_REDIRECT_URI")?,
                token_cache: optional("SPOTIFY_TOKEN_CACHE").map(PathBuf::from),
            },
        })
    }
}
