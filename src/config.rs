//! Runtime configuration, read from environment variables (a `.env` file is
//! loaded first by the binary).

use serenity::model::id::UserId;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

use crate::utils::intro_toggles::INTRO_TOGGLE_FILE;

pub const DEFAULT_PREFIX: &str = "`";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// How resolved tracks reach the voice connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolverMode {
    /// Stream the chosen audio format straight from its URL
    #[default]
    Stream,
    /// Download to a local mp3 first, deleted after playback
    Download,
}

impl FromStr for ResolverMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stream" => Ok(ResolverMode::Stream),
            "download" => Ok(ResolverMode::Download),
            other => Err(format!("expected 'stream' or 'download', got '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BotConfig {
    pub token: String,
    pub owner_id: Option<UserId>,
    pub prefix: String,
    pub data_dir: PathBuf,
    pub resolver_mode: ResolverMode,
    pub songs_dir: PathBuf,
    pub queue_poll_interval: Duration,
    pub intro_timeout: Duration,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let token = get("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;

        let owner_id = get("OWNER_ID")
            .map(|raw| parse_owner(&raw))
            .transpose()?;

        let resolver_mode = get("RESOLVER_MODE")
            .map(|raw| {
                raw.parse().map_err(|reason| ConfigError::Invalid {
                    key: "RESOLVER_MODE",
                    reason,
                })
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            token,
            owner_id,
            prefix: get("BOT_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string()),
            data_dir: get("DATA_DIR").map_or_else(|| PathBuf::from("files"), PathBuf::from),
            resolver_mode,
            songs_dir: get("SONGS_DIR").map_or_else(|| PathBuf::from("songs"), PathBuf::from),
            queue_poll_interval: parse_secs(get("QUEUE_POLL_SECS"), "QUEUE_POLL_SECS", 5)?,
            intro_timeout: parse_secs(get("INTRO_TIMEOUT_SECS"), "INTRO_TIMEOUT_SECS", 30)?,
        })
    }

    pub fn intro_toggle_file(&self) -> PathBuf {
        self.data_dir.join(INTRO_TOGGLE_FILE)
    }
}

fn parse_owner(raw: &str) -> Result<UserId, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            key: "OWNER_ID",
            reason: "user ids are never zero".to_string(),
        }),
        Ok(id) => Ok(UserId::new(id)),
        Err(e) => Err(ConfigError::Invalid {
            key: "OWNER_ID",
            reason: e.to_string(),
        }),
    }
}

fn parse_secs(
    raw: Option<String>,
    key: &'static str,
    default: u64,
) -> Result<Duration, ConfigError> {
    let Some(raw) = raw else {
        return Ok(Duration::from_secs(default));
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::Invalid {
            key,
            reason: "must be at least one second".to_string(),
        }),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(e) => Err(ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
    }
}
