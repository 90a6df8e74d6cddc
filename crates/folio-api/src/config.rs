//! Server configuration read from environment variables.

use crate::server::DEFAULT_HISTORY_WINDOW;
use folio_llm::SYSTEM_PROMPT;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_LISTEN: &str = "0.0.0.0:3000";
const DEFAULT_SESSION_IDLE_SECS: u64 = 3600;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid listen address {value:?}: {source}")]
    Listen {
        value: String,
        source: std::net::AddrParseError,
    },
    #[error("invalid value for {var}: {value:?}")]
    Number { var: &'static str, value: String },
    #[error("failed to read system prompt from {path:?}: {source}")]
    Prompt {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Settings that are not owned by an upstream client.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub history_window: usize,
    pub session_idle: Duration,
    pub system_prompt: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 3000)),
            history_window: DEFAULT_HISTORY_WINDOW,
            session_idle: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }
}

impl ServerConfig {
    /// Read `FOLIO_LISTEN`, `CHAT_HISTORY_WINDOW`, `SESSION_IDLE_SECS` and
    /// `CHAT_SYSTEM_PROMPT_FILE`; unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with a caller-supplied variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let listen_raw = lookup("FOLIO_LISTEN").unwrap_or_else(|| DEFAULT_LISTEN.to_string());
        let listen = listen_raw.parse::<SocketAddr>().map_err(|source| ConfigError::Listen {
            value: listen_raw.clone(),
            source,
        })?;

        let history_window = match lookup("CHAT_HISTORY_WINDOW") {
            Some(v) => parse_positive("CHAT_HISTORY_WINDOW", &v)? as usize,
            None => DEFAULT_HISTORY_WINDOW,
        };

        let session_idle = match lookup("SESSION_IDLE_SECS") {
            Some(v) => Duration::from_secs(parse_positive("SESSION_IDLE_SECS", &v)?),
            None => Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
        };

        let system_prompt = match lookup("CHAT_SYSTEM_PROMPT_FILE") {
            Some(path) => {
                let path = PathBuf::from(path);
                std::fs::read_to_string(&path)
                    .map_err(|source| ConfigError::Prompt { path, source })?
            }
            None => SYSTEM_PROMPT.to_string(),
        };

        Ok(Self {
            listen,
            history_window,
            session_idle,
            system_prompt,
        })
    }
}

fn parse_positive(var: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::Number {
            var,
            value: value.to_string(),
        }),
    }
}
