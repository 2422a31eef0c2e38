//! Pipeline configuration.
//!
//! Loaded from a TOML file, then overridden by `WARDEN_*` environment
//! variables:
//! - `WARDEN_ACCEPT_PHRASE`
//! - `WARDEN_ADMIN_CHAT_ID`
//! - `WARDEN_SUPPORT_CHAT_ID`
//! - `WARDEN_INSTALL_MARKER`
//! - `WARDEN_MAINTENANCE_STICKER`
//! - `WARDEN_RATE_LIMITED_COMMANDS` (comma separated)

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;
use warden_policy::{ChatId, CommandName};

use crate::error::ConfigError;

/// Runtime configuration of the authorization pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Exact text that records terms acceptance.
    #[serde(default = "default_accept_phrase")]
    pub accept_phrase: String,

    /// Group conversation the bot is allowed to serve.
    #[serde(default)]
    pub admin_chat_id: Option<ChatId>,

    /// Second group conversation the bot is allowed to serve.
    #[serde(default)]
    pub support_chat_id: Option<ChatId>,

    /// Commands throttled before the gates run.
    #[serde(default = "default_rate_limited_commands")]
    pub rate_limited_commands: BTreeSet<String>,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Marker file whose presence means first-time setup is complete.
    #[serde(default)]
    pub install_marker: Option<PathBuf>,

    #[serde(default)]
    pub messages: Messages,
}

fn default_accept_phrase() -> String {
    "I accept the terms of use".to_string()
}

fn default_rate_limited_commands() -> BTreeSet<String> {
    BTreeSet::from(["start".to_string()])
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            accept_phrase: default_accept_phrase(),
            admin_chat_id: None,
            support_chat_id: None,
            rate_limited_commands: default_rate_limited_commands(),
            rate_limit: RateLimitConfig::default(),
            install_marker: None,
            messages: Messages::default(),
        }
    }
}

/// Token bucket settings: `burst` requests per `per_seconds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_burst")]
    pub burst: u32,
    #[serde(default = "default_per_seconds")]
    pub per_seconds: u64,
}

fn default_burst() -> u32 {
    1
}

fn default_per_seconds() -> u64 {
    1
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            burst: default_burst(),
            per_seconds: default_per_seconds(),
        }
    }
}

/// User-facing notice texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub no_access: String,
    pub registration_required: String,
    pub command_not_recognized: String,
    pub maintenance: String,
    pub maintenance_sticker: Option<String>,
    /// Sent after the terms text; `{phrase}` is replaced by the accept phrase.
    pub terms_prompt: String,
    pub too_many_requests: String,
    pub setup_required: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            no_access: "No access to this command.".to_string(),
            registration_required: "Only registered users can use this bot.".to_string(),
            command_not_recognized: "This command is not in the list of available commands."
                .to_string(),
            maintenance: "The bot is under maintenance, please come back later.".to_string(),
            maintenance_sticker: None,
            terms_prompt: "To accept the terms of use, send: {phrase}".to_string(),
            too_many_requests: "Too many requests, slow down.".to_string(),
            setup_required: "The bot is not set up yet. Run the setup first.".to_string(),
        }
    }
}

impl Messages {
    /// Terms prompt with the accept phrase filled in.
    pub fn terms_prompt_for(&self, phrase: &str) -> String {
        self.terms_prompt.replace("{phrase}", phrase)
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content)?;
        debug!(path = %path.display(), "loaded pipeline config");
        Ok(config)
    }

    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `WARDEN_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides using `lookup` to read variables.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(phrase) = lookup("WARDEN_ACCEPT_PHRASE") {
            self.accept_phrase = phrase;
        }
        if let Some(value) = lookup("WARDEN_ADMIN_CHAT_ID") {
            self.admin_chat_id = Some(parse_chat_id("WARDEN_ADMIN_CHAT_ID", value)?);
        }
        if let Some(value) = lookup("WARDEN_SUPPORT_CHAT_ID") {
            self.support_chat_id = Some(parse_chat_id("WARDEN_SUPPORT_CHAT_ID", value)?);
        }
        if let Some(path) = lookup("WARDEN_INSTALL_MARKER") {
            self.install_marker = Some(PathBuf::from(path));
        }
        if let Some(sticker) = lookup("WARDEN_MAINTENANCE_STICKER") {
            self.messages.maintenance_sticker = Some(sticker);
        }
        if let Some(list) = lookup("WARDEN_RATE_LIMITED_COMMANDS") {
            self.rate_limited_commands = list
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect();
        }
        Ok(())
    }

    /// Whether `chat_id` is one of the configured group conversations.
    pub fn is_allowed_group(&self, chat_id: ChatId) -> bool {
        self.admin_chat_id == Some(chat_id) || self.support_chat_id == Some(chat_id)
    }

    pub fn is_rate_limited(&self, command: &CommandName) -> bool {
        self.rate_limited_commands.contains(command.as_str())
    }
}

fn parse_chat_id(var: &'static str, value: String) -> Result<ChatId, ConfigError> {
    value
        .trim()
        .parse::<i64>()
        .map(ChatId)
        .map_err(|_| ConfigError::InvalidEnv { var, value })
}
