use anyhow::{Context, Result};
use url::Url;

use crate::platform::Destination;

pub const TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";
pub const WEBAPP_URL_VAR: &str = "WEBAPP_URL";
pub const ERROR_LOG_CHAT_VAR: &str = "ERROR_LOG_CHAT_ID";

const SUPPORT_URL: &str = "https://t.me/your_support_bot";
const CHANNEL_URL: &str = "https://t.me/your_channel";

/// Static link buttons shown under the welcome message
#[derive(Debug, Clone)]
pub struct Links {
    pub support: Url,
    pub channel: Url,
}

impl Links {
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            support: Url::parse(SUPPORT_URL).context("Invalid support URL")?,
            channel: Url::parse(CHANNEL_URL).context("Invalid channel URL")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    /// Store web app opened from the welcome keyboard, if any.
    pub webapp_url: Option<Url>,
    /// Where handler failures are mirrored, if anywhere.
    pub error_log_chat: Option<Destination>,
    pub links: Links,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bot_token = read(TOKEN_VAR)
            .with_context(|| format!("Missing {} variable", TOKEN_VAR))?;

        let webapp_url = read(WEBAPP_URL_VAR)
            .map(|raw| {
                Url::parse(&raw).with_context(|| format!("Invalid {}: {}", WEBAPP_URL_VAR, raw))
            })
            .transpose()?;

        let error_log_chat = read(ERROR_LOG_CHAT_VAR).map(|raw| parse_destination(&raw));

        Ok(Self {
            bot_token,
            webapp_url,
            error_log_chat,
            links: Links::builtin()?,
        })
    }
}

/// Numeric ids address a chat directly, anything else is a channel username.
fn parse_destination(raw: &str) -> Destination {
    match raw.parse::<i64>() {
        Ok(id) => Destination::Chat(id),
        Err(_) => Destination::Channel(raw.to_string()),
    }
}
