use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::warn;

const BUILTIN_CATALOG: &str = include_str!("catalog.toml");

/// Languages the bot speaks. Anything else is answered in English.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    En,
    Ru,
    Hi,
}

impl Language {
    pub const DEFAULT: Language = Language::En;
    #[cfg(test)]
    pub const ALL: [Language; 3] = [Language::En, Language::Ru, Language::Hi];

    /// Normalize a raw client language tag (`"ru"`, `"ru-RU"`, `""`, ...).
    pub fn from_tag(tag: &str) -> Self {
        let primary = tag
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "ru" => Language::Ru,
            "hi" => Language::Hi,
            _ => Language::DEFAULT,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
            Language::Hi => "hi",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    WelcomeMessage,
    ViewStore,
    WantSame,
    JoinChannel,
    ErrorMessage,
    RateLimit,
    Unauthorized,
    StoreInfo,
    OpeningStore,
}

impl MessageKey {
    pub const ALL: [MessageKey; 9] = [
        MessageKey::WelcomeMessage,
        MessageKey::ViewStore,
        MessageKey::WantSame,
        MessageKey::JoinChannel,
        MessageKey::ErrorMessage,
        MessageKey::RateLimit,
        MessageKey::Unauthorized,
        MessageKey::StoreInfo,
        MessageKey::OpeningStore,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MessageKey::WelcomeMessage => "welcome_message",
            MessageKey::ViewStore => "view_store",
            MessageKey::WantSame => "want_same",
            MessageKey::JoinChannel => "join_channel",
            MessageKey::ErrorMessage => "error_message",
            MessageKey::RateLimit => "rate_limit",
            MessageKey::Unauthorized => "unauthorized",
            MessageKey::StoreInfo => "store_info",
            MessageKey::OpeningStore => "opening_store",
        }
    }
}

/// On-disk layout of the catalog: one table per supported language.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CatalogFile {
    en: MessageTable,
    #[serde(default)]
    ru: Option<MessageTable>,
    #[serde(default)]
    hi: Option<MessageTable>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct MessageTable {
    welcome_message: Option<String>,
    view_store: Option<String>,
    want_same: Option<String>,
    join_channel: Option<String>,
    error_message: Option<String>,
    rate_limit: Option<String>,
    unauthorized: Option<String>,
    store_info: Option<String>,
    opening_store: Option<String>,
}

impl MessageTable {
    fn take(&mut self, key: MessageKey) -> Option<String> {
        let slot = match key {
            MessageKey::WelcomeMessage => &mut self.welcome_message,
            MessageKey::ViewStore => &mut self.view_store,
            MessageKey::WantSame => &mut self.want_same,
            MessageKey::JoinChannel => &mut self.join_channel,
            MessageKey::ErrorMessage => &mut self.error_message,
            MessageKey::RateLimit => &mut self.rate_limit,
            MessageKey::Unauthorized => &mut self.unauthorized,
            MessageKey::StoreInfo => &mut self.store_info,
            MessageKey::OpeningStore => &mut self.opening_store,
        };
        slot.take()
    }
}

/// Localized message templates keyed by language and message name.
#[derive(Debug, Clone)]
pub struct Catalog {
    tables: HashMap<Language, HashMap<MessageKey, String>>,
}

impl Catalog {
    /// The catalog compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_toml(BUILTIN_CATALOG).context("Failed to load built-in message catalog")
    }

    /// Parse a catalog of `[lang]` tables. The default language must define
    /// every key; gaps in other languages fall back to it at lookup time.
    pub fn from_toml(source: &str) -> Result<Self> {
        let file: CatalogFile =
            toml::from_str(source).context("Failed to parse message catalog")?;

        let mut tables = HashMap::new();
        for (lang, table) in [
            (Language::En, Some(file.en)),
            (Language::Ru, file.ru),
            (Language::Hi, file.hi),
        ] {
            let Some(mut table) = table else {
                warn!("Catalog has no [{}] table, using {} texts", lang, Language::DEFAULT);
                continue;
            };

            let mut entries = HashMap::new();
            for key in MessageKey::ALL {
                match table.take(key) {
                    Some(text) => {
                        entries.insert(key, text);
                    }
                    None if lang == Language::DEFAULT => {
                        anyhow::bail!("Catalog [{}] is missing '{}'", lang, key.as_str());
                    }
                    None => warn!(
                        "Catalog [{}] is missing '{}', falling back to {}",
                        lang,
                        key.as_str(),
                        Language::DEFAULT
                    ),
                }
            }
            tables.insert(lang, entries);
        }

        Ok(Self { tables })
    }

    /// Localized text for a raw language tag.
    pub fn text(&self, lang_tag: &str, key: MessageKey) -> &str {
        self.get(Language::from_tag(lang_tag), key)
    }

    pub fn get(&self, lang: Language, key: MessageKey) -> &str {
        self.lookup(lang, key)
            .or_else(|| self.lookup(Language::DEFAULT, key))
            .unwrap_or(key.as_str())
    }

    fn lookup(&self, lang: Language, key: MessageKey) -> Option<&str> {
        self.tables
            .get(&lang)
            .and_then(|table| table.get(&key))
            .map(String::as_str)
    }
}
