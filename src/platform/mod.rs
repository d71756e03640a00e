pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use url::Url;

/// Callback payload attached to the "order" button.
pub const ORDER_CALLBACK: &str = "order";

/// Handler selected by a callback payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackRoute {
    Order,
}

impl CallbackRoute {
    /// Payloads are matched exactly; anything else is not ours.
    pub fn from_data(data: &str) -> Option<Self> {
        match data {
            ORDER_CALLBACK => Some(CallbackRoute::Order),
            _ => None,
        }
    }
}

/// A `/start` command received from a user
#[derive(Debug, Clone)]
pub struct StartEvent {
    pub user_id: u64,
    pub chat_id: i64,
    /// Display name of the user
    pub first_name: String,
    pub username: Option<String>,
    /// Raw client language tag, empty when the client sent none
    pub language_code: String,
}

/// A button press on a message the bot sent earlier
#[derive(Debug, Clone)]
pub struct CallbackEvent {
    /// Platform id used to acknowledge the callback
    pub id: String,
    pub user_id: u64,
    pub language_code: String,
    pub data: String,
    /// Chat of the message carrying the pressed button, when still accessible
    pub origin_chat_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Chat(i64),
    /// Public channel or group username, e.g. `@shop_errors`
    Channel(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonAction {
    /// Opens a web app inside the client
    WebApp(Url),
    Link(Url),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: ButtonAction,
}

/// Inline keyboard, one `Vec` per row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn row(mut self, button: Button) -> Self {
        self.rows.push(vec![button]);
        self
    }
}

/// Decorative animation shown when a message arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageEffect {
    Confetti,
    Fire,
}

impl MessageEffect {
    pub fn id(self) -> &'static str {
        match self {
            MessageEffect::Confetti => "5046509860389126442",
            MessageEffect::Fire => "5104841245755180586",
        }
    }
}

/// A message to send from the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub destination: Destination,
    pub text: String,
    /// Parse `text` as Telegram's HTML subset
    pub html: bool,
    pub keyboard: Option<Keyboard>,
    pub effect: Option<MessageEffect>,
}

impl OutgoingMessage {
    pub fn plain(destination: Destination, text: impl Into<String>) -> Self {
        Self {
            destination,
            text: text.into(),
            html: false,
            keyboard: None,
            effect: None,
        }
    }

    pub fn html(destination: Destination, text: impl Into<String>) -> Self {
        Self {
            html: true,
            ..Self::plain(destination, text)
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn with_effect(mut self, effect: MessageEffect) -> Self {
        self.effect = Some(effect);
        self
    }
}

/// Outbound side of a messaging platform
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(&self, message: OutgoingMessage) -> Result<()>;

    /// Acknowledge a callback, optionally as a pop-up alert.
    async fn answer_callback(&self, callback_id: &str, text: &str, show_alert: bool)
        -> Result<()>;
}
