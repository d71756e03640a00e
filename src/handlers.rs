use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::{Config, Links};
use crate::i18n::{Catalog, MessageKey};
use crate::platform::{
    Button, ButtonAction, CallbackEvent, Destination, Keyboard, MessageEffect, Messenger,
    OutgoingMessage, StartEvent,
};
use crate::sanitize::{sanitize_input, truncate_chars, MAX_MESSAGE_CHARS};
use crate::throttle::Throttle;

/// How much of an error is mirrored to the admin chat
const ADMIN_SUMMARY_CHARS: usize = 500;

/// Shared application state, owned for the lifetime of the process
pub struct AppState {
    pub catalog: Catalog,
    pub throttle: Throttle,
    pub links: Links,
    pub webapp_url: Option<Url>,
    pub admin_chat: Option<Destination>,
    pub messenger: Arc<dyn Messenger>,
}

impl AppState {
    pub fn new(config: Config, catalog: Catalog, messenger: Arc<dyn Messenger>) -> Self {
        Self {
            catalog,
            throttle: Throttle::default(),
            links: config.links,
            webapp_url: config.webapp_url,
            admin_chat: config.error_log_chat,
            messenger,
        }
    }
}

/// What a handler did with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Welcomed,
    StoreOpened,
    RateLimited,
    Unauthorized,
    Failed,
}

/// Handle `/start`: greet the user with the store keyboard.
pub async fn handle_start(state: &AppState, event: &StartEvent, now: Instant) -> Outcome {
    match start(state, event, now).await {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(user_id = event.user_id, "Error in start_command: {:#}", e);
            let text = state
                .catalog
                .text(&event.language_code, MessageKey::ErrorMessage);
            let reply = OutgoingMessage::plain(Destination::Chat(event.chat_id), text);
            if let Err(send_err) = state.messenger.send_message(reply).await {
                warn!(
                    user_id = event.user_id,
                    "Failed to deliver error message: {:#}", send_err
                );
            }
            notify_admin(state, "start_command", &e).await;
            Outcome::Failed
        }
    }
}

/// Handle a press on the "order" button.
pub async fn handle_order_callback(
    state: &AppState,
    event: &CallbackEvent,
    now: Instant,
) -> Outcome {
    let mut acknowledged = false;
    let result = order_callback(state, event, now, &mut acknowledged).await;
    match result {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(user_id = event.user_id, "Error in handle_order_callback: {:#}", e);
            let text = state
                .catalog
                .text(&event.language_code, MessageKey::ErrorMessage);
            // A callback can only be answered once; after that, write to the chat.
            let delivered = if acknowledged {
                match reply_chat(event) {
                    Ok(chat_id) => {
                        let reply = OutgoingMessage::plain(Destination::Chat(chat_id), text);
                        state.messenger.send_message(reply).await
                    }
                    Err(err) => Err(err),
                }
            } else {
                state.messenger.answer_callback(&event.id, text, true).await
            };
            if let Err(send_err) = delivered {
                warn!(
                    user_id = event.user_id,
                    "Failed to deliver error message: {:#}", send_err
                );
            }
            notify_admin(state, "handle_order_callback", &e).await;
            Outcome::Failed
        }
    }
}

async fn start(state: &AppState, event: &StartEvent, now: Instant) -> Result<Outcome> {
    let lang = event.language_code.as_str();
    let chat = Destination::Chat(event.chat_id);

    if !state.throttle.allow(event.user_id, now) {
        debug!(user_id = event.user_id, "Rate limited /start");
        let notice = state.catalog.text(lang, MessageKey::RateLimit);
        state
            .messenger
            .send_message(OutgoingMessage::plain(chat, notice))
            .await
            .context("Failed to send rate limit notice")?;
        return Ok(Outcome::RateLimited);
    }

    let welcome = OutgoingMessage::html(chat, state.catalog.text(lang, MessageKey::WelcomeMessage))
        .with_keyboard(welcome_keyboard(state, lang))
        .with_effect(MessageEffect::Confetti);
    state
        .messenger
        .send_message(welcome)
        .await
        .context("Failed to send welcome message")?;

    let username = event
        .username
        .as_deref()
        .map(|name| sanitize_input(name, MAX_MESSAGE_CHARS))
        .unwrap_or_else(|| "N/A".to_string());
    let first_name = sanitize_input(&event.first_name, MAX_MESSAGE_CHARS);
    info!(
        user_id = event.user_id,
        "User {} ({}) started the bot with language: {}",
        username,
        first_name,
        lang
    );

    Ok(Outcome::Welcomed)
}

async fn order_callback(
    state: &AppState,
    event: &CallbackEvent,
    now: Instant,
    acknowledged: &mut bool,
) -> Result<Outcome> {
    let lang = event.language_code.as_str();
    let messenger = &state.messenger;

    if !state.throttle.allow(event.user_id, now) {
        debug!(user_id = event.user_id, "Rate limited callback");
        messenger
            .answer_callback(&event.id, state.catalog.text(lang, MessageKey::RateLimit), true)
            .await
            .context("Failed to answer rate limited callback")?;
        return Ok(Outcome::RateLimited);
    }

    // The button must live in the presser's own private chat.
    if let Some(origin) = event.origin_chat_id {
        if u64::try_from(origin).ok() != Some(event.user_id) {
            warn!(
                user_id = event.user_id,
                origin_chat_id = origin,
                "SECURITY: Unauthorized callback attempt by user {}",
                event.user_id
            );
            messenger
                .answer_callback(&event.id, state.catalog.text(lang, MessageKey::Unauthorized), true)
                .await
                .context("Failed to answer unauthorized callback")?;
            return Ok(Outcome::Unauthorized);
        }
    }

    messenger
        .answer_callback(&event.id, state.catalog.text(lang, MessageKey::OpeningStore), false)
        .await
        .context("Failed to answer callback")?;
    *acknowledged = true;

    let info = OutgoingMessage::html(
        Destination::Chat(reply_chat(event)?),
        state.catalog.text(lang, MessageKey::StoreInfo),
    )
    .with_effect(MessageEffect::Fire);
    messenger
        .send_message(info)
        .await
        .context("Failed to send store info")?;

    info!(
        user_id = event.user_id,
        "User {} opened store via callback with language: {}", event.user_id, lang
    );

    Ok(Outcome::StoreOpened)
}

/// Chat holding the pressed button, or the user's private chat when unknown.
fn reply_chat(event: &CallbackEvent) -> Result<i64> {
    match event.origin_chat_id {
        Some(id) => Ok(id),
        None => i64::try_from(event.user_id).context("User id does not fit a chat id"),
    }
}

fn welcome_keyboard(state: &AppState, lang: &str) -> Keyboard {
    let label = |key: MessageKey| state.catalog.text(lang, key).to_string();
    let mut keyboard = Keyboard::default();

    if let Some(url) = &state.webapp_url {
        keyboard = keyboard.row(Button {
            label: label(MessageKey::ViewStore),
            action: ButtonAction::WebApp(url.clone()),
        });
    }

    keyboard
        .row(Button {
            label: label(MessageKey::WantSame),
            action: ButtonAction::Link(state.links.support.clone()),
        })
        .row(Button {
            label: label(MessageKey::JoinChannel),
            action: ButtonAction::Link(state.links.channel.clone()),
        })
}

/// Mirror a handler failure to the admin chat, if one is configured.
async fn notify_admin(state: &AppState, handler: &str, err: &anyhow::Error) {
    let Some(admin) = state.admin_chat.clone() else {
        return;
    };

    let detail = format!("{:#}", err);
    let text = format!(
        "⚠️ Error in {}:\n{}",
        handler,
        truncate_chars(&detail, ADMIN_SUMMARY_CHARS)
    );
    if let Err(e) = state
        .messenger
        .send_message(OutgoingMessage::plain(admin, text))
        .await
    {
        warn!("Failed to forward error to admin chat: {:#}", e);
    }
}
