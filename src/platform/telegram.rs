use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{
    CallbackQueryId, EffectId, InlineKeyboardButton, InlineKeyboardMarkup, ParseMode, Recipient,
    WebAppInfo,
};
use teloxide::utils::command::BotCommands;
use tracing::{debug, info};

use crate::handlers::{handle_order_callback, handle_start, AppState};
use crate::platform::{
    Button, ButtonAction, CallbackEvent, CallbackRoute, Destination, Keyboard, Messenger,
    OutgoingMessage, StartEvent,
};

#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
enum Command {
    #[command(description = "open the store")]
    Start,
}

/// `Messenger` backed by the Telegram Bot API
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_message(&self, message: OutgoingMessage) -> Result<()> {
        let mut request = self
            .bot
            .send_message(recipient(message.destination), message.text);
        if message.html {
            request = request.parse_mode(ParseMode::Html);
        }
        if let Some(keyboard) = message.keyboard {
            request = request.reply_markup(inline_keyboard(keyboard));
        }
        if let Some(effect) = message.effect {
            request = request.message_effect_id(EffectId(effect.id().to_string()));
        }
        request.await.context("Telegram sendMessage failed")?;
        Ok(())
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: &str,
        show_alert: bool,
    ) -> Result<()> {
        self.bot
            .answer_callback_query(CallbackQueryId(callback_id.to_string()))
            .text(text)
            .show_alert(show_alert)
            .await
            .context("Telegram answerCallbackQuery failed")?;
        Ok(())
    }
}

fn recipient(destination: Destination) -> Recipient {
    match destination {
        Destination::Chat(id) => Recipient::Id(ChatId(id)),
        Destination::Channel(username) => Recipient::ChannelUsername(username),
    }
}

fn inline_keyboard(keyboard: Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        keyboard
            .rows
            .into_iter()
            .map(|row| row.into_iter().map(inline_button).collect::<Vec<_>>()),
    )
}

fn inline_button(button: Button) -> InlineKeyboardButton {
    match button.action {
        ButtonAction::WebApp(url) => {
            InlineKeyboardButton::web_app(button.label, WebAppInfo { url })
        }
        ButtonAction::Link(url) => InlineKeyboardButton::url(button.label, url),
    }
}

/// Drop updates queued while the bot was offline, then dispatch until shutdown.
pub async fn run(state: Arc<AppState>, bot: Bot) -> Result<()> {
    bot.delete_webhook()
        .drop_pending_updates(true)
        .await
        .context("Failed to delete webhook")?;

    info!("Bot started successfully, starting polling...");

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(handle_command),
        )
        .branch(Update::filter_callback_query().endpoint(handle_callback));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .default_handler(|upd| async move {
            debug!("Unhandled update: {:?}", upd.id);
        })
        .error_handler(LoggingErrorHandler::with_custom_text("telegram"))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    info!("Bot stopped");
    Ok(())
}

async fn handle_command(msg: Message, cmd: Command, state: Arc<AppState>) -> ResponseResult<()> {
    match cmd {
        Command::Start => {
            if let Some(event) = start_event(&msg) {
                handle_start(&state, &event, Instant::now()).await;
            }
        }
    }
    Ok(())
}

async fn handle_callback(q: CallbackQuery, state: Arc<AppState>) -> ResponseResult<()> {
    let event = callback_event(&q);
    match CallbackRoute::from_data(&event.data) {
        Some(CallbackRoute::Order) => {
            handle_order_callback(&state, &event, Instant::now()).await;
        }
        None => debug!(user_id = event.user_id, "Ignoring callback data {:?}", event.data),
    }
    Ok(())
}

fn start_event(msg: &Message) -> Option<StartEvent> {
    let user = msg.from.as_ref()?;
    Some(StartEvent {
        user_id: user.id.0,
        chat_id: msg.chat.id.0,
        first_name: user.first_name.clone(),
        username: user.username.clone(),
        language_code: user.language_code.clone().unwrap_or_default(),
    })
}

fn callback_event(q: &CallbackQuery) -> CallbackEvent {
    CallbackEvent {
        id: q.id.0.clone(),
        user_id: q.from.id.0,
        language_code: q.from.language_code.clone().unwrap_or_default(),
        data: q.data.clone().unwrap_or_default(),
        origin_chat_id: q.message.as_ref().map(|m| m.chat().id.0),
    }
}
