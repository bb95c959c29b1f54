//! Telegram channel relay.
//!
//! Owns the single outbound bot connection for the process lifetime. The
//! relay is bound to the channel config loaded at startup: no config means
//! every send is a logged no-op, and updating the stored config later does
//! not touch the live connection — token rotation requires a restart.

pub mod template;

use std::collections::HashMap;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::Message;

use herald_common::error::AppError;
use herald_common::types::ChannelConfig;
use herald_engine::dispatcher::OutboundChannel;

use crate::template::MessageTemplate;

/// The one connection to the Telegram Bot API.
pub struct ChannelRelay {
    bot: Option<Bot>,
    onboarding: MessageTemplate,
}

impl ChannelRelay {
    /// Bind the relay to the config loaded at startup. `None` leaves it
    /// inert. The onboarding template is validated here, at load time.
    pub fn connect(config: Option<&ChannelConfig>) -> Result<Self, AppError> {
        match config {
            Some(config) => {
                let onboarding = match &config.msg {
                    Some(msg) => MessageTemplate::parse(msg)?,
                    None => MessageTemplate::default_onboarding(),
                };
                tracing::info!("Telegram relay connected");
                Ok(Self {
                    bot: Some(Bot::new(config.token.clone())),
                    onboarding,
                })
            }
            None => {
                tracing::info!("No channel config stored, Telegram relay stays inert");
                Ok(Self {
                    bot: None,
                    onboarding: MessageTemplate::default_onboarding(),
                })
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.bot.is_some()
    }

    /// Attempt delivery to a chat. Transport failures are logged, never
    /// retried and never surfaced to the caller.
    pub async fn send(&self, chat_id: i64, text: &str) {
        let Some(bot) = &self.bot else {
            tracing::debug!(chat_id, "Relay uninitialized, dropping message");
            return;
        };

        if let Err(e) = bot.send_message(ChatId(chat_id), text).await {
            tracing::warn!(chat_id, error = %e, "Telegram send failed");
        }
    }

    /// Username of the connected bot, for the settings page.
    pub async fn bot_username(&self) -> Option<String> {
        let bot = self.bot.as_ref()?;
        match bot.get_me().await {
            Ok(me) => Some(me.username().to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to query bot identity");
                None
            }
        }
    }

    /// Long-polling listener for inbound messages. Any text message is
    /// answered with the onboarding reply carrying the sender's numeric id —
    /// the id the user must register against their forum profile.
    pub async fn run_listener(&self) {
        let Some(bot) = self.bot.clone() else {
            return;
        };
        let onboarding = self.onboarding.clone();

        tracing::info!("Telegram listener started");

        let handler = Update::filter_message().endpoint(
            |bot: Bot, msg: Message, onboarding: MessageTemplate| async move {
                if msg.text().is_some()
                    && let Some(user) = msg.from.as_ref()
                {
                    let reply =
                        onboarding.render(&HashMap::from([("userid", user.id.to_string())]));
                    tracing::debug!(chat_id = %msg.chat.id, "Answering identification message");
                    if let Err(e) = bot.send_message(msg.chat.id, reply).await {
                        tracing::warn!(chat_id = %msg.chat.id, error = %e, "Onboarding reply failed");
                    }
                }
                respond(())
            },
        );

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![onboarding])
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    }
}

#[async_trait]
impl OutboundChannel for ChannelRelay {
    async fn send(&self, chat_id: i64, text: &str) {
        ChannelRelay::send(self, chat_id, text).await;
    }
}
