//! Notification configuration.
//!
//! Loaded from environment variables. A channel with no configuration
//! is disabled: events are simply never enqueued for it.

use std::env;
use std::time::Duration;

use frantoio_core::types::NotificationChannel;

/// Transactional email provider settings (Resend-style HTTP API).
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// API endpoint, e.g. `https://api.resend.com/emails`.
    pub api_url: String,
    pub api_key: String,
    /// From header, e.g. `Frantoio <ordini@frantoio.example>`.
    pub from: String,
}

/// Telegram Bot API settings; messages go to the owners' group chat.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
}

/// WhatsApp Cloud API settings; messages go to the shop's admin number.
#[derive(Debug, Clone)]
pub struct WhatsAppConfig {
    /// Messages endpoint, e.g.
    /// `https://graph.facebook.com/v19.0/<phone_id>/messages`.
    pub api_url: String,
    pub access_token: String,
    /// Destination number in international format.
    pub to_number: String,
}

/// Complete notification engine configuration.
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub email: Option<EmailConfig>,
    pub telegram: Option<TelegramConfig>,
    pub whatsapp: Option<WhatsAppConfig>,

    /// How often the worker polls the outbox.
    pub poll_interval: Duration,

    /// Maximum rows fetched per poll.
    pub batch_size: u32,
}

impl NotifyConfig {
    /// Load configuration from environment variables.
    ///
    /// A channel is enabled only when every one of its variables is set:
    /// - Email: `EMAIL_API_URL`, `EMAIL_API_KEY`, `EMAIL_FROM`
    /// - Telegram: `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID`
    /// - WhatsApp: `WHATSAPP_API_URL`, `WHATSAPP_ACCESS_TOKEN`, `WHATSAPP_TO`
    pub fn load() -> Self {
        let email = match (
            env::var("EMAIL_API_URL"),
            env::var("EMAIL_API_KEY"),
            env::var("EMAIL_FROM"),
        ) {
            (Ok(api_url), Ok(api_key), Ok(from)) => Some(EmailConfig {
                api_url,
                api_key,
                from,
            }),
            _ => None,
        };

        let telegram = match (env::var("TELEGRAM_BOT_TOKEN"), env::var("TELEGRAM_CHAT_ID")) {
            (Ok(bot_token), Ok(chat_id)) => Some(TelegramConfig { bot_token, chat_id }),
            _ => None,
        };

        let whatsapp = match (
            env::var("WHATSAPP_API_URL"),
            env::var("WHATSAPP_ACCESS_TOKEN"),
            env::var("WHATSAPP_TO"),
        ) {
            (Ok(api_url), Ok(access_token), Ok(to_number)) => Some(WhatsAppConfig {
                api_url,
                access_token,
                to_number,
            }),
            _ => None,
        };

        let poll_interval_secs: u64 = env::var("NOTIFY_POLL_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        let batch_size: u32 = env::var("NOTIFY_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(50);

        NotifyConfig {
            email,
            telegram,
            whatsapp,
            poll_interval: Duration::from_secs(poll_interval_secs),
            batch_size,
        }
    }

    /// A configuration with every channel disabled (tests, development).
    pub fn disabled() -> Self {
        NotifyConfig {
            email: None,
            telegram: None,
            whatsapp: None,
            poll_interval: Duration::from_secs(5),
            batch_size: 50,
        }
    }

    /// Whether a channel has configuration.
    pub fn channel_enabled(&self, channel: NotificationChannel) -> bool {
        match channel {
            NotificationChannel::Email => self.email.is_some(),
            NotificationChannel::Telegram => self.telegram.is_some(),
            NotificationChannel::Whatsapp => self.whatsapp.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_config() {
        let config = NotifyConfig::disabled();
        assert!(!config.channel_enabled(NotificationChannel::Email));
        assert!(!config.channel_enabled(NotificationChannel::Telegram));
        assert!(!config.channel_enabled(NotificationChannel::Whatsapp));
    }

    #[test]
    fn test_channel_enabled_reflects_presence() {
        let mut config = NotifyConfig::disabled();
        config.telegram = Some(TelegramConfig {
            bot_token: "token".into(),
            chat_id: "-100123".into(),
        });
        assert!(config.channel_enabled(NotificationChannel::Telegram));
        assert!(!config.channel_enabled(NotificationChannel::Email));
    }
}
