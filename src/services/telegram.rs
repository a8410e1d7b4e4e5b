//! Notification sink: Telegram bot messages to the studio chat

use async_trait::async_trait;
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::{
    config::TelegramConfig,
    error::{AppError, AppResult},
    models::Booking,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send an HTML message; `Ok(false)` when the message was not delivered
    async fn send_message(&self, text: &str) -> AppResult<bool>;
}

#[derive(Clone)]
pub struct TelegramNotifier {
    http: Client,
    config: TelegramConfig,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(http: Client, config: TelegramConfig) -> Self {
        Self { http, config }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(&self, text: &str) -> AppResult<bool> {
        let (Some(token), Some(chat_id)) = (&self.config.bot_token, &self.config.chat_id) else {
            tracing::debug!("Telegram is not configured, skipping notification");
            return Ok(false);
        };

        let url = format!("https://api.telegram.org/bot{}/sendMessage", token);
        let response = self
            .http
            .post(&url)
            .json(&json!({
                "chat_id": chat_id,
                "text": text,
                "parse_mode": "HTML",
            }))
            .send()
            .await
            .map_err(|e| AppError::upstream("telegram", format!("sendMessage failed: {}", e)))?;

        let body: SendMessageResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream("telegram", format!("Failed to parse response: {}", e)))?;
        if !body.ok {
            tracing::warn!(
                description = body.description.as_deref().unwrap_or("unknown"),
                "Telegram rejected message"
            );
        }
        Ok(body.ok)
    }
}

/// Escape text for Telegram's HTML parse mode
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Studio notification for a confirmed deposit
pub fn payment_confirmed_message(booking: &Booking, tz: Tz) -> String {
    let when = booking
        .selected_slot
        .with_timezone(&tz)
        .format("%a, %d %b %Y %H:%M");

    let mut lines = vec![
        "<b>Payment confirmed</b>".to_string(),
        String::new(),
        format!("<b>Client:</b> {}", escape_html(&booking.name)),
        format!("<b>Email:</b> {}", escape_html(&booking.email)),
    ];
    if let Some(phone) = &booking.phone {
        lines.push(format!("<b>Phone:</b> {}", escape_html(phone)));
    }
    lines.push(format!("<b>Session:</b> {}", escape_html(&booking.session_type)));
    lines.push(format!("<b>When:</b> {}", when));
    lines.push(format!("<b>Deposit:</b> {} UAH", booking.amount));
    if let Some(note) = &booking.note {
        lines.push(format!("<b>Note:</b> {}", escape_html(note)));
    }
    lines.push(format!("<code>{}</code>", escape_html(&booking.invoice_id)));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingStatus;
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>Tom & \"Jerry\"</b>"), "&lt;b&gt;Tom &amp; &quot;Jerry&quot;&lt;/b&gt;");
    }

    #[test]
    fn test_message_uses_local_time_and_escapes_input() {
        let booking = Booking {
            id: Uuid::new_v4(),
            invoice_id: "inv-1".to_string(),
            name: "<script>".to_string(),
            email: "a@b.c".to_string(),
            phone: None,
            session_type: "portrait".to_string(),
            selected_slot: Utc.with_ymd_and_hms(2030, 1, 7, 7, 0, 0).unwrap(),
            note: None,
            status: BookingStatus::Paid,
            amount: 900,
            calendar_event_id: None,
            created_at: Utc::now(),
            paid_at: None,
        };
        let message = payment_confirmed_message(&booking, chrono_tz::Europe::Kyiv);
        assert!(message.contains("&lt;script&gt;"));
        assert!(message.contains("Mon, 07 Jan 2030 09:00"));
        assert!(message.contains("900 UAH"));
        assert!(!message.contains("Phone"));
    }

    #[tokio::test]
    async fn test_unconfigured_notifier_reports_not_sent() {
        let notifier = TelegramNotifier::new(Client::new(), TelegramConfig::default());
        assert!(!notifier.send_message("hello").await.unwrap());
    }
}
