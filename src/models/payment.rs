//! Payment provider webhook payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::booking::BookingStatus;

/// Invoice status as reported by the payment provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Created,
    Processing,
    Hold,
    Success,
    Failure,
    Reversed,
    Expired,
    #[serde(other)]
    Unknown,
}

impl InvoiceStatus {
    /// Booking status this provider status settles to, if any
    pub fn settlement(&self) -> Option<BookingStatus> {
        match self {
            InvoiceStatus::Success => Some(BookingStatus::Paid),
            InvoiceStatus::Failure | InvoiceStatus::Reversed => Some(BookingStatus::Failed),
            InvoiceStatus::Expired => Some(BookingStatus::Expired),
            InvoiceStatus::Created
            | InvoiceStatus::Processing
            | InvoiceStatus::Hold
            | InvoiceStatus::Unknown => None,
        }
    }
}

/// Inbound payment webhook body
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub invoice_id: String,
    pub status: InvoiceStatus,
    pub failure_reason: Option<String>,
    /// Amount in minor units
    pub amount: Option<i64>,
    pub ccy: Option<i32>,
    pub final_amount: Option<i64>,
    pub created_date: Option<DateTime<Utc>>,
    pub modified_date: Option<DateTime<Utc>>,
    pub reference: Option<String>,
}

/// Webhook acknowledgement
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    pub success: bool,
    pub status: BookingStatus,
    /// Whether this delivery changed the booking
    pub applied: bool,
}
