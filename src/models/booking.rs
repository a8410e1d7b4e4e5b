//! Booking model, lifecycle status and request/response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Booking lifecycle status.
///
/// `Pending` is the only initial state; the other three are terminal and
/// have no outbound transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Paid,
    Failed,
    Expired,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Paid => "paid",
            BookingStatus::Failed => "failed",
            BookingStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, BookingStatus::Pending)
    }

    /// Whether `self -> next` is an allowed transition
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        *self == BookingStatus::Pending && next.is_terminal()
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "paid" => Ok(BookingStatus::Paid),
            "failed" => Ok(BookingStatus::Failed),
            "expired" => Ok(BookingStatus::Expired),
            _ => Err(format!("Invalid booking status: {}", s)),
        }
    }
}

// SQLx conversion for BookingStatus (stored as TEXT)
impl sqlx::Type<Postgres> for BookingStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for BookingStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for BookingStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Booking record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    /// Invoice id assigned by the payment provider; join key for webhooks
    pub invoice_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub session_type: String,
    /// Session start
    pub selected_slot: DateTime<Utc>,
    pub note: Option<String>,
    pub status: BookingStatus,
    /// Deposit amount in major currency units
    pub amount: i64,
    /// Mirror of the session in the external calendar (weak reference)
    pub calendar_event_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// Data for a new pending booking row
#[derive(Debug, Clone, PartialEq)]
pub struct NewBooking {
    pub invoice_id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub session_type: String,
    pub selected_slot: DateTime<Utc>,
    pub note: Option<String>,
    pub amount: i64,
}

/// Visitor booking details
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[serde(default)]
    #[validate(email(message = "a valid email is required"))]
    pub email: String,
    pub phone: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "sessionType is required"))]
    pub session_type: String,
    /// Chosen slot start (RFC 3339, as returned in `startISO`)
    #[serde(default)]
    #[validate(length(min = 1, message = "selectedSlot is required"))]
    pub selected_slot: String,
    pub note: Option<String>,
}

impl BookingRequest {
    /// Validate required fields and parse the selected slot
    pub fn into_new_booking(self, invoice_id: String, amount: i64) -> AppResult<NewBooking> {
        let selected_slot = self.parsed_slot()?;
        Ok(NewBooking {
            invoice_id,
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: non_blank(self.phone),
            session_type: self.session_type.trim().to_string(),
            selected_slot,
            note: non_blank(self.note),
            amount,
        })
    }

    pub fn check(&self) -> AppResult<DateTime<Utc>> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("name is required".to_string()));
        }
        self.validate()?;
        self.parsed_slot()
    }

    fn parsed_slot(&self) -> AppResult<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(self.selected_slot.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| AppError::Validation("selectedSlot must be an RFC 3339 timestamp".to_string()))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Booking submission: visitor details plus the deposit the client displayed
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    #[serde(flatten)]
    pub booking: BookingRequest,
    /// Deposit in major units; only used when the session type is not in the catalogue
    pub amount: Option<i64>,
}

/// Invoice creation request: booking details plus the deposit the client displayed
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRequest {
    pub booking_data: BookingRequest,
    /// Deposit in major units; only used when the session type is not in the catalogue
    pub amount: Option<i64>,
}

/// Invoice creation response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub invoice_id: String,
    pub hosted_page_url: String,
}

/// Reference to a freshly opened pending booking
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OpenedBooking {
    pub booking_id: Uuid,
    pub invoice_id: String,
    pub hosted_page_url: String,
    pub status: BookingStatus,
    pub amount: i64,
}

/// Booking status lookup response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingStatusResponse {
    pub invoice_id: String,
    pub status: BookingStatus,
}

/// Query parameters for the admin booking list
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookingQuery {
    /// Status filter (`pending`, `paid`, `failed`, `expired` or `all`)
    pub status: Option<String>,
    /// Case-insensitive match on name or email
    pub search: Option<String>,
}

/// Parsed booking list filter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingFilter {
    pub status: Option<BookingStatus>,
    pub search: Option<String>,
}

impl TryFrom<BookingQuery> for BookingFilter {
    type Error = AppError;

    fn try_from(query: BookingQuery) -> Result<Self, Self::Error> {
        let status = match query.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(s) => Some(s.parse::<BookingStatus>().map_err(AppError::Validation)?),
        };
        let search = non_blank(query.search);
        Ok(Self { status, search })
    }
}

/// Booking counts per status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct BookingStats {
    pub total: i64,
    pub pending: i64,
    pub paid: i64,
    pub failed: i64,
    pub expired: i64,
}

impl BookingStats {
    pub fn from_counts(counts: &[(BookingStatus, i64)]) -> Self {
        let mut stats = Self::default();
        for (status, count) in counts {
            match status {
                BookingStatus::Pending => stats.pending += count,
                BookingStatus::Paid => stats.paid += count,
                BookingStatus::Failed => stats.failed += count,
                BookingStatus::Expired => stats.expired += count,
            }
            stats.total += count;
        }
        stats
    }
}

/// Admin booking list response
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingListResponse {
    pub bookings: Vec<Booking>,
    pub stats: BookingStats,
}
