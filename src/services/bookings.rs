//! Booking lifecycle: opening bookings against an invoice and settling them
//! from payment webhooks.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use chrono_tz::Tz;

use crate::{
    error::{AppError, AppResult},
    models::{
        booking::{
            BookingFilter, BookingListResponse, BookingRequest, BookingStats, BookingStatusResponse,
            OpenedBooking,
        },
        Booking, BookingStatus, SessionType, WebhookPayload,
    },
    repository::{BookingStore, SessionTypeStore},
    services::{
        calendar::{CalendarEvent, CalendarGateway, EventTiming},
        payment::{NewInvoice, PaymentGateway},
        pipeline::{SideEffects, StepReport},
        settings::SettingsService,
        slots,
        telegram::{payment_confirmed_message, Notifier},
    },
};

/// Upper bound for a client-supplied deposit, in major units
const MAX_CLIENT_DEPOSIT: i64 = 1_000_000;

/// Static rules the lifecycle applies, resolved from configuration
#[derive(Debug, Clone)]
pub struct BookingPolicy {
    pub tz: Tz,
    pub block_minutes: i64,
    pub session_minutes: i64,
    pub side_effect_timeout: Duration,
    pub currency_code: i32,
    pub invoice_validity_secs: u64,
    pub public_base_url: String,
}

/// Result of processing one webhook delivery
#[derive(Debug)]
pub struct WebhookOutcome {
    pub booking: Booking,
    /// Whether this delivery changed the booking status
    pub applied: bool,
    pub steps: Vec<StepReport>,
}

#[derive(Clone)]
pub struct BookingService {
    store: Arc<dyn BookingStore>,
    session_types: Arc<dyn SessionTypeStore>,
    payment: Arc<dyn PaymentGateway>,
    calendar: Arc<dyn CalendarGateway>,
    notifier: Arc<dyn Notifier>,
    settings: SettingsService,
    policy: BookingPolicy,
}

impl BookingService {
    pub fn new(
        store: Arc<dyn BookingStore>,
        session_types: Arc<dyn SessionTypeStore>,
        payment: Arc<dyn PaymentGateway>,
        calendar: Arc<dyn CalendarGateway>,
        notifier: Arc<dyn Notifier>,
        settings: SettingsService,
        policy: BookingPolicy,
    ) -> Self {
        Self {
            store,
            session_types,
            payment,
            calendar,
            notifier,
            settings,
            policy,
        }
    }

    /// Validate the request, open an invoice for the deposit and persist a
    /// pending booking. No row is written when the invoice cannot be opened.
    pub async fn open_booking(
        &self,
        request: BookingRequest,
        client_amount: Option<i64>,
    ) -> AppResult<OpenedBooking> {
        let selected_slot = request.check()?;
        if selected_slot <= Utc::now() {
            return Err(AppError::Validation("selectedSlot must be in the future".to_string()));
        }
        let working_hours = self.settings.working_hours().await?;
        if !slots::is_slot_start(selected_slot, working_hours, self.policy.block_minutes, self.policy.tz) {
            return Err(AppError::Validation(
                "selectedSlot is not a bookable slot start".to_string(),
            ));
        }

        let session_type = self
            .session_types
            .find_by_slug(request.session_type.trim())
            .await?;
        let amount = deposit_for(session_type.as_ref(), client_amount)?;
        let item_name = session_type
            .as_ref()
            .map(|s| s.name.clone())
            .unwrap_or_else(|| request.session_type.trim().to_string());

        let local_slot = selected_slot.with_timezone(&self.policy.tz);
        let base_url = self.policy.public_base_url.trim_end_matches('/');
        let amount_minor = amount
            .checked_mul(100)
            .ok_or_else(|| AppError::Validation("deposit amount is too large".to_string()))?;
        let invoice = NewInvoice {
            amount_minor,
            currency: self.policy.currency_code,
            reference: format!("booking-{}", Utc::now().timestamp_millis()),
            description: format!(
                "Deposit: {} session, {}",
                item_name,
                local_slot.format("%d.%m.%Y %H:%M")
            ),
            item_name,
            redirect_url: format!("{}/booking/success", base_url),
            webhook_url: format!("{}/api/v1/payment-webhook", base_url),
            validity_secs: self.policy.invoice_validity_secs,
        };

        let created = self.payment.create_invoice(&invoice).await?;

        let new_booking = request.into_new_booking(created.invoice_id.clone(), amount)?;
        let booking = self.store.insert(&new_booking).await.map_err(|e| {
            tracing::error!(
                invoice_id = %created.invoice_id,
                "Invoice opened but booking could not be stored: {}", e
            );
            e
        })?;

        tracing::info!(
            booking_id = %booking.id,
            invoice_id = %booking.invoice_id,
            amount = booking.amount,
            "Pending booking opened"
        );

        Ok(OpenedBooking {
            booking_id: booking.id,
            invoice_id: booking.invoice_id,
            hosted_page_url: created.hosted_page_url,
            status: booking.status,
            amount: booking.amount,
        })
    }

    /// Apply a payment provider notification.
    ///
    /// Only `pending` bookings change. Repeated or conflicting terminal
    /// statuses are acknowledged without touching the booking or re-running
    /// side effects.
    pub async fn resolve_webhook(&self, payload: &WebhookPayload) -> AppResult<WebhookOutcome> {
        let invoice_id = payload.invoice_id.as_str();
        let booking = self
            .store
            .find_by_invoice(invoice_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking for invoice {} not found", invoice_id)))?;

        let Some(target) = payload.status.settlement() else {
            tracing::info!(invoice_id, status = ?payload.status, "Non-final invoice status, nothing to do");
            return Ok(WebhookOutcome {
                booking,
                applied: false,
                steps: Vec::new(),
            });
        };

        if !booking.status.can_transition_to(target) {
            return Ok(self.already_settled(booking, target));
        }

        // The webhook body is unauthenticated; payment is confirmed with the provider
        if target == BookingStatus::Paid {
            let confirmed = self.payment.invoice_status(invoice_id).await?;
            if confirmed.settlement() != Some(BookingStatus::Paid) {
                tracing::warn!(
                    invoice_id,
                    provider_status = ?confirmed,
                    "Success notification not confirmed by the provider, ignored"
                );
                return Ok(WebhookOutcome {
                    booking,
                    applied: false,
                    steps: Vec::new(),
                });
            }
        }

        let mut booking = match self.store.transition(invoice_id, target).await? {
            Some(updated) => updated,
            None => {
                // Another delivery settled it between our read and write
                let current = self
                    .store
                    .find_by_invoice(invoice_id)
                    .await?
                    .ok_or_else(|| AppError::NotFound(format!("Booking for invoice {} not found", invoice_id)))?;
                return Ok(self.already_settled(current, target));
            }
        };

        tracing::info!(
            invoice_id,
            booking_id = %booking.id,
            status = %booking.status,
            failure_reason = payload.failure_reason.as_deref().unwrap_or(""),
            "Booking settled"
        );

        let steps = if target == BookingStatus::Paid {
            self.confirm_paid(&mut booking).await
        } else {
            Vec::new()
        };

        Ok(WebhookOutcome {
            booking,
            applied: true,
            steps,
        })
    }

    pub async fn status_by_invoice(&self, invoice_id: &str) -> AppResult<BookingStatusResponse> {
        let booking = self
            .store
            .find_by_invoice(invoice_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking for invoice {} not found", invoice_id)))?;
        Ok(BookingStatusResponse {
            invoice_id: booking.invoice_id,
            status: booking.status,
        })
    }

    pub async fn list_bookings(&self, filter: &BookingFilter) -> AppResult<BookingListResponse> {
        let bookings = self.store.list(filter).await?;
        let stats = BookingStats::from_counts(&self.store.count_by_status().await?);
        Ok(BookingListResponse { bookings, stats })
    }

    pub async fn list_session_types(&self) -> AppResult<Vec<SessionType>> {
        self.session_types.list_active().await
    }

    fn already_settled(&self, booking: Booking, target: BookingStatus) -> WebhookOutcome {
        let mut effects = SideEffects::new(self.policy.side_effect_timeout, booking.invoice_id.as_str());
        if booking.status == target {
            tracing::info!(invoice_id = %booking.invoice_id, status = %target, "Duplicate webhook delivery");
            if target == BookingStatus::Paid {
                effects.skip("calendar_event", "already exists");
                effects.skip("notification", "already sent");
            }
        } else {
            tracing::warn!(
                invoice_id = %booking.invoice_id,
                current = %booking.status,
                received = %target,
                "Conflicting webhook status ignored, first terminal status wins"
            );
        }
        WebhookOutcome {
            booking,
            applied: false,
            steps: effects.into_reports(),
        }
    }

    /// Best-effort follow-up for a freshly paid booking
    async fn confirm_paid(&self, booking: &mut Booking) -> Vec<StepReport> {
        let mut effects = SideEffects::new(self.policy.side_effect_timeout, booking.invoice_id.as_str());

        let event = self.session_event(booking);
        if let Some(event_id) = effects
            .run("calendar_event", self.calendar.create_event(&event))
            .await
        {
            if effects
                .run("record_calendar_event", self.store.set_calendar_event(booking.id, &event_id))
                .await
                .is_some()
            {
                booking.calendar_event_id = Some(event_id);
            }
        }

        let message = payment_confirmed_message(booking, self.policy.tz);
        let notifier = &self.notifier;
        effects
            .run("notification", async {
                if notifier.send_message(&message).await? {
                    Ok(())
                } else {
                    Err(AppError::upstream("telegram", "message not delivered"))
                }
            })
            .await;

        effects.into_reports()
    }

    fn session_event(&self, booking: &Booking) -> CalendarEvent {
        let mut description = vec![
            format!("Client: {}", booking.name),
            format!("Email: {}", booking.email),
        ];
        if let Some(phone) = &booking.phone {
            description.push(format!("Phone: {}", phone));
        }
        if let Some(note) = &booking.note {
            description.push(format!("Note: {}", note));
        }
        description.push(format!("Deposit: {} (invoice {})", booking.amount, booking.invoice_id));
        description.push(format!(
            "Session {} min, calendar blocked for {} min",
            self.policy.session_minutes, self.policy.block_minutes
        ));

        CalendarEvent {
            summary: format!("Photo session: {}", booking.session_type),
            description: description.join("\n"),
            timing: EventTiming::Timed {
                start: booking.selected_slot,
                end: booking.selected_slot + chrono::Duration::minutes(self.policy.block_minutes),
            },
            color_id: None,
            reminder_minutes: Some(30),
        }
    }
}

/// Deposit in major units: catalogue price share, or the caller's amount for
/// session types outside the catalogue
fn deposit_for(session_type: Option<&SessionType>, client_amount: Option<i64>) -> AppResult<i64> {
    let amount = match session_type {
        Some(st) => st.deposit_amount(),
        None => client_amount.ok_or_else(|| {
            AppError::Validation("amount is required for this session type".to_string())
        })?,
    };
    if amount <= 0 {
        return Err(AppError::Validation("deposit amount must be positive".to_string()));
    }
    if session_type.is_none() && amount > MAX_CLIENT_DEPOSIT {
        return Err(AppError::Validation(format!(
            "deposit amount must not exceed {}",
            MAX_CLIENT_DEPOSIT
        )));
    }
    Ok(amount)
}
