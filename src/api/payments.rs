//! Payment provider webhook

use axum::{extract::State, Json};

use crate::{
    error::AppResult,
    models::payment::{WebhookAck, WebhookPayload},
    AppState,
};

/// Invoice status callback from the payment provider.
///
/// A `success` status only settles the booking once the provider's own
/// invoice status confirms it.
#[utoipa::path(
    post,
    path = "/payment-webhook",
    tag = "payments",
    request_body = WebhookPayload,
    responses(
        (status = 200, description = "Processed (also for repeated deliveries)", body = WebhookAck),
        (status = 404, description = "Unknown invoice", body = crate::error::ErrorResponse),
        (status = 500, description = "Payment provider could not confirm the status", body = crate::error::ErrorResponse)
    )
)]
pub async fn payment_webhook(
    State(state): State<AppState>,
    Json(payload): Json<WebhookPayload>,
) -> AppResult<Json<WebhookAck>> {
    tracing::info!(invoice_id = %payload.invoice_id, status = ?payload.status, "Payment webhook received");

    let outcome = state.services.bookings.resolve_webhook(&payload).await?;
    for report in &outcome.steps {
        tracing::debug!(invoice_id = %payload.invoice_id, step = report.step, status = ?report.status, "Side effect");
    }

    Ok(Json(WebhookAck {
        success: true,
        status: outcome.booking.status,
        applied: outcome.applied,
    }))
}
