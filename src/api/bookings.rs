//! Booking endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::booking::{
        BookingFilter, BookingListResponse, BookingQuery, BookingStatusResponse, CreateBookingRequest,
        InvoiceRequest, InvoiceResponse, OpenedBooking,
    },
    AppState,
};

use super::AuthenticatedAdmin;

/// Submit booking details and open a deposit invoice
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "booking",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Pending booking opened", body = OpenedBooking),
        (status = 400, description = "Missing or invalid fields", body = crate::error::ErrorResponse),
        (status = 500, description = "Payment provider failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> AppResult<(StatusCode, Json<OpenedBooking>)> {
    let opened = state
        .services
        .bookings
        .open_booking(request.booking, request.amount)
        .await?;
    Ok((StatusCode::CREATED, Json(opened)))
}

/// Open a deposit invoice for booking details
#[utoipa::path(
    post,
    path = "/invoices",
    tag = "booking",
    request_body = InvoiceRequest,
    responses(
        (status = 200, description = "Invoice opened", body = InvoiceResponse),
        (status = 400, description = "Missing or invalid fields", body = crate::error::ErrorResponse),
        (status = 500, description = "Payment provider failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_invoice(
    State(state): State<AppState>,
    Json(request): Json<InvoiceRequest>,
) -> AppResult<Json<InvoiceResponse>> {
    let opened = state
        .services
        .bookings
        .open_booking(request.booking_data, request.amount)
        .await?;
    Ok(Json(InvoiceResponse {
        invoice_id: opened.invoice_id,
        hosted_page_url: opened.hosted_page_url,
    }))
}

/// Booking status by invoice id
#[utoipa::path(
    get,
    path = "/bookings/{invoice_id}/status",
    tag = "booking",
    params(
        ("invoice_id" = String, Path, description = "Payment provider invoice id")
    ),
    responses(
        (status = 200, description = "Current status", body = BookingStatusResponse),
        (status = 404, description = "Unknown invoice", body = crate::error::ErrorResponse)
    )
)]
pub async fn booking_status(
    State(state): State<AppState>,
    Path(invoice_id): Path<String>,
) -> AppResult<Json<BookingStatusResponse>> {
    let status = state.services.bookings.status_by_invoice(&invoice_id).await?;
    Ok(Json(status))
}

/// List bookings with per-status counts
#[utoipa::path(
    get,
    path = "/admin/bookings",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(BookingQuery),
    responses(
        (status = 200, description = "Bookings", body = BookingListResponse),
        (status = 401, description = "Not authenticated", body = crate::error::ErrorResponse)
    )
)]
pub async fn list_bookings(
    State(state): State<AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Query(query): Query<BookingQuery>,
) -> AppResult<Json<BookingListResponse>> {
    let filter = BookingFilter::try_from(query)?;
    let bookings = state.services.bookings.list_bookings(&filter).await?;
    Ok(Json(bookings))
}
