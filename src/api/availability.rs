//! Public availability and session catalogue endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::{
        slot::{AvailabilityQuery, AvailabilityResponse},
        SessionType,
    },
    AppState,
};

/// Free session slots starting tomorrow
#[utoipa::path(
    get,
    path = "/availability",
    tag = "booking",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Bookable slots", body = AvailabilityResponse),
        (status = 500, description = "Calendar unreachable or not configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_availability(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    let slots = state.services.availability.get_availability(query.days).await?;
    Ok(Json(AvailabilityResponse { slots }))
}

/// Active session types
#[utoipa::path(
    get,
    path = "/session-types",
    tag = "booking",
    responses(
        (status = 200, description = "Session catalogue", body = Vec<SessionType>)
    )
)]
pub async fn list_session_types(State(state): State<AppState>) -> AppResult<Json<Vec<SessionType>>> {
    let session_types = state.services.bookings.list_session_types().await?;
    Ok(Json(session_types))
}
