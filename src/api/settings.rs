//! Admin working hours endpoints

use axum::{extract::State, Json};

use crate::{error::AppResult, models::WorkingHours, AppState};

use super::AuthenticatedAdmin;

/// Get working hours
#[utoipa::path(
    get,
    path = "/admin/settings/working-hours",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Working hours", body = WorkingHours)
    )
)]
pub async fn get_working_hours(
    State(state): State<AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
) -> AppResult<Json<WorkingHours>> {
    let hours = state.services.settings.working_hours().await?;
    Ok(Json(hours))
}

/// Update working hours
#[utoipa::path(
    put,
    path = "/admin/settings/working-hours",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = WorkingHours,
    responses(
        (status = 200, description = "Working hours updated", body = WorkingHours),
        (status = 400, description = "Invalid hours", body = crate::error::ErrorResponse)
    )
)]
pub async fn update_working_hours(
    State(state): State<AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Json(hours): Json<WorkingHours>,
) -> AppResult<Json<WorkingHours>> {
    let hours = state.services.settings.update_working_hours(hours).await?;
    Ok(Json(hours))
}
