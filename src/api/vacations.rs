//! Admin vacation block endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::vacation::{CreateVacationBlock, VacationBlock},
    AppState,
};

use super::AuthenticatedAdmin;

/// List vacation blocks
#[utoipa::path(
    get,
    path = "/admin/vacation",
    tag = "admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Vacation blocks", body = Vec<VacationBlock>)
    )
)]
pub async fn list_vacations(
    State(state): State<AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
) -> AppResult<Json<Vec<VacationBlock>>> {
    let blocks = state.services.vacations.list().await?;
    Ok(Json(blocks))
}

/// Block a date range
#[utoipa::path(
    post,
    path = "/admin/vacation",
    tag = "admin",
    security(("bearer_auth" = [])),
    request_body = CreateVacationBlock,
    responses(
        (status = 201, description = "Block created", body = VacationBlock),
        (status = 400, description = "Invalid dates", body = crate::error::ErrorResponse)
    )
)]
pub async fn create_vacation(
    State(state): State<AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Json(data): Json<CreateVacationBlock>,
) -> AppResult<(StatusCode, Json<VacationBlock>)> {
    let block = state.services.vacations.block(data).await?;
    Ok((StatusCode::CREATED, Json(block)))
}

/// Remove a vacation block
#[utoipa::path(
    delete,
    path = "/admin/vacation/{id}",
    tag = "admin",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Vacation block ID")
    ),
    responses(
        (status = 204, description = "Block deleted"),
        (status = 404, description = "Unknown block", body = crate::error::ErrorResponse)
    )
)]
pub async fn delete_vacation(
    State(state): State<AppState>,
    AuthenticatedAdmin(_claims): AuthenticatedAdmin,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    state.services.vacations.unblock(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
