//! Admin authentication endpoint

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    error::AppResult,
    models::auth::{LoginRequest, LoginResponse},
    AppState,
};

/// Log in as the studio admin
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::error::ErrorResponse)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    request.validate()?;
    let response = state.services.auth.login(&request)?;
    Ok(Json(response))
}
