//! API handlers for the studio booking REST endpoints

pub mod auth;
pub mod availability;
pub mod bookings;
pub mod health;
pub mod openapi;
pub mod payments;
pub mod settings;
pub mod vacations;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use crate::{error::AppError, models::auth::AdminClaims, AppState};

/// Extractor for the authenticated studio admin
pub struct AuthenticatedAdmin(pub AdminClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedAdmin {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        // Signature and expiry are checked on every request
        let claims = state.services.auth.verify_token(token)?;

        Ok(AuthenticatedAdmin(claims))
    }
}
