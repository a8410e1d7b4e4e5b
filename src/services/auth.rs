//! Admin authentication: password check and session tokens

use argon2::{
    password_hash::{PasswordHash, PasswordVerifier},
    Argon2,
};

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::auth::{AdminClaims, LoginRequest, LoginResponse},
};

#[derive(Clone)]
pub struct AuthService {
    config: AuthConfig,
}

impl AuthService {
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Check admin credentials and issue a signed, time-bound token
    pub fn login(&self, request: &LoginRequest) -> AppResult<LoginResponse> {
        if request.username != self.config.admin_username || !self.verify_password(&request.password)? {
            tracing::warn!(username = %request.username, "Failed admin login");
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        let claims = AdminClaims::new(&self.config.admin_username, self.config.jwt_expiration_hours);
        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        tracing::info!(username = %claims.sub, "Admin logged in");
        Ok(LoginResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: claims.exp - claims.iat,
        })
    }

    pub fn verify_token(&self, token: &str) -> AppResult<AdminClaims> {
        AdminClaims::from_token(token, &self.config.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))
    }

    fn verify_password(&self, password: &str) -> AppResult<bool> {
        if self.config.admin_password_hash.is_empty() {
            return Err(AppError::Configuration("Admin password hash is not configured".to_string()));
        }
        let parsed_hash = PasswordHash::new(&self.config.admin_password_hash)
            .map_err(|_| AppError::Configuration("Invalid admin password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::password_hash::{PasswordHasher, SaltString};

    fn service(password: &str) -> AuthService {
        let salt = SaltString::from_b64("c3R1ZGlvc2FsdA").unwrap();
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .unwrap()
            .to_string();
        AuthService::new(AuthConfig {
            jwt_secret: "test-secret".to_string(),
            jwt_expiration_hours: 12,
            admin_username: "admin".to_string(),
            admin_password_hash: hash,
        })
    }

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_login_issues_verifiable_token() {
        let svc = service("s3cret");
        let response = svc.login(&login("admin", "s3cret")).unwrap();
        assert_eq!(response.expires_in, 12 * 3600);
        let claims = svc.verify_token(&response.token).unwrap();
        assert_eq!(claims.sub, "admin");
    }

    #[test]
    fn test_wrong_credentials_rejected() {
        let svc = service("s3cret");
        assert!(matches!(svc.login(&login("admin", "nope")), Err(AppError::Authentication(_))));
        assert!(matches!(svc.login(&login("root", "s3cret")), Err(AppError::Authentication(_))));
    }

    #[test]
    fn test_expired_or_foreign_token_rejected() {
        let svc = service("s3cret");
        let expired = AdminClaims {
            sub: "admin".to_string(),
            iat: 1_000,
            exp: 2_000,
        }
        .create_token("test-secret")
        .unwrap();
        assert!(svc.verify_token(&expired).is_err());

        let foreign = AdminClaims::new("admin", 1).create_token("other-secret").unwrap();
        assert!(svc.verify_token(&foreign).is_err());
    }
}
