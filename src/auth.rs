//! Bearer-token verification.
//!
//! Token *issuance* is an external collaborator's concern (spec.md §1
//! Non-goals); this module only verifies HS256 JWTs presented to it and
//! extracts the authenticated `user_id`/`role` the rest of the service
//! consumes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::response::Response;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{render_error, AppError};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Standard,
}

#[derive(Debug, Deserialize)]
struct Claims {
    /// Subject — the stable integer `user_id`.
    sub: i64,
    role: Role,
    exp: usize,
}

/// Authenticated caller identity, extracted from `Authorization: Bearer`.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    pub user_id: i64,
    pub role: Role,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        matches!(self.role, Role::Admin)
    }
}

impl FromRequestParts<Arc<AppState>> for AuthContext {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let render = |err: AppError| render_error(&err, state.config.run_mode);

        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| {
                render(AppError::AuthenticationMissing(
                    "Token de autenticación requerido".to_string(),
                ))
            })?;

        let key = DecodingKey::from_secret(state.config.jwt_signing_secret.as_bytes());
        let validation = Validation::default();

        let data = decode::<Claims>(token, &key, &validation).map_err(|_| {
            render(AppError::AuthenticationMissing(
                "Token inválido o expirado".to_string(),
            ))
        })?;

        Ok(AuthContext {
            user_id: data.claims.sub,
            role: data.claims.role,
        })
    }
}
