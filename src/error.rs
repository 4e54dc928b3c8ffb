//! The error taxonomy (spec.md §7) and its single wire-mapping impl.
//!
//! Every layer below the HTTP surface returns `Result<_, AppError>`. Only
//! [`AppError`]'s `IntoResponse` impl decides status codes and JSON shape —
//! no handler or calculator branches on status codes itself.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::config::RunMode;

/// Per-field validation failure, surfaced under `errors` in the JSend body.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed field, out-of-range numeric, missing required key.
    #[error("validation error")]
    Validation {
        message: String,
        fields: Vec<FieldError>,
    },

    /// No/invalid/expired bearer token.
    #[error("authentication required")]
    AuthenticationMissing(String),

    /// Authenticated but forbidden.
    #[error("forbidden")]
    Authorization(String),

    /// Resource does not exist, or the caller does not own it — uniform
    /// shape for both so ownership can never be probed by enumeration.
    #[error("not found")]
    NotFound(String),

    /// Uniqueness violation at the catalog layer.
    #[error("conflict")]
    Conflict(String),

    /// The per-route deadline (spec.md §5) elapsed before the request
    /// committed. Not one of spec.md §7's six literal error kinds — added
    /// to carry the cancellation outcome §5 requires into the same typed
    /// taxonomy rather than inventing a separate ad hoc response shape.
    #[error("timeout")]
    Timeout(String),

    /// Unexpected failure; database errors land here unless mapped below.
    #[error("internal error")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn validation_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        let field = field.into();
        let message = message.into();
        AppError::Validation {
            message: message.clone(),
            fields: vec![FieldError { field, message }],
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::AuthenticationMissing(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Timeout(_) => StatusCode::REQUEST_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn user_message(&self) -> String {
        match self {
            AppError::Validation { message, .. } => message.clone(),
            AppError::AuthenticationMissing(m) => m.clone(),
            AppError::Authorization(m) => m.clone(),
            AppError::NotFound(m) => m.clone(),
            AppError::Conflict(m) => m.clone(),
            AppError::Timeout(m) => m.clone(),
            AppError::Internal(_) => "Error interno del servidor".to_string(),
        }
    }

    /// Maps a `sqlx::Error` to the taxonomy using the Postgres `SQLSTATE`
    /// code table from spec.md §7 when the error carries one.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if let Some(code) = db_err.code() {
                return match code.as_ref() {
                    "23505" => AppError::Conflict(db_err.message().to_string()),
                    "23503" | "23502" | "22P02" => {
                        AppError::validation(db_err.message().to_string())
                    }
                    _ => AppError::Internal(err.to_string()),
                };
            }
        }
        AppError::Internal(err.to_string())
    }
}

#[derive(Serialize)]
struct JSendError {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<DiagnosticDetail>,
}

#[derive(Serialize)]
struct DiagnosticDetail {
    name: String,
    message: String,
    code: String,
}

/// Render an [`AppError`] into the JSend failure shape. In `development`
/// run-mode a diagnostic `error.{name,message,code}` field is attached;
/// in `production` it is always omitted, so 4xx/5xx responses never leak
/// internals (spec.md §7).
pub fn render_error(err: &AppError, run_mode: RunMode) -> Response {
    let status = err.status();
    let fields = match err {
        AppError::Validation { fields, .. } if !fields.is_empty() => Some(fields.clone()),
        _ => None,
    };

    let diagnostic = match run_mode {
        RunMode::Development => Some(DiagnosticDetail {
            name: variant_name(err).to_string(),
            message: err.to_string(),
            code: status.as_u16().to_string(),
        }),
        RunMode::Production => None,
    };

    let body = JSendError {
        success: false,
        message: err.user_message(),
        errors: fields,
        error: diagnostic,
    };

    (status, Json(json!(body))).into_response()
}

fn variant_name(err: &AppError) -> &'static str {
    match err {
        AppError::Validation { .. } => "Validation",
        AppError::AuthenticationMissing(_) => "AuthenticationMissing",
        AppError::Authorization(_) => "Authorization",
        AppError::NotFound(_) => "NotFound",
        AppError::Conflict(_) => "Conflict",
        AppError::Timeout(_) => "Timeout",
        AppError::Internal(_) => "Internal",
    }
}

/// Default `IntoResponse` for call sites that don't have a `RunMode`
/// handy (e.g. extractor rejections before state is available) — always
/// renders as `production` to fail safe.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        render_error(&self, RunMode::Production)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_violation_maps_to_conflict() {
        // sqlx::Error::Database variants can't be constructed directly in
        // tests without a live driver; the mapping logic for non-database
        // errors is covered here instead.
        let err = AppError::validation("bad request");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_is_uniform_for_missing_or_unowned() {
        let missing = AppError::NotFound("Terreno no encontrado o no accesible".to_string());
        let unowned = AppError::NotFound("Terreno no encontrado o no accesible".to_string());
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing.to_string(), unowned.to_string());
    }
}
