//! JSend response envelope (spec.md §6): `{success, message?, data?}` on
//! success, `{success:false, message, errors?}` on failure. Failure
//! rendering lives in [`crate::error::render_error`]; this module only
//! covers the success half plus the small conveniences handlers use to
//! build paginated listings.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;

/// Wraps `data` in the JSend success envelope with HTTP 200.
pub fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(json!({ "success": true, "data": data }))).into_response()
}

/// Wraps `data` in the JSend success envelope with a custom status code,
/// for `201 Created`-style responses.
pub fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(json!({ "success": true, "data": data }))).into_response()
}

#[derive(Debug, Serialize)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ok_envelope_shape() {
        let resp = ok(json!({"hello": "world"}));
        assert_eq!(resp.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let v: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["data"]["hello"], "world");
    }
}
