//! `GET /api/calculations/history` (spec.md §6).

use std::sync::Arc;

use axum::extract::{Query as QueryParams, State};
use axum::response::Response;
use serde::Deserialize;

use crate::api::envelope::{self, Page, Pagination};
use crate::auth::AuthContext;
use crate::db::repository;
use crate::domain::QueryType;
use crate::error::{render_error, AppError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(rename = "type")]
    pub query_type: Option<String>,
}

fn parse_query_type(raw: Option<&str>) -> Option<QueryType> {
    match raw?.to_ascii_lowercase().as_str() {
        "power_loss" => Some(QueryType::PowerLoss),
        "minimum_power" => Some(QueryType::MinimumPower),
        "recommendation" => Some(QueryType::Recommendation),
        _ => None,
    }
}

pub async fn handle(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    QueryParams(params): QueryParams<HistoryQuery>,
) -> Response {
    match run(&state, &auth, params).await {
        Ok(value) => envelope::ok(value),
        Err(err) => render_error(&err, state.config.run_mode),
    }
}

async fn run(
    state: &AppState,
    auth: &AuthContext,
    params: HistoryQuery,
) -> Result<Page<crate::domain::Query>, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * limit;

    let query_type = parse_query_type(params.query_type.as_deref());

    let result =
        repository::fetch_query_history(&state.db, auth.user_id, query_type, limit, offset)
            .await?;

    Ok(Page {
        items: result.queries,
        pagination: Pagination {
            page,
            limit,
            total: result.total,
        },
    })
}
