//! `POST /api/recommendations/generate`, `GET /api/recommendations/history`,
//! `GET /api/recommendations/:id` (spec.md §6).

use std::sync::Arc;

use axum::extract::{Path, Query as QueryParams, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use crate::api::envelope::{self, Page, Pagination};
use crate::auth::AuthContext;
use crate::db::{gateway, repository};
use crate::domain::WorkType;
use crate::error::{render_error, AppError};
use crate::guard;
use crate::orchestrator::{explain, generate_recommendations};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub terrain_id: i64,
    pub implement_id: i64,
    pub working_depth_m: Option<f64>,
    pub work_type: Option<String>,
}

fn parse_work_type(raw: Option<&str>) -> WorkType {
    match raw.map(|s| s.to_ascii_lowercase()).as_deref() {
        Some("tillage") => WorkType::Tillage,
        Some("planting") => WorkType::Planting,
        Some("harvesting") => WorkType::Harvesting,
        Some("transport") => WorkType::Transport,
        _ => WorkType::General,
    }
}

pub async fn generate(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(body): Json<GenerateRequest>,
) -> Response {
    match run_generate(&state, &auth, body).await {
        Ok(value) => envelope::ok(value),
        Err(err) => render_error(&err, state.config.run_mode),
    }
}

async fn run_generate(
    state: &AppState,
    auth: &AuthContext,
    body: GenerateRequest,
) -> Result<serde_json::Value, AppError> {
    guard::require_positive_id(
        body.terrain_id,
        "terrain_id",
        "El identificador del terreno debe ser positivo",
    )?;
    guard::require_positive_id(
        body.implement_id,
        "implement_id",
        "El identificador del implemento debe ser positivo",
    )?;

    let terrain = repository::fetch_terrain(&state.db, body.terrain_id).await?;
    guard::assert_terrain_accessible(&terrain, auth.user_id, auth.is_admin())?;
    let implement = repository::fetch_implement(&state.db, body.implement_id).await?;
    let catalog = repository::fetch_tractor_catalog(&state.db).await?;

    let working_depth_m = match body.working_depth_m {
        Some(d) => guard::require_working_depth_m(d)?,
        None => implement
            .working_depth_cm
            .map(|cm| cm / 100.0)
            .unwrap_or(0.25),
    };

    let work_type = parse_work_type(body.work_type.as_deref());

    let outcome = generate_recommendations(
        &terrain.soil_type,
        terrain.slope_pct,
        &implement,
        working_depth_m,
        &catalog,
    )?;

    let explanations: Vec<_> = outcome
        .recommendations
        .iter()
        .map(|entry| explain(entry, &outcome.terrain_analysis))
        .collect();

    let query_id = gateway::persist_recommendation(
        &state.db,
        auth.user_id,
        terrain.terrain_id,
        implement.implement_id,
        work_type,
        &outcome,
    )
    .await?;

    let top_score = outcome.recommendations.first().map(|r| r.score.total);
    let top_tractor_id = outcome.recommendations.first().map(|r| r.tractor_id);

    Ok(serde_json::json!({
        "implement": implement,
        "terrain": terrain,
        "terrainAnalysis": outcome.terrain_analysis,
        "powerRequirement": { "required_hp": outcome.required_hp },
        "recommendations": outcome.recommendations,
        "explanations": explanations,
        "summary": {
            "topScore": top_score,
            "topTractor": top_tractor_id,
            "candidateCount": outcome.recommendations.len(),
            "persistedCount": outcome.persisted().len(),
            "reason": outcome.elimination_reason,
        },
        "queryId": query_id,
    }))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub work_type: Option<String>,
}

/// Normalizes the `work_type` query param to one of the recognized labels,
/// or `None` for an absent/blank filter — mirrors [`parse_work_type`]'s
/// recognized set but keeps the string form, since the `recommendation`
/// table stores `work_type` as text rather than this service's enum.
fn normalize_work_type_filter(raw: Option<&str>) -> Option<String> {
    let trimmed = raw.map(str::trim).filter(|s| !s.is_empty())?;
    Some(match trimmed.to_ascii_lowercase().as_str() {
        "tillage" => "tillage".to_string(),
        "planting" => "planting".to_string(),
        "harvesting" => "harvesting".to_string(),
        "transport" => "transport".to_string(),
        _ => "general".to_string(),
    })
}

pub async fn history(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    QueryParams(params): QueryParams<HistoryQuery>,
) -> Response {
    match run_history(&state, &auth, params).await {
        Ok(value) => envelope::ok(value),
        Err(err) => render_error(&err, state.config.run_mode),
    }
}

async fn run_history(
    state: &AppState,
    auth: &AuthContext,
    params: HistoryQuery,
) -> Result<Page<repository::RecommendationRow>, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * limit;
    let work_type = normalize_work_type_filter(params.work_type.as_deref());

    let result = repository::fetch_recommendation_history(
        &state.db,
        auth.user_id,
        work_type.as_deref(),
        limit,
        offset,
    )
    .await?;

    Ok(Page {
        items: result.items,
        pagination: Pagination {
            page,
            limit,
            total: result.total,
        },
    })
}

pub async fn get_by_id(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(recommendation_id): Path<i64>,
) -> Response {
    match run_get_by_id(&state, &auth, recommendation_id).await {
        Ok(value) => envelope::ok(value),
        Err(err) => render_error(&err, state.config.run_mode),
    }
}

async fn run_get_by_id(
    state: &AppState,
    auth: &AuthContext,
    recommendation_id: i64,
) -> Result<repository::RecommendationRow, AppError> {
    let row = repository::fetch_recommendation(&state.db, recommendation_id).await?;
    if !auth.is_admin() && row.owner_user_id != auth.user_id {
        return Err(AppError::Authorization(
            "No tiene permiso para ver esta recomendación".to_string(),
        ));
    }
    Ok(row)
}
