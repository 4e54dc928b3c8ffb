//! `POST /api/calculations/minimum-power` (spec.md §6).

use std::sync::Arc;

use axum::extract::State;
use axum::response::Response;
use axum::Json;
use serde::Deserialize;

use crate::api::envelope;
use crate::auth::AuthContext;
use crate::db::{gateway, repository};
use crate::error::{render_error, AppError};
use crate::guard;
use crate::minimum_power::calculate_minimum_power;
use crate::state::AppState;
use crate::terrain::normalize_soil_type;

#[derive(Debug, Deserialize)]
pub struct MinimumPowerRequest {
    pub implement_id: i64,
    pub terrain_id: i64,
    pub working_depth_m: Option<f64>,
}

pub async fn handle(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(body): Json<MinimumPowerRequest>,
) -> Response {
    match run(&state, &auth, body).await {
        Ok(value) => envelope::ok(value),
        Err(err) => render_error(&err, state.config.run_mode),
    }
}

async fn run(
    state: &AppState,
    auth: &AuthContext,
    body: MinimumPowerRequest,
) -> Result<serde_json::Value, AppError> {
    guard::require_positive_id(
        body.implement_id,
        "implement_id",
        "El identificador del implemento debe ser positivo",
    )?;
    guard::require_positive_id(
        body.terrain_id,
        "terrain_id",
        "El identificador del terreno debe ser positivo",
    )?;

    let terrain = repository::fetch_terrain(&state.db, body.terrain_id).await?;
    guard::assert_terrain_accessible(&terrain, auth.user_id, auth.is_admin())?;
    let implement = repository::fetch_implement(&state.db, body.implement_id).await?;

    let working_depth_m = match body.working_depth_m {
        Some(d) => guard::require_working_depth_m(d)?,
        None => implement
            .working_depth_cm
            .map(|cm| cm / 100.0)
            .unwrap_or(0.25),
    };

    let soil = normalize_soil_type(&terrain.soil_type);
    let result = calculate_minimum_power(
        implement.power_requirement_hp,
        soil,
        terrain.slope_pct,
        working_depth_m,
    )?;

    let query_id = gateway::persist_minimum_power(
        &state.db,
        auth.user_id,
        terrain.terrain_id,
        implement.implement_id,
        &result,
    )
    .await?;

    Ok(serde_json::json!({
        "powerRequirement": {
            "minimum_power_hp": result.minimum_hp,
            "calculated_power_hp": result.calculated_hp,
            "factors": result.factors,
        },
        "implement": implement,
        "terrain": terrain,
        "queryId": query_id,
    }))
}
