//! `POST /api/calculations/power-loss` (spec.md §6).

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
use crate::power_loss::{calculate_power_loss, cone_index_for_soil, PowerLossInput};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PowerLossRequest {
    pub tractor_id: i64,
    pub terrain_id: i64,
    pub working_speed_kmh: f64,
    pub carried_objects_weight_kg: f64,
    pub slippage_percent: Option<f64>,
}

pub async fn handle(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Json(body): Json<PowerLossRequest>,
) -> Response {
    match run(&state, &auth, body).await {
        Ok(value) => envelope::ok(value),
        Err(err) => render_error(&err, state.config.run_mode),
    }
}

async fn run(
    state: &AppState,
    auth: &AuthContext,
    body: PowerLossRequest,
) -> Result<serde_json::Value, AppError> {
    guard::require_positive_id(body.tractor_id, "tractor_id", "El identificador del tractor debe ser positivo")?;
    guard::require_positive_id(body.terrain_id, "terrain_id", "El identificador del terreno debe ser positivo")?;
    guard::require_working_speed_kmh(body.working_speed_kmh)?;
    guard::require_in_range(
        body.carried_objects_weight_kg,
        0.0,
        f64::MAX,
        "carried_objects_weight_kg",
        "El peso de la carga no puede ser negativo",
    )?;
    let slippage_pct = body.slippage_percent.unwrap_or(10.0);
    guard::require_in_range(
        slippage_pct,
        0.0,
        100.0,
        "slippage_percent",
        "El porcentaje de patinaje debe estar entre 0 y 100",
    )?;

    let terrain = repository::fetch_terrain(&state.db, body.terrain_id).await?;
    guard::assert_terrain_accessible(&terrain, auth.user_id, auth.is_admin())?;
    let tractor = repository::fetch_tractor(&state.db, body.tractor_id).await?;

    let input = PowerLossInput {
        engine_hp: tractor.engine_power_hp,
        altitude_m: terrain.altitude_m,
        temperature_c: terrain.temperature_or_default(),
        total_weight_kg: tractor.weight_kg + body.carried_objects_weight_kg,
        soil_cone_index: cone_index_for_soil(&terrain.soil_type),
        slope_pct: terrain.slope_pct,
        speed_kmh: body.working_speed_kmh,
        slippage_pct,
        transmission_loss_factor: 0.13,
    };

    let breakdown = calculate_power_loss(input)?;

    let query_id = gateway::persist_power_loss(
        &state.db,
        auth.user_id,
        terrain.terrain_id,
        tractor.tractor_id,
        &breakdown,
    )
    .await?;

    Ok(serde_json::json!({
        "breakdown": breakdown,
        "queryId": query_id,
    }))
}
