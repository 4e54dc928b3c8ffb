//! Read-side repository.
//!
//! Catalog tables (`terrain`, `tractor`, `implement`) are owned by
//! collaborators outside this service; columns are read as plain SQL
//! scalars and mapped into the domain enums by hand rather than via
//! `sqlx`'s derive machinery, since this service does not control (and
//! must not assume) the Postgres column types on the other side.

use sqlx::{PgPool, Row};

use crate::domain::{
    Implement, ImplementType, Query, QueryStatus, QueryType, Terrain, Tractor, TractionType,
    TractorStatus,
};
use crate::error::AppError;

fn parse_traction_type(raw: &str) -> TractionType {
    match raw.to_ascii_lowercase().as_str() {
        "4x4" => TractionType::FourByFour,
        "track" | "oruga" => TractionType::Track,
        _ => TractionType::FourByTwo,
    }
}

fn parse_tractor_status(raw: &str) -> TractorStatus {
    match raw.to_ascii_lowercase().as_str() {
        "available" | "disponible" => TractorStatus::Available,
        "active" | "activo" => TractorStatus::Active,
        "maintenance" | "mantenimiento" => TractorStatus::Maintenance,
        "in_use" | "en_uso" => TractorStatus::InUse,
        _ => TractorStatus::Inactive,
    }
}

fn parse_implement_type(raw: &str) -> ImplementType {
    match raw.to_ascii_lowercase().as_str() {
        "plow" | "arado" => ImplementType::Plow,
        "harrow" | "rastra" => ImplementType::Harrow,
        "seeder" | "sembradora" => ImplementType::Seeder,
        "sprayer" | "fumigadora" => ImplementType::Sprayer,
        "harvester" | "cosechadora" => ImplementType::Harvester,
        "cultivator" | "cultivadora" => ImplementType::Cultivator,
        "mower" | "cortadora" => ImplementType::Mower,
        "trailer" | "remolque" => ImplementType::Trailer,
        _ => ImplementType::Other,
    }
}

fn parse_query_type(raw: &str) -> QueryType {
    match raw {
        "power_loss" => QueryType::PowerLoss,
        "minimum_power" => QueryType::MinimumPower,
        _ => QueryType::Recommendation,
    }
}

fn parse_query_status(raw: &str) -> QueryStatus {
    match raw {
        "failed" => QueryStatus::Failed,
        _ => QueryStatus::Completed,
    }
}

pub async fn fetch_terrain(pool: &PgPool, terrain_id: i64) -> Result<Terrain, AppError> {
    let row = sqlx::query(
        "SELECT terrain_id, owner_user_id, name, altitude_m, slope_pct, soil_type, \
         temperature_c, status FROM terrain WHERE terrain_id = $1",
    )
    .bind(terrain_id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::from_sqlx)?
    .ok_or_else(|| AppError::NotFound("Terreno no encontrado o no accesible".to_string()))?;

    Ok(Terrain {
        terrain_id: row.try_get("terrain_id").map_err(AppError::from_sqlx)?,
        owner_user_id: row.try_get("owner_user_id").map_err(AppError::from_sqlx)?,
        name: row.try_get("name").map_err(AppError::from_sqlx)?,
        altitude_m: row.try_get("altitude_m").map_err(AppError::from_sqlx)?,
        slope_pct: row.try_get("slope_pct").map_err(AppError::from_sqlx)?,
        soil_type: row.try_get("soil_type").map_err(AppError::from_sqlx)?,
        temperature_c: row.try_get("temperature_c").map_err(AppError::from_sqlx)?,
        status: row.try_get("status").map_err(AppError::from_sqlx)?,
    })
}

pub async fn fetch_implement(pool: &PgPool, implement_id: i64) -> Result<Implement, AppError> {
    let row = sqlx::query(
        "SELECT implement_id, implement_name, implement_type, power_requirement_hp, \
         working_width_m, working_depth_cm, status FROM implement WHERE implement_id = $1",
    )
    .bind(implement_id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::from_sqlx)?
    .ok_or_else(|| AppError::NotFound("Implemento no encontrado o no accesible".to_string()))?;

    let implement_type: String = row.try_get("implement_type").map_err(AppError::from_sqlx)?;

    Ok(Implement {
        implement_id: row.try_get("implement_id").map_err(AppError::from_sqlx)?,
        implement_name: row.try_get("implement_name").map_err(AppError::from_sqlx)?,
        implement_type: parse_implement_type(&implement_type),
        power_requirement_hp: row
            .try_get("power_requirement_hp")
            .map_err(AppError::from_sqlx)?,
        working_width_m: row.try_get("working_width_m").map_err(AppError::from_sqlx)?,
        working_depth_cm: row.try_get("working_depth_cm").map_err(AppError::from_sqlx)?,
        status: row.try_get("status").map_err(AppError::from_sqlx)?,
    })
}

pub async fn fetch_tractor(pool: &PgPool, tractor_id: i64) -> Result<Tractor, AppError> {
    let row = sqlx::query(
        "SELECT tractor_id, name, brand, model, engine_power_hp, weight_kg, \
         traction_force_kn, traction_type, tire_type, status, fuel_consumption_lph \
         FROM tractor WHERE tractor_id = $1",
    )
    .bind(tractor_id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::from_sqlx)?
    .ok_or_else(|| AppError::NotFound("Tractor no encontrado o no accesible".to_string()))?;

    row_to_tractor(&row)
}

/// Loads the full tractor catalog. The service's candidate pool is small
/// enough (on the order of hundreds of machines) that pre-filtering in
/// SQL isn't worth the complexity — the Candidate Filter (C5) runs
/// in-process over this slice.
pub async fn fetch_tractor_catalog(pool: &PgPool) -> Result<Vec<Tractor>, AppError> {
    let rows = sqlx::query(
        "SELECT tractor_id, name, brand, model, engine_power_hp, weight_kg, \
         traction_force_kn, traction_type, tire_type, status, fuel_consumption_lph \
         FROM tractor",
    )
    .fetch_all(pool)
    .await
    .map_err(AppError::from_sqlx)?;

    rows.iter().map(row_to_tractor).collect()
}

fn row_to_tractor(row: &sqlx::postgres::PgRow) -> Result<Tractor, AppError> {
    let traction_type: String = row.try_get("traction_type").map_err(AppError::from_sqlx)?;
    let status: String = row.try_get("status").map_err(AppError::from_sqlx)?;

    Ok(Tractor {
        tractor_id: row.try_get("tractor_id").map_err(AppError::from_sqlx)?,
        name: row.try_get("name").map_err(AppError::from_sqlx)?,
        brand: row.try_get("brand").map_err(AppError::from_sqlx)?,
        model: row.try_get("model").map_err(AppError::from_sqlx)?,
        engine_power_hp: row.try_get("engine_power_hp").map_err(AppError::from_sqlx)?,
        weight_kg: row.try_get("weight_kg").map_err(AppError::from_sqlx)?,
        traction_force_kn: row
            .try_get("traction_force_kn")
            .map_err(AppError::from_sqlx)?,
        traction_type: parse_traction_type(&traction_type),
        tire_type: row.try_get("tire_type").map_err(AppError::from_sqlx)?,
        status: parse_tractor_status(&status),
        fuel_consumption_lph: row
            .try_get("fuel_consumption_lph")
            .map_err(AppError::from_sqlx)?,
    })
}

/// A single page of a user's computation history (`GET /api/calculations/history`),
/// newest first. `query_type` narrows it to one calculator when set.
pub struct HistoryPage {
    pub queries: Vec<Query>,
    pub total: i64,
}

pub async fn fetch_query_history(
    pool: &PgPool,
    user_id: i64,
    query_type: Option<QueryType>,
    limit: i64,
    offset: i64,
) -> Result<HistoryPage, AppError> {
    let type_filter = query_type.map(query_type_label);

    let rows = sqlx::query(
        "SELECT query_id, user_id, terrain_id, tractor_id, implement_id, query_type, \
         status, created_at FROM query WHERE user_id = $1 \
         AND ($2::text IS NULL OR query_type = $2) \
         ORDER BY created_at DESC LIMIT $3 OFFSET $4",
    )
    .bind(user_id)
    .bind(type_filter)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(AppError::from_sqlx)?;

    let queries = rows
        .iter()
        .map(|row| {
            let query_type: String = row.try_get("query_type").map_err(AppError::from_sqlx)?;
            let status: String = row.try_get("status").map_err(AppError::from_sqlx)?;
            Ok(Query {
                query_id: row.try_get("query_id").map_err(AppError::from_sqlx)?,
                user_id: row.try_get("user_id").map_err(AppError::from_sqlx)?,
                terrain_id: row.try_get("terrain_id").map_err(AppError::from_sqlx)?,
                tractor_id: row.try_get("tractor_id").map_err(AppError::from_sqlx)?,
                implement_id: row.try_get("implement_id").map_err(AppError::from_sqlx)?,
                query_type: parse_query_type(&query_type),
                status: parse_query_status(&status),
                created_at: row.try_get("created_at").map_err(AppError::from_sqlx)?,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;

    let total: i64 = sqlx::query(
        "SELECT COUNT(*) AS count FROM query WHERE user_id = $1 \
         AND ($2::text IS NULL OR query_type = $2)",
    )
    .bind(user_id)
    .bind(type_filter)
    .fetch_one(pool)
    .await
    .map_err(AppError::from_sqlx)?
    .try_get("count")
    .map_err(AppError::from_sqlx)?;

    Ok(HistoryPage { queries, total })
}

fn query_type_label(query_type: QueryType) -> &'static str {
    match query_type {
        QueryType::PowerLoss => "power_loss",
        QueryType::Recommendation => "recommendation",
        QueryType::MinimumPower => "minimum_power",
    }
}

/// A persisted recommendation row plus the `query.user_id` it belongs to,
/// read together so the handler can enforce ownership without a second
/// round-trip.
#[derive(Debug, serde::Serialize)]
pub struct RecommendationRow {
    pub recommendation_id: i64,
    pub owner_user_id: i64,
    pub tractor_id: i64,
    pub terrain_id: i64,
    pub implement_id: i64,
    pub compatibility_score: f64,
    pub observations: serde_json::Value,
    pub work_type: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl crate::guard::Owned for RecommendationRow {
    fn owner_user_id(&self) -> i64 {
        self.owner_user_id
    }
}

pub async fn fetch_recommendation(
    pool: &PgPool,
    recommendation_id: i64,
) -> Result<RecommendationRow, AppError> {
    let row = sqlx::query(
        "SELECT recommendation_id, user_id, tractor_id, terrain_id, implement_id, \
         compatibility_score, observations, work_type, created_at \
         FROM recommendation WHERE recommendation_id = $1",
    )
    .bind(recommendation_id)
    .fetch_optional(pool)
    .await
    .map_err(AppError::from_sqlx)?
    .ok_or_else(|| {
        AppError::NotFound("Recomendación no encontrada o no accesible".to_string())
    })?;

    row_to_recommendation(&row)
}

fn row_to_recommendation(row: &sqlx::postgres::PgRow) -> Result<RecommendationRow, AppError> {
    Ok(RecommendationRow {
        recommendation_id: row.try_get("recommendation_id").map_err(AppError::from_sqlx)?,
        owner_user_id: row.try_get("user_id").map_err(AppError::from_sqlx)?,
        tractor_id: row.try_get("tractor_id").map_err(AppError::from_sqlx)?,
        terrain_id: row.try_get("terrain_id").map_err(AppError::from_sqlx)?,
        implement_id: row.try_get("implement_id").map_err(AppError::from_sqlx)?,
        compatibility_score: row.try_get("compatibility_score").map_err(AppError::from_sqlx)?,
        observations: row.try_get("observations").map_err(AppError::from_sqlx)?,
        work_type: row.try_get("work_type").map_err(AppError::from_sqlx)?,
        created_at: row.try_get("created_at").map_err(AppError::from_sqlx)?,
    })
}

/// A page of a user's persisted recommendations (`GET
/// /api/recommendations/history`), newest first, optionally narrowed to one
/// `work_type`. Distinct from [`fetch_query_history`]: that reads the
/// `query` ledger (every calculator call, status only); this reads the
/// `recommendation` table itself, so each item carries its score and
/// observations.
pub struct RecommendationHistoryPage {
    pub items: Vec<RecommendationRow>,
    pub total: i64,
}

pub async fn fetch_recommendation_history(
    pool: &PgPool,
    user_id: i64,
    work_type: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<RecommendationHistoryPage, AppError> {
    let rows = sqlx::query(
        "SELECT recommendation_id, user_id, tractor_id, terrain_id, implement_id, \
         compatibility_score, observations, work_type, created_at \
         FROM recommendation WHERE user_id = $1 \
         AND ($2::text IS NULL OR work_type = $2) \
         ORDER BY created_at DESC LIMIT $3 OFFSET $4",
    )
    .bind(user_id)
    .bind(work_type)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(AppError::from_sqlx)?;

    let items = rows
        .iter()
        .map(row_to_recommendation)
        .collect::<Result<Vec<_>, AppError>>()?;

    let total: i64 = sqlx::query(
        "SELECT COUNT(*) AS count FROM recommendation WHERE user_id = $1 \
         AND ($2::text IS NULL OR work_type = $2)",
    )
    .bind(user_id)
    .bind(work_type)
    .fetch_one(pool)
    .await
    .map_err(AppError::from_sqlx)?
    .try_get("count")
    .map_err(AppError::from_sqlx)?;

    Ok(RecommendationHistoryPage { items, total })
}
