//! Persistence Gateway (C8)
//!
//! Writes a computation's result as one all-or-nothing transaction: a
//! parent `query` row, the calculator-specific child rows, and a
//! `query_history` row for the audit trail. If any insert fails the whole
//! write rolls back — callers never observe a query row with no children.

use serde_json::json;
use sqlx::{PgPool, Postgres, Row, Transaction};

use crate::domain::WorkType;
use crate::error::AppError;
use crate::minimum_power::MinimumPowerResult;
use crate::orchestrator::{explain, RecommendationOutcome};
use crate::power_loss::PowerLossBreakdown;

fn work_type_label(work_type: WorkType) -> &'static str {
    match work_type {
        WorkType::Tillage => "tillage",
        WorkType::Planting => "planting",
        WorkType::Harvesting => "harvesting",
        WorkType::Transport => "transport",
        WorkType::General => "general",
    }
}

async fn insert_query(
    tx: &mut Transaction<'_, Postgres>,
    user_id: i64,
    terrain_id: i64,
    tractor_id: Option<i64>,
    implement_id: Option<i64>,
    query_type: &str,
) -> Result<i64, AppError> {
    let row = sqlx::query(
        "INSERT INTO query (user_id, terrain_id, tractor_id, implement_id, query_type, status, created_at) \
         VALUES ($1, $2, $3, $4, $5, 'completed', NOW()) RETURNING query_id",
    )
    .bind(user_id)
    .bind(terrain_id)
    .bind(tractor_id)
    .bind(implement_id)
    .bind(query_type)
    .fetch_one(&mut **tx)
    .await
    .map_err(AppError::from_sqlx)?;

    row.try_get("query_id").map_err(AppError::from_sqlx)
}

async fn insert_history(
    tx: &mut Transaction<'_, Postgres>,
    query_id: i64,
    user_id: i64,
    action_type: &str,
    description: &str,
    result_json: serde_json::Value,
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO query_history (query_id, user_id, action_type, description, result_json, created_at) \
         VALUES ($1, $2, $3, $4, $5, NOW())",
    )
    .bind(query_id)
    .bind(user_id)
    .bind(action_type)
    .bind(description)
    .bind(result_json)
    .execute(&mut **tx)
    .await
    .map_err(AppError::from_sqlx)?;

    Ok(())
}

/// Persists a power-loss calculation: one `query` row, one `power_loss`
/// child row, one `query_history` row. Returns the new `query_id`.
pub async fn persist_power_loss(
    pool: &PgPool,
    user_id: i64,
    terrain_id: i64,
    tractor_id: i64,
    breakdown: &PowerLossBreakdown,
) -> Result<i64, AppError> {
    let mut tx = pool.begin().await.map_err(AppError::from_sqlx)?;

    let query_id =
        insert_query(&mut tx, user_id, terrain_id, Some(tractor_id), None, "power_loss").await?;

    sqlx::query(
        "INSERT INTO power_loss (query_id, slope, altitude, rolling_resistance, slippage, \
         transmission, total, gross_hp, net_hp, efficiency_pct) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(query_id)
    .bind(breakdown.slope_hp)
    .bind(breakdown.altitude_hp)
    .bind(breakdown.rolling_resistance_hp)
    .bind(breakdown.slippage_hp)
    .bind(breakdown.transmission_hp)
    .bind(breakdown.total_hp)
    .bind(breakdown.gross_hp)
    .bind(breakdown.net_hp)
    .bind(breakdown.efficiency_pct)
    .execute(&mut *tx)
    .await
    .map_err(AppError::from_sqlx)?;

    insert_history(
        &mut tx,
        query_id,
        user_id,
        "power_loss",
        "Cálculo de pérdida de potencia",
        json!({ "breakdown": breakdown }),
    )
    .await?;

    tx.commit().await.map_err(AppError::from_sqlx)?;
    Ok(query_id)
}

/// Persists a minimum-power calculation: one `query` row, one
/// `query_history` row. Unlike power-loss and recommendations, the data
/// model has no dedicated child table for this calculator's result, so the
/// full breakdown lives only in `query_history.result_json`. Returns the
/// new `query_id`.
pub async fn persist_minimum_power(
    pool: &PgPool,
    user_id: i64,
    terrain_id: i64,
    implement_id: i64,
    result: &MinimumPowerResult,
) -> Result<i64, AppError> {
    let mut tx = pool.begin().await.map_err(AppError::from_sqlx)?;

    let query_id = insert_query(
        &mut tx,
        user_id,
        terrain_id,
        None,
        Some(implement_id),
        "minimum_power",
    )
    .await?;

    insert_history(
        &mut tx,
        query_id,
        user_id,
        "minimum_power",
        "Cálculo de potencia mínima requerida",
        json!({ "result": result }),
    )
    .await?;

    tx.commit().await.map_err(AppError::from_sqlx)?;
    Ok(query_id)
}

/// Persists a recommendation run: one `query` row (its `tractor_id` is the
/// top-ranked candidate, per the data model's "chosen or best-ranked"
/// rule), up to three `recommendation` child rows, one `query_history`
/// row. Returns the new `query_id`.
pub async fn persist_recommendation(
    pool: &PgPool,
    user_id: i64,
    terrain_id: i64,
    implement_id: i64,
    work_type: WorkType,
    outcome: &RecommendationOutcome<'_>,
) -> Result<i64, AppError> {
    let mut tx = pool.begin().await.map_err(AppError::from_sqlx)?;

    let top_tractor_id = outcome.recommendations.first().map(|r| r.tractor_id);

    let query_id = insert_query(
        &mut tx,
        user_id,
        terrain_id,
        top_tractor_id,
        Some(implement_id),
        "recommendation",
    )
    .await?;

    let work_type_str = work_type_label(work_type);

    for entry in outcome.persisted() {
        let explanation = explain(entry, &outcome.terrain_analysis);
        let observations = json!({
            "rank": entry.rank,
            "score": {
                "total": entry.score.total,
                "breakdown": entry.score,
            },
            "compatibility": entry.score.total,
            "classification": entry.classification,
            "explanation": explanation,
            "snapshot": {
                "utilization_pct": entry.utilization_pct,
                "required_hp": outcome.required_hp,
            },
        });

        sqlx::query(
            "INSERT INTO recommendation (user_id, terrain_id, tractor_id, implement_id, \
             compatibility_score, observations, work_type, created_at, query_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, NOW(), $8)",
        )
        .bind(user_id)
        .bind(terrain_id)
        .bind(entry.tractor_id)
        .bind(implement_id)
        .bind(entry.score.total)
        .bind(observations)
        .bind(work_type_str)
        .bind(query_id)
        .execute(&mut *tx)
        .await
        .map_err(AppError::from_sqlx)?;
    }

    insert_history(
        &mut tx,
        query_id,
        user_id,
        "recommendation",
        "Generación de recomendaciones de tractores",
        json!({
            "required_hp": outcome.required_hp,
            "persisted_count": outcome.persisted().len(),
            "total_candidates": outcome.recommendations.len(),
        }),
    )
    .await?;

    tx.commit().await.map_err(AppError::from_sqlx)?;
    Ok(query_id)
}
