//! Core domain entities and enums shared across the calculators, the
//! repository layer, and the HTTP handlers.
//!
//! Catalog entities (`Terrain`, `Tractor`, `Implement`) are read-mostly —
//! they are owned by CRUD collaborators outside this service's scope and
//! are only ever read here. `Query`/`PowerLoss`/`Recommendation`/
//! `QueryHistory` are the rows this service writes, once, per request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Canonical soil classification used by the Terrain Analyzer (C4) and the
/// Minimum-Power Calculator (C3). Incoming labels (Spanish or English) are
/// normalized into this set at the boundary — see
/// [`crate::terrain::normalize_soil_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilType {
    Clay,
    Loam,
    Sandy,
    Rocky,
    WetClay,
}

impl std::fmt::Display for SoilType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SoilType::Clay => "clay",
            SoilType::Loam => "loam",
            SoilType::Sandy => "sandy",
            SoilType::Rocky => "rocky",
            SoilType::WetClay => "wet_clay",
        };
        f.write_str(s)
    }
}

/// Drive-train configuration of a tractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TractionType {
    #[serde(rename = "4x4")]
    FourByFour,
    #[serde(rename = "4x2")]
    FourByTwo,
    Track,
}

impl std::fmt::Display for TractionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TractionType::FourByFour => "4x4",
            TractionType::FourByTwo => "4x2",
            TractionType::Track => "track",
        };
        f.write_str(s)
    }
}

/// Slope classification produced by the Terrain Analyzer (C4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SlopeClass {
    Flat,
    Rolling,
    Steep,
}

/// Operational status of a tractor in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TractorStatus {
    Available,
    Active,
    Maintenance,
    InUse,
    Inactive,
}

impl TractorStatus {
    /// `available ∪ active` per the design-note resolution of the two
    /// conflicting availability rules observed in the source system.
    pub fn is_available(self) -> bool {
        matches!(self, TractorStatus::Available | TractorStatus::Active)
    }

    /// Contributes to the Scoring Engine's availability component (C6.5).
    pub fn availability_score(self) -> f64 {
        match self {
            TractorStatus::Available | TractorStatus::Active => 10.0,
            TractorStatus::InUse | TractorStatus::Maintenance => 5.0,
            TractorStatus::Inactive => 0.0,
        }
    }
}

/// Agricultural implement category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplementType {
    Plow,
    Harrow,
    Seeder,
    Sprayer,
    Harvester,
    Cultivator,
    Mower,
    Trailer,
    Other,
}

/// Coarse label for the agricultural task a recommendation was made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkType {
    Tillage,
    Planting,
    Harvesting,
    Transport,
    General,
}

/// The kind of computation a `Query` row records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    PowerLoss,
    Recommendation,
    MinimumPower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    Completed,
    Failed,
}

/// A parcel of land. Owned by a user; only the owner or an admin may read
/// or modify it (enforced by the Ownership Guard, C9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Terrain {
    pub terrain_id: i64,
    pub owner_user_id: i64,
    pub name: String,
    pub altitude_m: f64,
    pub slope_pct: f64,
    /// Raw label as stored — may be Spanish or English, not yet normalized.
    pub soil_type: String,
    pub temperature_c: Option<f64>,
    pub status: String,
}

impl Terrain {
    /// `temperature_c` defaults to 15 °C when not recorded.
    pub fn temperature_or_default(&self) -> f64 {
        self.temperature_c.unwrap_or(15.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tractor {
    pub tractor_id: i64,
    pub name: String,
    pub brand: String,
    pub model: String,
    pub engine_power_hp: f64,
    pub weight_kg: f64,
    pub traction_force_kn: f64,
    pub traction_type: TractionType,
    pub tire_type: String,
    pub status: TractorStatus,
    /// Fuel consumption in liters/hour, when the catalog records it. Feeds
    /// the economic score component (C6.4) when present.
    pub fuel_consumption_lph: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Implement {
    pub implement_id: i64,
    pub implement_name: String,
    pub implement_type: ImplementType,
    pub power_requirement_hp: f64,
    pub working_width_m: f64,
    pub working_depth_cm: Option<f64>,
    pub status: String,
}

/// Parent record for a single computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub query_id: i64,
    pub user_id: i64,
    pub terrain_id: i64,
    pub tractor_id: Option<i64>,
    pub implement_id: Option<i64>,
    pub query_type: QueryType,
    pub status: QueryStatus,
    pub created_at: DateTime<Utc>,
}

/// Per-source HP loss breakdown produced by the Power-Loss Calculator (C2).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PowerLossBreakdown {
    pub slope_hp: f64,
    pub altitude_hp: f64,
    pub rolling_resistance_hp: f64,
    pub slippage_hp: f64,
    pub transmission_hp: f64,
    pub total_hp: f64,
    pub gross_hp: f64,
    pub net_hp: f64,
    pub efficiency_pct: f64,
}

/// Fit classification driven by utilization `u = 100 * required_hp / tractor_hp`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FitClassification {
    Optimal,
    Good,
    Overpowered,
    Excessive,
}
