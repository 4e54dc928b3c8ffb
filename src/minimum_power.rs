//! Minimum-Power Calculator (C3)
//!
//! `HP_min = HP_base * F_soil * F_slope * F_depth * 1.15`

use crate::domain::SoilType;
use crate::error::AppError;
use crate::units::round2;

/// Fixed 15% safety margin (spec.md §4.3).
const SAFETY_MARGIN: f64 = 1.15;

/// Reference working depth (m) the depth factor is normalized against.
const REFERENCE_DEPTH_M: f64 = 0.25;

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MinimumPowerFactors {
    pub soil_factor: f64,
    pub slope_factor: f64,
    pub depth_factor: f64,
    pub safety_margin: f64,
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct MinimumPowerResult {
    pub calculated_hp: f64,
    pub minimum_hp: f64,
    pub factors: MinimumPowerFactors,
}

/// Soil factor table. Unknown/unmapped soils (including `wet_clay`, which
/// has no entry) default to loam's 1.0, per spec.md §4.3.
fn soil_factor(soil: SoilType) -> f64 {
    match soil {
        SoilType::Clay => 1.3,
        SoilType::Loam => 1.0,
        SoilType::Sandy => 0.8,
        SoilType::Rocky => 1.5,
        SoilType::WetClay => 1.0,
    }
}

fn slope_factor(slope_pct: f64) -> f64 {
    1.0 + (slope_pct / 100.0) * 0.5
}

fn depth_factor(working_depth_m: f64) -> f64 {
    working_depth_m / REFERENCE_DEPTH_M
}

/// Computes the required minimum horsepower for an implement on a given
/// terrain. Rejects a non-positive `base_hp` or a non-finite `slope_pct`.
pub fn calculate_minimum_power(
    base_hp: f64,
    soil: SoilType,
    slope_pct: f64,
    working_depth_m: f64,
) -> Result<MinimumPowerResult, AppError> {
    if !base_hp.is_finite() || base_hp <= 0.0 {
        return Err(AppError::validation_field(
            "base_hp",
            "La potencia base del implemento debe ser positiva",
        ));
    }
    if !slope_pct.is_finite() {
        return Err(AppError::validation_field(
            "slope_pct",
            "La pendiente debe ser un número finito",
        ));
    }
    if !working_depth_m.is_finite() || working_depth_m <= 0.0 {
        return Err(AppError::validation_field(
            "working_depth_m",
            "La profundidad de trabajo debe ser positiva",
        ));
    }

    let f_soil = soil_factor(soil);
    let f_slope = slope_factor(slope_pct);
    let f_depth = depth_factor(working_depth_m);

    let calculated_hp = base_hp * f_soil * f_slope * f_depth;
    let minimum_hp = calculated_hp * SAFETY_MARGIN;

    Ok(MinimumPowerResult {
        calculated_hp: round2(calculated_hp),
        minimum_hp: round2(minimum_hp),
        factors: MinimumPowerFactors {
            soil_factor: f_soil,
            slope_factor: f_slope,
            depth_factor: f_depth,
            safety_margin: SAFETY_MARGIN,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Seed scenario 4 (spec.md §8): minimum power formula.
    #[test]
    fn seed_scenario_minimum_power_formula() {
        let result = calculate_minimum_power(80.0, SoilType::Clay, 10.0, 0.30).unwrap();
        assert_eq!(result.factors.soil_factor, 1.3);
        assert_eq!(result.factors.slope_factor, 1.05);
        assert!((result.factors.depth_factor - 1.2).abs() < 1e-9);
        assert_eq!(result.calculated_hp, 131.04);
        assert_eq!(result.minimum_hp, 150.70);
    }

    #[test]
    fn unknown_soil_defaults_to_loam_factor() {
        let result = calculate_minimum_power(50.0, SoilType::WetClay, 0.0, 0.25).unwrap();
        assert_eq!(result.factors.soil_factor, 1.0);
    }

    #[test]
    fn non_positive_base_hp_rejected() {
        assert!(calculate_minimum_power(0.0, SoilType::Loam, 0.0, 0.25).is_err());
        assert!(calculate_minimum_power(-10.0, SoilType::Loam, 0.0, 0.25).is_err());
    }

    #[test]
    fn nan_slope_rejected() {
        assert!(calculate_minimum_power(80.0, SoilType::Loam, f64::NAN, 0.25).is_err());
    }
}
