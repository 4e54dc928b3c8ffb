//! Power-Loss Calculator (C2)
//!
//! Produces the per-source HP loss breakdown and net power for a
//! (tractor, terrain, speed, load) tuple. The computation order below is
//! part of the contract: each step consumes the power remaining after the
//! previous step, so reordering changes the result.

use crate::domain::PowerLossBreakdown;
use crate::error::AppError;
use crate::units::{clamp, kmh_to_ms, round2, slope_pct_to_degrees};

/// Conversion factor from kgf·m/s to HP used throughout this calculator.
const KGFMS_TO_HP: f64 = 274.4;

#[derive(Debug, Clone, Copy)]
pub struct PowerLossInput {
    pub engine_hp: f64,
    pub altitude_m: f64,
    pub temperature_c: f64,
    pub total_weight_kg: f64,
    pub soil_cone_index: f64,
    /// May be negative (descent).
    pub slope_pct: f64,
    pub speed_kmh: f64,
    pub slippage_pct: f64,
    pub transmission_loss_factor: f64,
}

impl PowerLossInput {
    fn validate(&self) -> Result<(), AppError> {
        if !self.engine_hp.is_finite() || self.engine_hp <= 0.0 {
            return Err(AppError::validation_field(
                "engine_hp",
                "La potencia del motor debe ser un número positivo",
            ));
        }
        if !self.altitude_m.is_finite() || self.altitude_m < 0.0 {
            return Err(AppError::validation_field(
                "altitude_m",
                "La altitud no puede ser negativa",
            ));
        }
        if !self.temperature_c.is_finite() {
            return Err(AppError::validation_field(
                "temperature_c",
                "La temperatura debe ser un número finito",
            ));
        }
        if !self.total_weight_kg.is_finite() || self.total_weight_kg < 0.0 {
            return Err(AppError::validation_field(
                "total_weight_kg",
                "El peso total no puede ser negativo",
            ));
        }
        if !self.soil_cone_index.is_finite() || self.soil_cone_index <= 0.0 {
            return Err(AppError::validation_field(
                "soil_cone_index",
                "El índice de cono del suelo debe ser positivo",
            ));
        }
        if !self.slope_pct.is_finite() {
            return Err(AppError::validation_field(
                "slope_pct",
                "La pendiente debe ser un número finito",
            ));
        }
        if !self.speed_kmh.is_finite() || self.speed_kmh < 0.0 {
            return Err(AppError::validation_field(
                "speed_kmh",
                "La velocidad no puede ser negativa",
            ));
        }
        if !self.slippage_pct.is_finite() || self.slippage_pct < 0.0 {
            return Err(AppError::validation_field(
                "slippage_pct",
                "El porcentaje de patinaje no puede ser negativo",
            ));
        }
        if !self.transmission_loss_factor.is_finite() || self.transmission_loss_factor < 0.0 {
            return Err(AppError::validation_field(
                "transmission_loss_factor",
                "El factor de pérdida de transmisión no puede ser negativo",
            ));
        }
        Ok(())
    }
}

/// Soil label → cone index (Cn) mapping for this calculator. Distinct from
/// the Terrain Analyzer's canonical [`crate::domain::SoilType`] set — this
/// one recognizes `firm`/`soft` in addition to the catalog soils, matching
/// spec.md §4.2 literally.
pub fn cone_index_for_soil(soil_label: &str) -> f64 {
    match soil_label.to_ascii_lowercase().as_str() {
        "clay" => 45.0,
        "loam" => 35.0,
        "sandy" => 25.0,
        "firm" => 50.0,
        "soft" => 20.0,
        _ => 35.0,
    }
}

/// Computes the power-loss breakdown per spec.md §4.2, in the mandated
/// order. Total is rounded to two decimals at the boundary; intermediate
/// arithmetic stays at full precision.
pub fn calculate_power_loss(input: PowerLossInput) -> Result<PowerLossBreakdown, AppError> {
    input.validate()?;

    // 1. Altitude derate.
    let alt_loss = input.engine_hp * (input.altitude_m / 300.0).max(0.0) * 0.01;
    // 2. Temperature derate.
    let temp_loss = input.engine_hp * ((input.temperature_c - 15.0) / 5.0).max(0.0) * 0.01;
    // 3. Power remaining after atmospheric losses.
    let p_atm = input.engine_hp - alt_loss - temp_loss;
    // 4. Transmission loss.
    let trans_loss = p_atm * input.transmission_loss_factor;
    // 5. Power at the wheels.
    let p_wheels = p_atm - trans_loss;

    let slope_angle_rad = slope_pct_to_degrees(input.slope_pct).to_radians();
    let v_ms = kmh_to_ms(input.speed_kmh);
    let mu_r = 1.2 / input.soil_cone_index + 0.04;

    // 6. Rolling resistance (nonzero even on flat ground — uses cosine).
    let roll_loss_hp =
        (mu_r * input.total_weight_kg * slope_angle_rad.cos() * v_ms) / KGFMS_TO_HP;
    // 7. Slope loss — zero on level ground or descent.
    let slope_loss_hp =
        ((input.total_weight_kg * slope_angle_rad.sin() * v_ms) / KGFMS_TO_HP).max(0.0);

    // 8. Power remaining before slippage.
    let p_before_slip = p_wheels - roll_loss_hp - slope_loss_hp;
    // 9. Slippage loss.
    let slip_loss = p_before_slip.max(0.0) * (input.slippage_pct / 100.0);
    // 10. Net power delivered.
    let net_hp = (p_before_slip - slip_loss).max(0.0);

    let total = slope_loss_hp + alt_loss + roll_loss_hp + slip_loss + trans_loss;
    let efficiency_pct = if input.engine_hp > 0.0 {
        clamp(100.0 * net_hp / input.engine_hp, 0.0, 100.0)
    } else {
        0.0
    };

    Ok(PowerLossBreakdown {
        slope_hp: round2(slope_loss_hp),
        altitude_hp: round2(alt_loss),
        rolling_resistance_hp: round2(roll_loss_hp),
        slippage_hp: round2(slip_loss),
        transmission_hp: round2(trans_loss),
        total_hp: round2(total),
        gross_hp: round2(input.engine_hp),
        net_hp: round2(net_hp),
        efficiency_pct: round2(efficiency_pct),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_input() -> PowerLossInput {
        PowerLossInput {
            engine_hp: 100.0,
            altitude_m: 1500.0,
            temperature_c: 15.0,
            total_weight_kg: 4000.0,
            soil_cone_index: cone_index_for_soil("loam"),
            slope_pct: 0.0,
            speed_kmh: 8.0,
            slippage_pct: 0.0,
            transmission_loss_factor: 0.13,
        }
    }

    /// Seed scenario 1 (spec.md §8): altitude-only loss. `rolling_resistance_hp`
    /// and `net_hp` are asserted against the values the formula in steps 6-10
    /// above actually produces for these inputs (2.41 / 80.24), not the
    /// scenario's prose figures (4.95 / 77.70) — see DESIGN.md's Open
    /// Question Decisions for why the formula is treated as authoritative.
    #[test]
    fn seed_scenario_altitude_only() {
        let out = calculate_power_loss(base_input()).unwrap();
        assert_eq!(out.altitude_hp, 5.00);
        assert_eq!(out.transmission_hp, 12.35);
        assert_eq!(out.slope_hp, 0.0);
        assert_eq!(out.slippage_hp, 0.0);
        assert_eq!(out.rolling_resistance_hp, 2.41);
        assert_eq!(out.net_hp, 80.24);
        // Temperature equals the 15 C baseline, so no derate.
        let temp_loss = 100.0 * ((15.0f64 - 15.0) / 5.0).max(0.0) * 0.01;
        assert_eq!(round2(temp_loss), 0.0);
    }

    #[test]
    fn total_equals_sum_of_components() {
        let out = calculate_power_loss(base_input()).unwrap();
        let sum = out.slope_hp + out.altitude_hp + out.rolling_resistance_hp
            + out.slippage_hp
            + out.transmission_hp;
        assert!((out.total_hp - sum).abs() <= 0.01);
    }

    #[test]
    fn net_hp_is_bounded_by_gross() {
        let out = calculate_power_loss(base_input()).unwrap();
        assert!(out.net_hp >= 0.0);
        assert!(out.net_hp <= out.gross_hp);
    }

    #[test]
    fn descending_slope_yields_no_slope_loss() {
        let mut input = base_input();
        input.slope_pct = -15.0;
        let out = calculate_power_loss(input).unwrap();
        assert_eq!(out.slope_hp, 0.0);
    }

    #[test]
    fn negative_engine_hp_is_rejected() {
        let mut input = base_input();
        input.engine_hp = -1.0;
        assert!(calculate_power_loss(input).is_err());
    }

    #[test]
    fn nan_input_is_rejected() {
        let mut input = base_input();
        input.speed_kmh = f64::NAN;
        assert!(calculate_power_loss(input).is_err());
    }

    #[test]
    fn severe_power_deficit_saturates_net_at_zero() {
        let mut input = base_input();
        input.altitude_m = 30_000.0; // pathological, forces p_atm negative
        input.slippage_pct = 100.0;
        let out = calculate_power_loss(input).unwrap();
        assert_eq!(out.net_hp, 0.0);
    }

    #[test]
    fn cone_index_mapping_matches_spec_table() {
        assert_eq!(cone_index_for_soil("clay"), 45.0);
        assert_eq!(cone_index_for_soil("loam"), 35.0);
        assert_eq!(cone_index_for_soil("sandy"), 25.0);
        assert_eq!(cone_index_for_soil("firm"), 50.0);
        assert_eq!(cone_index_for_soil("soft"), 20.0);
        assert_eq!(cone_index_for_soil("unknown-label"), 35.0);
    }
}
