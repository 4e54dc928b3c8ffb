//! Ownership & Input Guard (C9)
//!
//! Two independent concerns share this module because both exist to stop
//! the same class of attack: probing the service with malformed or
//! out-of-range input to learn something about data the caller doesn't
//! own. Numeric coercion rejects malformed input before it reaches a
//! calculator; [`assert_owned`] collapses "doesn't exist" and "exists but
//! isn't yours" into one response shape so neither can be distinguished
//! from the outside.

use crate::domain::{Query, Terrain};
use crate::error::AppError;

/// Parses a JSON number into a finite `f64`, rejecting `NaN`/`Infinity`
/// that `serde_json` would otherwise happily hand back from a `null`-free
/// but still pathological payload (e.g. a client-constructed `1e400`).
pub fn require_finite(value: f64, field: &str, message: &str) -> Result<f64, AppError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AppError::validation_field(field, message))
    }
}

/// Rejects non-positive values for fields that are physically meaningless
/// at zero or below (engine power, base implement HP, working depth).
pub fn require_positive(value: f64, field: &str, message: &str) -> Result<f64, AppError> {
    let value = require_finite(value, field, message)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(AppError::validation_field(field, message))
    }
}

/// Rejects values outside `[min, max]`, inclusive. Used for percentages
/// (slippage, soil-moisture style bounded inputs) that have an explicit
/// valid range rather than just "non-negative".
pub fn require_in_range(
    value: f64,
    min: f64,
    max: f64,
    field: &str,
    message: &str,
) -> Result<f64, AppError> {
    let value = require_finite(value, field, message)?;
    if value >= min && value <= max {
        Ok(value)
    } else {
        Err(AppError::validation_field(field, message))
    }
}

/// Rejects a non-positive ID. Numeric strings in the wire payload are
/// coerced to `i64` by serde before reaching this guard; this only
/// enforces the positivity bound.
pub fn require_positive_id(value: i64, field: &str, message: &str) -> Result<i64, AppError> {
    if value > 0 {
        Ok(value)
    } else {
        Err(AppError::validation_field(field, message))
    }
}

/// `0 < working_speed_kmh < 40` (spec.md §6). The message must contain
/// "menor a 40" — seed scenario 6 asserts on that substring.
pub fn require_working_speed_kmh(value: f64) -> Result<f64, AppError> {
    let value = require_finite(
        value,
        "working_speed_kmh",
        "La velocidad de trabajo debe ser un número finito",
    )?;
    if value > 0.0 && value < 40.0 {
        Ok(value)
    } else {
        Err(AppError::validation_field(
            "working_speed_kmh",
            "La velocidad de trabajo debe ser mayor a 0 y menor a 40 km/h",
        ))
    }
}

/// `0 < working_depth_m ≤ 1.0` (spec.md §6). The message must contain
/// "1.0" — seed scenario 6 asserts on that substring.
pub fn require_working_depth_m(value: f64) -> Result<f64, AppError> {
    let value = require_finite(
        value,
        "working_depth_m",
        "La profundidad de trabajo debe ser un número finito",
    )?;
    if value > 0.0 && value <= 1.0 {
        Ok(value)
    } else {
        Err(AppError::validation_field(
            "working_depth_m",
            "La profundidad de trabajo debe ser mayor a 0 y no exceder 1.0 m",
        ))
    }
}

/// Anything the guard can check ownership of — a row that knows which
/// user it belongs to.
pub trait Owned {
    fn owner_user_id(&self) -> i64;
}

/// Enforces that `resource` belongs to `user_id`, unless `is_admin` is
/// set (admins may read any terrain/query for support purposes). On
/// failure returns the uniform [`AppError::NotFound`] — never
/// `Authorization` — so the caller cannot distinguish "doesn't exist"
/// from "exists but isn't yours" by status code or message.
pub fn assert_owned<T: Owned>(
    resource: &T,
    user_id: i64,
    is_admin: bool,
    not_found_message: &str,
) -> Result<(), AppError> {
    if is_admin || resource.owner_user_id() == user_id {
        Ok(())
    } else {
        Err(AppError::NotFound(not_found_message.to_string()))
    }
}

impl Owned for Terrain {
    fn owner_user_id(&self) -> i64 {
        self.owner_user_id
    }
}

/// Enforces both halves of the terrain access rule (spec.md §4.9):
/// ownership, and `status == "active"`. Both failure modes collapse to
/// the same uniform not-found response.
pub fn assert_terrain_accessible(
    terrain: &Terrain,
    user_id: i64,
    is_admin: bool,
) -> Result<(), AppError> {
    const NOT_FOUND: &str = "Terreno no encontrado o no accesible";
    assert_owned(terrain, user_id, is_admin, NOT_FOUND)?;
    if terrain.status != "active" {
        return Err(AppError::NotFound(NOT_FOUND.to_string()));
    }
    Ok(())
}

impl Owned for Query {
    fn owner_user_id(&self) -> i64 {
        self.user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Resource {
        owner: i64,
    }

    impl Owned for Resource {
        fn owner_user_id(&self) -> i64 {
            self.owner
        }
    }

    #[test]
    fn owner_passes() {
        let r = Resource { owner: 7 };
        assert!(assert_owned(&r, 7, false, "not found").is_ok());
    }

    #[test]
    fn non_owner_gets_not_found_not_forbidden() {
        let r = Resource { owner: 7 };
        let err = assert_owned(&r, 9, false, "Terreno no encontrado o no accesible").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn admin_bypasses_ownership() {
        let r = Resource { owner: 7 };
        assert!(assert_owned(&r, 9, true, "not found").is_ok());
    }

    #[test]
    fn nan_is_rejected() {
        assert!(require_finite(f64::NAN, "x", "must be finite").is_err());
    }

    #[test]
    fn zero_is_rejected_by_positive_guard() {
        assert!(require_positive(0.0, "x", "must be positive").is_err());
    }

    #[test]
    fn in_range_accepts_boundaries() {
        assert!(require_in_range(0.0, 0.0, 100.0, "x", "msg").is_ok());
        assert!(require_in_range(100.0, 0.0, 100.0, "x", "msg").is_ok());
        assert!(require_in_range(100.01, 0.0, 100.0, "x", "msg").is_err());
    }

    /// Seed scenario 6 (spec.md §8): validation boundaries.
    #[test]
    fn working_speed_boundary_at_forty_is_rejected() {
        let err = require_working_speed_kmh(40.0).unwrap_err();
        let message = match err {
            AppError::Validation { message, .. } => message,
            _ => panic!("expected Validation"),
        };
        assert!(message.contains("menor a 40"));
        assert!(require_working_speed_kmh(39.9).is_ok());
    }

    #[test]
    fn working_depth_boundary_above_one_is_rejected() {
        let err = require_working_depth_m(1.5).unwrap_err();
        let message = match err {
            AppError::Validation { message, .. } => message,
            _ => panic!("expected Validation"),
        };
        assert!(message.contains("1.0"));
        assert!(require_working_depth_m(1.0).is_ok());
    }

    #[test]
    fn inactive_terrain_is_not_accessible_even_to_owner() {
        let terrain = Terrain {
            terrain_id: 1,
            owner_user_id: 7,
            name: "T".to_string(),
            altitude_m: 100.0,
            slope_pct: 5.0,
            soil_type: "loam".to_string(),
            temperature_c: None,
            status: "inactive".to_string(),
        };
        assert!(assert_terrain_accessible(&terrain, 7, false).is_err());
    }

    #[test]
    fn positive_id_guard() {
        assert!(require_positive_id(1, "tractor_id", "msg").is_ok());
        assert!(require_positive_id(0, "tractor_id", "msg").is_err());
        assert!(require_positive_id(-5, "tractor_id", "msg").is_err());
    }
}
