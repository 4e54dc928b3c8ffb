//! Unit & conversion helpers
//!
//! Pure, total functions shared by the physics calculators. Nothing here
//! touches I/O; rounding to the externally-visible two-decimal precision
//! happens at the boundary of the calculators that use these, not here.

use std::f64::consts::PI;

/// Converts degrees to radians.
pub fn deg_to_rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

/// Converts radians to degrees.
pub fn rad_to_deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

/// Converts a slope expressed as a percentage (rise/run * 100) to degrees.
///
/// `slope_pct_to_degrees(p) = atan(p/100) * 180/pi`
pub fn slope_pct_to_degrees(slope_pct: f64) -> f64 {
    rad_to_deg((slope_pct / 100.0).atan())
}

/// Converts km/h to m/s.
pub fn kmh_to_ms(speed_kmh: f64) -> f64 {
    speed_kmh / 3.6
}

/// Rounds a value to two decimal places, the precision contract for every
/// externally-visible HP field and score.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Clamps a value into `[min, max]`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slope_zero_is_zero_degrees() {
        assert!((slope_pct_to_degrees(0.0)).abs() < 1e-9);
    }

    #[test]
    fn slope_100_pct_is_45_degrees() {
        assert!((slope_pct_to_degrees(100.0) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn kmh_conversion() {
        assert!((kmh_to_ms(3.6) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn round2_rounds_half_up() {
        assert_eq!(round2(1.005), 1.0);
        assert_eq!(round2(77.6999), 77.7);
    }

    #[test]
    fn clamp_bounds() {
        assert_eq!(clamp(150.0, 0.0, 100.0), 100.0);
        assert_eq!(clamp(-5.0, 0.0, 100.0), 0.0);
        assert_eq!(clamp(50.0, 0.0, 100.0), 50.0);
    }
}
