//! Terrain Analyzer (C4)
//!
//! Normalizes the soil label (Spanish or English input) to the canonical
//! enum, classifies slope severity, and derives a combined difficulty
//! score plus the two hard equipment requirements the Candidate Filter
//! (C5) enforces.

use crate::domain::{SlopeClass, SoilType};
use crate::units::clamp;

/// Normalizes a free-text soil label into the canonical [`SoilType`] set.
/// Recognizes both English and Spanish labels; anything unrecognized
/// falls back to [`SoilType::Loam`], the least committal default.
pub fn normalize_soil_type(raw: &str) -> SoilType {
    let normalized = raw.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "clay" | "arcilla" | "arcilloso" | "arcillosa" => SoilType::Clay,
        "loam" | "franco" | "marga" | "suelo franco" => SoilType::Loam,
        "sandy" | "sand" | "arenoso" | "arenosa" | "arena" => SoilType::Sandy,
        "rocky" | "rock" | "rocoso" | "rocosa" | "pedregoso" | "pedregosa" => SoilType::Rocky,
        "wet_clay" | "wet clay" | "arcilla humeda" | "arcilla húmeda" | "arcilla mojada" => {
            SoilType::WetClay
        }
        _ => SoilType::Loam,
    }
}

fn classify_slope(slope_pct: f64) -> SlopeClass {
    let magnitude = slope_pct.abs();
    if magnitude < 5.0 {
        SlopeClass::Flat
    } else if magnitude < 15.0 {
        SlopeClass::Rolling
    } else {
        SlopeClass::Steep
    }
}

fn soil_difficulty(soil: SoilType) -> f64 {
    match soil {
        SoilType::Sandy => 20.0,
        SoilType::Loam => 40.0,
        SoilType::Clay => 70.0,
        SoilType::Rocky => 85.0,
        SoilType::WetClay => 95.0,
    }
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct TerrainAnalysis {
    pub soil: SoilType,
    pub slope_class: SlopeClass,
    pub soil_difficulty: f64,
    pub combined_difficulty: f64,
    pub requires_4wd: bool,
    pub requires_track: bool,
}

/// Analyzes a terrain's raw soil label and slope percentage into the
/// structured classification the rest of the pipeline consumes.
pub fn analyze_terrain(raw_soil_type: &str, slope_pct: f64) -> TerrainAnalysis {
    let soil = normalize_soil_type(raw_soil_type);
    let slope_class = classify_slope(slope_pct);
    let difficulty = soil_difficulty(soil);

    let combined_difficulty = clamp(
        0.6 * difficulty + 0.4 * (2.0 * slope_pct.abs()).min(40.0),
        0.0,
        100.0,
    );

    let requires_4wd = slope_class == SlopeClass::Steep;
    let requires_track =
        soil == SoilType::WetClay || (soil == SoilType::Clay && slope_class == SlopeClass::Steep);

    TerrainAnalysis {
        soil,
        slope_class,
        soil_difficulty: difficulty,
        combined_difficulty,
        requires_4wd,
        requires_track,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bilingual_soil_normalization() {
        assert_eq!(normalize_soil_type("Arcilla"), SoilType::Clay);
        assert_eq!(normalize_soil_type("CLAY"), SoilType::Clay);
        assert_eq!(normalize_soil_type("arenoso"), SoilType::Sandy);
        assert_eq!(normalize_soil_type("rocoso"), SoilType::Rocky);
        assert_eq!(normalize_soil_type("arcilla húmeda"), SoilType::WetClay);
        assert_eq!(normalize_soil_type("unknown-label"), SoilType::Loam);
    }

    #[test]
    fn slope_classification_boundaries() {
        assert_eq!(classify_slope(4.99), SlopeClass::Flat);
        assert_eq!(classify_slope(5.0), SlopeClass::Rolling);
        assert_eq!(classify_slope(14.99), SlopeClass::Rolling);
        assert_eq!(classify_slope(15.0), SlopeClass::Steep);
        assert_eq!(classify_slope(-20.0), SlopeClass::Steep);
    }

    /// Seed scenario 2 (spec.md §8): steep clay requires 4WD and track.
    #[test]
    fn steep_clay_requires_4wd_and_track() {
        let analysis = analyze_terrain("clay", 20.0);
        assert!(analysis.requires_4wd);
        assert!(analysis.requires_track);
    }

    #[test]
    fn wet_clay_always_requires_track() {
        let analysis = analyze_terrain("wet_clay", 2.0);
        assert!(!analysis.requires_4wd);
        assert!(analysis.requires_track);
    }

    #[test]
    fn flat_sandy_has_no_hard_requirements() {
        let analysis = analyze_terrain("sandy", 2.0);
        assert!(!analysis.requires_4wd);
        assert!(!analysis.requires_track);
        assert!(analysis.combined_difficulty < analyze_terrain("rocky", 2.0).combined_difficulty);
    }

    #[test]
    fn combined_difficulty_stays_in_bounds() {
        for soil in ["clay", "loam", "sandy", "rocky", "wet_clay"] {
            for slope in [-80.0, -20.0, 0.0, 20.0, 80.0] {
                let analysis = analyze_terrain(soil, slope);
                assert!(analysis.combined_difficulty >= 0.0);
                assert!(analysis.combined_difficulty <= 100.0);
            }
        }
    }
}
