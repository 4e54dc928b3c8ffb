//! Scoring Engine (C6)
//!
//! Computes the five-component weighted score (100 points total) for a
//! single candidate tractor and classifies its fit by utilization.

use crate::domain::{FitClassification, SlopeClass, TractionType, Tractor};
use crate::terrain::TerrainAnalysis;
use crate::units::{clamp, round2};

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ScoreBreakdown {
    pub efficiency: f64,
    pub traction: f64,
    pub soil: f64,
    pub economic: f64,
    pub availability: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ScoredCandidate<'a> {
    #[serde(skip)]
    pub tractor: &'a Tractor,
    pub breakdown: ScoreBreakdown,
    pub classification: FitClassification,
    pub utilization_pct: f64,
}

/// What the terrain "prefers" in a running gear, used by the soil
/// component. Derived from the terrain analysis rather than read from the
/// catalog, since no entity in the data model names a preference
/// directly — see DESIGN.md for the resolution of this open question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PreferredTire {
    Track,
    Reinforced,
    Standard,
}

fn preferred_tire(terrain: &TerrainAnalysis) -> PreferredTire {
    if terrain.requires_track {
        PreferredTire::Track
    } else if terrain.soil_difficulty >= 70.0 || terrain.slope_class == SlopeClass::Steep {
        PreferredTire::Reinforced
    } else {
        PreferredTire::Standard
    }
}

/// Efficiency component (0..30). `r = tractor_hp / required_hp`.
fn efficiency_score(tractor_hp: f64, required_hp: f64) -> f64 {
    if required_hp <= 0.0 {
        return 30.0;
    }
    let r = tractor_hp / required_hp;
    if r <= 1.0 {
        30.0
    } else if r <= 1.3 {
        30.0 - (r - 1.0) * 50.0
    } else {
        (15.0 - 30.0 * (r - 1.3)).max(0.0)
    }
}

fn traction_bonus(traction: TractionType, slope_class: SlopeClass) -> f64 {
    match (traction, slope_class) {
        (TractionType::FourByFour, SlopeClass::Flat) => 5.0,
        (TractionType::FourByFour, SlopeClass::Rolling) => 15.0,
        (TractionType::FourByFour, SlopeClass::Steep) => 25.0,
        (TractionType::Track, SlopeClass::Flat) => 0.0,
        (TractionType::Track, SlopeClass::Rolling) => 20.0,
        (TractionType::Track, SlopeClass::Steep) => 30.0,
        (TractionType::FourByTwo, SlopeClass::Flat) => 10.0,
        (TractionType::FourByTwo, SlopeClass::Rolling) => 0.0,
        (TractionType::FourByTwo, SlopeClass::Steep) => -50.0,
    }
}

/// Traction component (0..25), normalized from the [-50, 30] bonus range.
fn traction_score(traction: TractionType, slope_class: SlopeClass) -> f64 {
    let bonus = traction_bonus(traction, slope_class);
    clamp(((bonus + 50.0) / 80.0) * 25.0, 0.0, 25.0)
}

/// Soil component (0..20).
fn soil_score(tractor: &Tractor, terrain: &TerrainAnalysis) -> f64 {
    let preferred = preferred_tire(terrain);
    let tire_lower = tractor.tire_type.to_ascii_lowercase();

    let mut score = if preferred == PreferredTire::Track && tractor.traction_type == TractionType::Track {
        20.0
    } else if preferred == PreferredTire::Reinforced
        && (tire_lower.contains("reinforced") || tire_lower.contains("reforzad"))
    {
        18.0
    } else if preferred == PreferredTire::Standard && tractor.traction_type != TractionType::Track {
        16.0
    } else {
        10.0
    };

    if terrain.combined_difficulty > 70.0 && tractor.traction_type != TractionType::Track {
        score *= 0.7;
    }

    round2(score)
}

/// Economic component (0..15). Prefers real fuel consumption data; falls
/// back to horsepower ratio as a proxy when the catalog doesn't record it.
fn economic_score(tractor: &Tractor, required_hp: f64) -> f64 {
    match tractor.fuel_consumption_lph {
        Some(lph) => clamp((1.0 - (lph - 5.0) / 20.0) * 15.0, 0.0, 15.0),
        None => {
            if tractor.engine_power_hp <= 0.0 {
                0.0
            } else {
                clamp((required_hp / tractor.engine_power_hp) * 15.0, 0.0, 15.0)
            }
        }
    }
}

fn classify_fit(utilization_pct: f64) -> FitClassification {
    if utilization_pct >= 85.0 {
        FitClassification::Optimal
    } else if utilization_pct >= 70.0 {
        FitClassification::Good
    } else if utilization_pct >= 50.0 {
        FitClassification::Overpowered
    } else {
        FitClassification::Excessive
    }
}

/// Scores a single candidate against the required power and terrain.
pub fn score_candidate<'a>(
    tractor: &'a Tractor,
    required_hp: f64,
) -> ScoredCandidateBuilder<'a> {
    ScoredCandidateBuilder { tractor, required_hp }
}

/// Deferred scoring call so the terrain reference doesn't need to outlive
/// the tractor slice the caller iterates.
pub struct ScoredCandidateBuilder<'a> {
    tractor: &'a Tractor,
    required_hp: f64,
}

impl<'a> ScoredCandidateBuilder<'a> {
    pub fn with_terrain(self, terrain: &TerrainAnalysis) -> ScoredCandidate<'a> {
        let efficiency = round2(efficiency_score(self.tractor.engine_power_hp, self.required_hp));
        let traction = round2(traction_score(self.tractor.traction_type, terrain.slope_class));
        let soil = soil_score(self.tractor, terrain);
        let economic = round2(economic_score(self.tractor, self.required_hp));
        let availability = round2(self.tractor.status.availability_score());

        let total = round2(efficiency + traction + soil + economic + availability);

        let utilization_pct = if self.tractor.engine_power_hp > 0.0 {
            100.0 * self.required_hp / self.tractor.engine_power_hp
        } else {
            0.0
        };

        ScoredCandidate {
            tractor: self.tractor,
            breakdown: ScoreBreakdown {
                efficiency,
                traction,
                soil,
                economic,
                availability,
                total,
            },
            classification: classify_fit(utilization_pct),
            utilization_pct: round2(utilization_pct),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TractorStatus;
    use crate::terrain::analyze_terrain;

    fn tractor(hp: f64, traction: TractionType) -> Tractor {
        Tractor {
            tractor_id: 1,
            name: "T".to_string(),
            brand: "B".to_string(),
            model: "M".to_string(),
            engine_power_hp: hp,
            weight_kg: 4000.0,
            traction_force_kn: 30.0,
            traction_type: traction,
            tire_type: "standard".to_string(),
            status: TractorStatus::Available,
            fuel_consumption_lph: None,
        }
    }

    #[test]
    fn components_stay_within_declared_ranges() {
        let terrain = analyze_terrain("clay", 20.0);
        let t = tractor(100.0, TractionType::FourByFour);
        let scored = score_candidate(&t, 85.0).with_terrain(&terrain);

        assert!((0.0..=30.0).contains(&scored.breakdown.efficiency));
        assert!((0.0..=25.0).contains(&scored.breakdown.traction));
        assert!((0.0..=20.0).contains(&scored.breakdown.soil));
        assert!((0.0..=15.0).contains(&scored.breakdown.economic));
        assert!((0.0..=10.0).contains(&scored.breakdown.availability));
    }

    #[test]
    fn total_equals_sum_of_components() {
        let terrain = analyze_terrain("loam", 0.0);
        let t = tractor(100.0, TractionType::FourByFour);
        let scored = score_candidate(&t, 85.0).with_terrain(&terrain);
        let sum = scored.breakdown.efficiency
            + scored.breakdown.traction
            + scored.breakdown.soil
            + scored.breakdown.economic
            + scored.breakdown.availability;
        assert!((scored.breakdown.total - sum).abs() < 1e-9);
    }

    /// Seed scenario 3 (spec.md §8): over-powered is penalized on flat loam.
    #[test]
    fn overpowered_tractor_scores_lower_efficiency() {
        let terrain = analyze_terrain("loam", 0.0);
        let a = score_candidate(&tractor(100.0, TractionType::FourByFour), 85.0).with_terrain(&terrain);
        let d = score_candidate(&tractor(200.0, TractionType::FourByFour), 85.0).with_terrain(&terrain);
        assert!(a.breakdown.efficiency > d.breakdown.efficiency);
    }

    #[test]
    fn efficiency_saturates_at_thirty_for_underpowered_ratio() {
        assert_eq!(efficiency_score(80.0, 100.0), 30.0);
    }

    #[test]
    fn efficiency_hits_fifteen_at_ratio_1_3() {
        assert!((efficiency_score(130.0, 100.0) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn fit_classification_boundaries() {
        assert_eq!(classify_fit(90.0), FitClassification::Optimal);
        assert_eq!(classify_fit(85.0), FitClassification::Optimal);
        assert_eq!(classify_fit(80.0), FitClassification::Good);
        assert_eq!(classify_fit(60.0), FitClassification::Overpowered);
        assert_eq!(classify_fit(30.0), FitClassification::Excessive);
    }
}
