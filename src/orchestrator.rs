//! Recommendation Orchestrator (C7)
//!
//! Composes the Minimum-Power Calculator (C3), the Terrain Analyzer (C4),
//! the Candidate Filter (C5) and the Scoring Engine (C6) into the single
//! ranked result the `/recommendations/generate` handler returns. Pure
//! computation — no database access; the handler hands the top three
//! entries of the result to the Persistence Gateway (C8).

use crate::domain::{FitClassification, Implement, Tractor};
use crate::error::AppError;
use crate::minimum_power::calculate_minimum_power;
use crate::scoring::{score_candidate, ScoreBreakdown};
use crate::terrain::{analyze_terrain, TerrainAnalysis};
use crate::units::round2;

/// How many candidates are scored and returned, ranked.
const MAX_RECOMMENDATIONS: usize = 5;

/// How many of those are handed to the Persistence Gateway (C8).
pub const PERSISTED_RECOMMENDATIONS: usize = 3;

#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct RankedRecommendation<'a> {
    pub rank: usize,
    #[serde(skip)]
    pub tractor: &'a Tractor,
    pub tractor_id: i64,
    pub score: ScoreBreakdown,
    pub classification: FitClassification,
    pub utilization_pct: f64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RecommendationOutcome<'a> {
    pub required_hp: f64,
    pub terrain_analysis: TerrainAnalysis,
    pub recommendations: Vec<RankedRecommendation<'a>>,
    /// Set only when `recommendations` is empty: which of the Candidate
    /// Filter's three predicates eliminated every tractor in the catalog.
    pub elimination_reason: Option<String>,
}

impl<'a> RecommendationOutcome<'a> {
    /// The slice the handler forwards to the Persistence Gateway.
    pub fn persisted(&self) -> &[RankedRecommendation<'a>] {
        let n = self.recommendations.len().min(PERSISTED_RECOMMENDATIONS);
        &self.recommendations[..n]
    }
}

/// Produces the ranked recommendation list for a (terrain, implement,
/// catalog) tuple. Returns `Ok` with an empty `recommendations` vector
/// (never an error) when nothing in the catalog clears the power
/// threshold or the Golden Rule — an empty result is a valid business
/// outcome, not a failure.
pub fn generate_recommendations<'a>(
    raw_soil_type: &str,
    slope_pct: f64,
    implement: &Implement,
    working_depth_m: f64,
    catalog: &'a [Tractor],
) -> Result<RecommendationOutcome<'a>, AppError> {
    let terrain_analysis = analyze_terrain(raw_soil_type, slope_pct);

    let minimum_power = calculate_minimum_power(
        implement.power_requirement_hp,
        terrain_analysis.soil,
        slope_pct,
        working_depth_m,
    )?;
    let required_hp = minimum_power.minimum_hp;

    let candidates = crate::filter::filter_candidates(
        catalog,
        required_hp,
        &terrain_analysis,
        crate::filter::FilterOptions::default(),
    );

    let mut scored: Vec<_> = candidates
        .into_iter()
        .map(|t| score_candidate(t, required_hp).with_terrain(&terrain_analysis))
        .collect();

    // Rank: higher total score first; ties broken by higher efficiency
    // component, then higher availability, then lower tractor_id so the
    // ordering is fully deterministic regardless of catalog iteration order.
    scored.sort_by(|a, b| {
        b.breakdown
            .total
            .partial_cmp(&a.breakdown.total)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                b.breakdown
                    .efficiency
                    .partial_cmp(&a.breakdown.efficiency)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| {
                b.breakdown
                    .availability
                    .partial_cmp(&a.breakdown.availability)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.tractor.tractor_id.cmp(&b.tractor.tractor_id))
    });

    let recommendations = scored
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .enumerate()
        .map(|(i, scored)| RankedRecommendation {
            rank: i + 1,
            tractor: scored.tractor,
            tractor_id: scored.tractor.tractor_id,
            score: scored.breakdown,
            classification: scored.classification,
            utilization_pct: scored.utilization_pct,
        })
        .collect();

    let elimination_reason = if recommendations.is_empty() {
        crate::filter::elimination_reason(
            catalog,
            required_hp,
            &terrain_analysis,
            crate::filter::FilterOptions::default(),
        )
    } else {
        None
    };

    Ok(RecommendationOutcome {
        required_hp: round2(required_hp),
        terrain_analysis,
        recommendations,
        elimination_reason,
    })
}

/// Builds the Spanish-language explanation attached to each ranked entry
/// in the HTTP response (spec.md §6). Kept separate from scoring so the
/// scoring math stays free of presentation concerns.
pub fn explain(entry: &RankedRecommendation<'_>, terrain_analysis: &TerrainAnalysis) -> String {
    let fit = match entry.classification {
        FitClassification::Optimal => "un ajuste óptimo de potencia",
        FitClassification::Good => "un buen ajuste de potencia",
        FitClassification::Overpowered => "más potencia de la necesaria",
        FitClassification::Excessive => "potencia muy superior a la requerida",
    };
    format!(
        "{} ({}) ofrece {} para terreno {} con pendiente {}; utilización estimada {:.1}%.",
        entry.tractor.name,
        entry.tractor.traction_type,
        fit,
        terrain_analysis.soil,
        slope_class_label(terrain_analysis),
        entry.utilization_pct,
    )
}

fn slope_class_label(terrain_analysis: &TerrainAnalysis) -> &'static str {
    match terrain_analysis.slope_class {
        crate::domain::SlopeClass::Flat => "plano",
        crate::domain::SlopeClass::Rolling => "ondulado",
        crate::domain::SlopeClass::Steep => "pronunciado",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ImplementType, TractionType, TractorStatus};

    fn implement() -> Implement {
        Implement {
            implement_id: 1,
            implement_name: "Arado".to_string(),
            implement_type: ImplementType::Plow,
            power_requirement_hp: 80.0,
            working_width_m: 2.0,
            working_depth_cm: Some(30.0),
            status: "active".to_string(),
        }
    }

    fn tractor(id: i64, hp: f64, traction: TractionType) -> Tractor {
        Tractor {
            tractor_id: id,
            name: format!("Tractor {id}"),
            brand: "Brand".to_string(),
            model: "Model".to_string(),
            engine_power_hp: hp,
            weight_kg: 5000.0,
            traction_force_kn: 30.0,
            traction_type: traction,
            tire_type: "standard".to_string(),
            status: TractorStatus::Available,
            fuel_consumption_lph: None,
        }
    }

    #[test]
    fn empty_catalog_yields_empty_recommendations_not_error() {
        let outcome =
            generate_recommendations("clay", 10.0, &implement(), 0.30, &[]).unwrap();
        assert!(outcome.recommendations.is_empty());
        assert!(outcome.elimination_reason.is_some());
    }

    #[test]
    fn elimination_reason_absent_when_recommendations_exist() {
        let catalog = vec![tractor(1, 150.0, TractionType::FourByFour)];
        let outcome =
            generate_recommendations("loam", 0.0, &implement(), 0.30, &catalog).unwrap();
        assert!(!outcome.recommendations.is_empty());
        assert!(outcome.elimination_reason.is_none());
    }

    /// Seed scenario 2 (spec.md §8): the 2WD candidate never ranks.
    #[test]
    fn steep_terrain_excludes_two_wheel_drive_from_ranking() {
        let catalog = vec![
            tractor(1, 160.0, TractionType::FourByFour),
            tractor(2, 160.0, TractionType::FourByTwo),
            tractor(3, 160.0, TractionType::Track),
        ];
        let outcome =
            generate_recommendations("clay", 20.0, &implement(), 0.30, &catalog).unwrap();
        assert!(outcome.recommendations.iter().all(|r| r.tractor_id != 2));
    }

    #[test]
    fn ranking_is_deterministic_by_total_then_tiebreaks() {
        let catalog = vec![
            tractor(5, 150.0, TractionType::FourByFour),
            tractor(1, 150.0, TractionType::FourByFour),
        ];
        let outcome =
            generate_recommendations("loam", 0.0, &implement(), 0.30, &catalog).unwrap();
        // Equal scores: lower tractor_id wins the tie.
        assert_eq!(outcome.recommendations[0].tractor_id, 1);
    }

    #[test]
    fn persisted_slice_never_exceeds_three() {
        let catalog: Vec<Tractor> = (1..=5)
            .map(|id| tractor(id, 150.0 + id as f64, TractionType::FourByFour))
            .collect();
        let outcome =
            generate_recommendations("loam", 0.0, &implement(), 0.30, &catalog).unwrap();
        assert_eq!(outcome.recommendations.len(), 5);
        assert_eq!(outcome.persisted().len(), 3);
    }

    #[test]
    fn ranks_start_at_one_and_are_sequential() {
        let catalog: Vec<Tractor> = (1..=3)
            .map(|id| tractor(id, 150.0, TractionType::FourByFour))
            .collect();
        let outcome =
            generate_recommendations("loam", 0.0, &implement(), 0.30, &catalog).unwrap();
        let ranks: Vec<usize> = outcome.recommendations.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }
}
