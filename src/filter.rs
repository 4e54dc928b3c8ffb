//! Candidate Filter (C5)
//!
//! Cascades three predicates over the tractor catalog: power threshold,
//! the Golden Rule (4WD/track mandatory on steep slopes), and
//! availability. Order matters only for readability here — all three are
//! applied to every candidate, and the result preserves input order so
//! ranking is entirely the Scoring Engine's (C6) responsibility.

use crate::domain::{TractionType, Tractor};
use crate::terrain::TerrainAnalysis;

/// Options that relax the default filter cascade.
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterOptions {
    /// Skip the availability predicate — used by read-only "what would
    /// match" previews that intentionally include offline equipment.
    pub include_unavailable: bool,
}

fn meets_power_threshold(tractor: &Tractor, required_hp: f64) -> bool {
    tractor.engine_power_hp >= required_hp
}

/// The "Golden Rule": two-wheel-drive tractors are forbidden on slopes
/// that require 4WD.
fn satisfies_golden_rule(tractor: &Tractor, terrain: &TerrainAnalysis) -> bool {
    if !terrain.requires_4wd {
        return true;
    }
    matches!(tractor.traction_type, TractionType::FourByFour | TractionType::Track)
}

fn is_available(tractor: &Tractor) -> bool {
    tractor.status.is_available()
}

/// Filters the tractor catalog down to candidates compatible with the
/// required power and the terrain's hard requirements. Returns an empty
/// vector (not an error) when nothing qualifies — the orchestrator (C7)
/// turns that into a structured "no compatible" result.
pub fn filter_candidates<'a>(
    catalog: &'a [Tractor],
    required_hp: f64,
    terrain: &TerrainAnalysis,
    options: FilterOptions,
) -> Vec<&'a Tractor> {
    catalog
        .iter()
        .filter(|t| meets_power_threshold(t, required_hp))
        .filter(|t| satisfies_golden_rule(t, terrain))
        .filter(|t| options.include_unavailable || is_available(t))
        .collect()
}

/// Re-derives which of the cascade's three predicates is responsible for an
/// empty `filter_candidates` result, for surfacing in
/// `summary.reason` when no candidate survives. Walks the same three stages
/// in the same order and reports the first one that empties the remaining
/// set, so the explanation matches the order candidates are actually
/// eliminated in.
pub fn elimination_reason(
    catalog: &[Tractor],
    required_hp: f64,
    terrain: &TerrainAnalysis,
    options: FilterOptions,
) -> Option<String> {
    if catalog.is_empty() {
        return Some("No hay tractores en el catálogo".to_string());
    }

    let after_power: Vec<&Tractor> = catalog
        .iter()
        .filter(|t| meets_power_threshold(t, required_hp))
        .collect();
    if after_power.is_empty() {
        return Some(format!(
            "Ningún tractor alcanza la potencia mínima requerida de {required_hp:.2} HP"
        ));
    }

    let after_golden_rule: Vec<&Tractor> = after_power
        .iter()
        .copied()
        .filter(|t| satisfies_golden_rule(t, terrain))
        .collect();
    if after_golden_rule.is_empty() {
        return Some(
            "Ningún tractor con potencia suficiente cumple la regla de oro de tracción \
             para esta pendiente (se requiere 4x4 u oruga)"
                .to_string(),
        );
    }

    let any_available = after_golden_rule
        .iter()
        .copied()
        .any(|t| options.include_unavailable || is_available(t));
    if !any_available {
        return Some(
            "Ningún tractor que cumple los requisitos de potencia y tracción está disponible"
                .to_string(),
        );
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TractorStatus;

    fn tractor(id: i64, hp: f64, traction: TractionType, status: TractorStatus) -> Tractor {
        Tractor {
            tractor_id: id,
            name: format!("T{id}"),
            brand: "Brand".to_string(),
            model: "Model".to_string(),
            engine_power_hp: hp,
            weight_kg: 5000.0,
            traction_force_kn: 30.0,
            traction_type: traction,
            tire_type: "standard".to_string(),
            status,
            fuel_consumption_lph: None,
        }
    }

    /// Seed scenario 2 (spec.md §8): steep clay excludes the 2WD tractor.
    #[test]
    fn steep_slope_excludes_two_wheel_drive() {
        let terrain = crate::terrain::analyze_terrain("clay", 20.0);
        let catalog = vec![
            tractor(1, 100.0, TractionType::FourByFour, TractorStatus::Available),
            tractor(2, 90.0, TractionType::FourByTwo, TractorStatus::Available),
            tractor(3, 150.0, TractionType::Track, TractorStatus::Available),
        ];

        let result = filter_candidates(&catalog, 85.0, &terrain, FilterOptions::default());
        let ids: Vec<i64> = result.iter().map(|t| t.tractor_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn underpowered_tractor_is_excluded() {
        let terrain = crate::terrain::analyze_terrain("loam", 0.0);
        let catalog = vec![tractor(1, 50.0, TractionType::FourByFour, TractorStatus::Available)];
        let result = filter_candidates(&catalog, 85.0, &terrain, FilterOptions::default());
        assert!(result.is_empty());
    }

    #[test]
    fn maintenance_tractor_excluded_unless_opted_in() {
        let terrain = crate::terrain::analyze_terrain("loam", 0.0);
        let catalog = vec![tractor(1, 100.0, TractionType::FourByFour, TractorStatus::Maintenance)];

        assert!(filter_candidates(&catalog, 85.0, &terrain, FilterOptions::default()).is_empty());
        assert_eq!(
            filter_candidates(
                &catalog,
                85.0,
                &terrain,
                FilterOptions { include_unavailable: true }
            )
            .len(),
            1
        );
    }

    #[test]
    fn active_status_counts_as_available() {
        let terrain = crate::terrain::analyze_terrain("loam", 0.0);
        let catalog = vec![tractor(1, 100.0, TractionType::FourByFour, TractorStatus::Active)];
        assert_eq!(filter_candidates(&catalog, 85.0, &terrain, FilterOptions::default()).len(), 1);
    }

    #[test]
    fn elimination_reason_is_none_when_candidates_survive() {
        let terrain = crate::terrain::analyze_terrain("loam", 0.0);
        let catalog = vec![tractor(1, 100.0, TractionType::FourByFour, TractorStatus::Available)];
        assert!(elimination_reason(&catalog, 85.0, &terrain, FilterOptions::default()).is_none());
    }

    #[test]
    fn elimination_reason_names_power_threshold() {
        let terrain = crate::terrain::analyze_terrain("loam", 0.0);
        let catalog = vec![tractor(1, 50.0, TractionType::FourByFour, TractorStatus::Available)];
        let reason = elimination_reason(&catalog, 85.0, &terrain, FilterOptions::default()).unwrap();
        assert!(reason.contains("potencia"));
    }

    #[test]
    fn elimination_reason_names_golden_rule() {
        let terrain = crate::terrain::analyze_terrain("clay", 20.0);
        let catalog = vec![tractor(1, 150.0, TractionType::FourByTwo, TractorStatus::Available)];
        let reason = elimination_reason(&catalog, 85.0, &terrain, FilterOptions::default()).unwrap();
        assert!(reason.contains("regla de oro"));
    }

    #[test]
    fn elimination_reason_names_availability() {
        let terrain = crate::terrain::analyze_terrain("loam", 0.0);
        let catalog = vec![tractor(1, 100.0, TractionType::FourByFour, TractorStatus::Maintenance)];
        let reason = elimination_reason(&catalog, 85.0, &terrain, FilterOptions::default()).unwrap();
        assert!(reason.contains("disponible"));
    }
}
