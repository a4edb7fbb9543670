use std::collections::HashSet;

use crate::engine::types::{CandidateSelection, MarketType, SearchConfig, SelectionChoice};

/// Pure predicate deciding whether a candidate may legally extend a
/// partial combination. The generator consults it at every branch.
pub struct ConstraintValidator<'a> {
    config: &'a SearchConfig,
}

impl<'a> ConstraintValidator<'a> {
    pub fn new(config: &'a SearchConfig) -> Self {
        Self { config }
    }

    /// Checks, in order: fixture uniqueness, forbidden same-fixture
    /// market pairs, capacity, market diversification. Any failure
    /// rejects the extension.
    pub fn is_extensible(
        &self,
        partial: &[SelectionChoice],
        fixture_id: &str,
        candidate: &CandidateSelection,
        used_market_types: &[MarketType],
    ) -> bool {
        // 1. A fixture contributes at most one selection.
        if partial.iter().any(|s| s.fixture_id == fixture_id) {
            return false;
        }

        // 2. Correlated markets may not co-occur on the same fixture.
        for &(a, b) in &self.config.forbidden_market_pairs {
            let other = if candidate.market_type == a {
                b
            } else if candidate.market_type == b {
                a
            } else {
                continue;
            };
            if partial
                .iter()
                .any(|s| s.fixture_id == fixture_id && s.market_type == other)
            {
                return false;
            }
        }

        // 3. Capacity.
        if partial.len() >= self.config.max_matches {
            return false;
        }

        // 4. No single-market combinations.
        if !partial.is_empty() {
            let mut distinct: HashSet<MarketType> = used_market_types.iter().copied().collect();
            distinct.insert(candidate.market_type);
            if distinct.len() < 2 {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SearchConfig {
        SearchConfig {
            target_odds: 4.0,
            max_matches: 3,
            min_odds_ratio: 0.4,
            max_odds_ratio: 2.5,
            forbidden_market_pairs: vec![(MarketType::Victory, MarketType::ShotsOnTarget)],
            alternatives_count: 4,
            exactness_tolerance: 0.10,
        }
    }

    fn candidate(market_type: MarketType, odds: f64) -> CandidateSelection {
        CandidateSelection {
            market_type,
            value: "pick".to_string(),
            odds,
            confidence: 75.0,
        }
    }

    fn choice(fixture_id: &str, market_type: MarketType) -> SelectionChoice {
        SelectionChoice::new(fixture_id, "A vs B", &candidate(market_type, 1.8))
    }

    #[test]
    fn test_empty_partial_accepts_any_candidate() {
        let config = config();
        let validator = ConstraintValidator::new(&config);

        assert!(validator.is_extensible(&[], "f1", &candidate(MarketType::Victory, 1.8), &[]));
    }

    #[test]
    fn test_rejects_fixture_already_used() {
        let config = config();
        let validator = ConstraintValidator::new(&config);
        let partial = vec![choice("f1", MarketType::Victory)];
        let used = vec![MarketType::Victory];

        assert!(!validator.is_extensible(
            &partial,
            "f1",
            &candidate(MarketType::TotalGoals, 1.8),
            &used
        ));
    }

    #[test]
    fn test_rejects_forbidden_pair_on_same_fixture() {
        let config = config();
        let validator = ConstraintValidator::new(&config);
        // Fixture uniqueness already rejects same-fixture reuse; the
        // pair rule is a second layer behind it.
        let partial = vec![choice("f2", MarketType::Victory)];
        let used = vec![MarketType::Victory];

        assert!(!validator.is_extensible(
            &partial,
            "f2",
            &candidate(MarketType::ShotsOnTarget, 1.9),
            &used
        ));
    }

    #[test]
    fn test_allows_forbidden_pair_markets_on_distinct_fixtures() {
        let config = config();
        let validator = ConstraintValidator::new(&config);
        let partial = vec![choice("f1", MarketType::Victory)];
        let used = vec![MarketType::Victory];

        assert!(validator.is_extensible(
            &partial,
            "f2",
            &candidate(MarketType::ShotsOnTarget, 1.9),
            &used
        ));
    }

    #[test]
    fn test_rejects_at_capacity() {
        let config = config();
        let validator = ConstraintValidator::new(&config);
        let partial = vec![
            choice("f1", MarketType::Victory),
            choice("f2", MarketType::TotalGoals),
            choice("f3", MarketType::Corners),
        ];
        let used = vec![
            MarketType::Victory,
            MarketType::TotalGoals,
            MarketType::Corners,
        ];

        assert!(!validator.is_extensible(
            &partial,
            "f4",
            &candidate(MarketType::Handicap, 1.7),
            &used
        ));
    }

    #[test]
    fn test_rejects_single_market_combination() {
        let config = config();
        let validator = ConstraintValidator::new(&config);
        let partial = vec![choice("f1", MarketType::TotalGoals)];
        let used = vec![MarketType::TotalGoals];

        assert!(!validator.is_extensible(
            &partial,
            "f2",
            &candidate(MarketType::TotalGoals, 1.8),
            &used
        ));
        // A second distinct market is fine.
        assert!(validator.is_extensible(
            &partial,
            "f2",
            &candidate(MarketType::BothTeamsScore, 1.7),
            &used
        ));
    }

    #[test]
    fn test_repeated_market_allowed_once_diversified() {
        let config = config();
        let validator = ConstraintValidator::new(&config);
        let partial = vec![
            choice("f1", MarketType::TotalGoals),
            choice("f2", MarketType::BothTeamsScore),
        ];
        let used = vec![MarketType::TotalGoals, MarketType::BothTeamsScore];

        assert!(validator.is_extensible(
            &partial,
            "f3",
            &candidate(MarketType::TotalGoals, 1.8),
            &used
        ));
    }
}
