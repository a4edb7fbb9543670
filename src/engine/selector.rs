use crate::engine::types::{Combination, RankedAlternative};

/// The selector's answer: the closest combination to the target plus
/// a bounded list of runners-up in rank order.
#[derive(Debug, Clone)]
pub struct Selection {
    pub best: Combination,
    pub alternatives: Vec<RankedAlternative>,
}

/// Ranks generated combinations against the target odds. Primary key:
/// distance to target, ascending. Ties go to the higher aggregate
/// confidence; full ties keep generation order.
pub struct BestCombinationSelector {
    target_odds: f64,
    alternatives_count: usize,
    exactness_tolerance: f64,
}

impl BestCombinationSelector {
    pub fn new(target_odds: f64, alternatives_count: usize, exactness_tolerance: f64) -> Self {
        Self {
            target_odds,
            alternatives_count,
            exactness_tolerance,
        }
    }

    /// Returns `None` for an empty candidate list; the orchestration
    /// boundary is expected to have mapped that case to a no-result
    /// outcome already.
    pub fn select(&self, combinations: Vec<Combination>) -> Option<Selection> {
        if combinations.is_empty() {
            return None;
        }

        let mut ranked = combinations;
        let target = self.target_odds;
        ranked.sort_by(|a, b| {
            let diff_a = (a.total_odds - target).abs();
            let diff_b = (b.total_odds - target).abs();
            diff_a
                .total_cmp(&diff_b)
                .then(b.aggregate_confidence.total_cmp(&a.aggregate_confidence))
        });

        let mut iter = ranked.into_iter();
        let mut best = iter.next()?;
        best.is_exact = self.is_exact(&best);

        let alternatives = iter
            .take(self.alternatives_count)
            .map(|mut combination| {
                combination.is_exact = self.is_exact(&combination);
                let difference = (combination.total_odds - target).abs();
                RankedAlternative {
                    combination,
                    difference,
                }
            })
            .collect();

        Some(Selection { best, alternatives })
    }

    /// Informational classification: within the configured tolerance
    /// of the target.
    fn is_exact(&self, combination: &Combination) -> bool {
        (combination.total_odds - self.target_odds).abs()
            < self.target_odds * self.exactness_tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{CandidateSelection, MarketType, SelectionChoice};

    fn combination(total_odds: f64, aggregate_confidence: f64) -> Combination {
        let choice = |fixture_id: &str, market_type, odds| {
            SelectionChoice::new(
                fixture_id,
                "A vs B",
                &CandidateSelection {
                    market_type,
                    value: "pick".to_string(),
                    odds,
                    confidence: aggregate_confidence,
                },
            )
        };
        Combination {
            selections: vec![
                choice("f1", MarketType::Victory, total_odds / 2.0),
                choice("f2", MarketType::TotalGoals, 2.0),
            ],
            total_odds,
            aggregate_confidence,
            is_exact: false,
        }
    }

    fn selector(target: f64) -> BestCombinationSelector {
        BestCombinationSelector::new(target, 4, 0.10)
    }

    #[test]
    fn test_empty_input_yields_none() {
        assert!(selector(4.0).select(Vec::new()).is_none());
    }

    #[test]
    fn test_closest_to_target_wins() {
        let selection = selector(4.0)
            .select(vec![
                combination(6.0, 90.0),
                combination(4.1, 70.0),
                combination(2.0, 95.0),
            ])
            .unwrap();

        assert!((selection.best.total_odds - 4.1).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_breaks_distance_ties() {
        // 3.75 and 4.25 are both exactly 0.25 from target 4.0.
        let selection = selector(4.0)
            .select(vec![combination(3.75, 72.0), combination(4.25, 81.0)])
            .unwrap();

        assert!((selection.best.total_odds - 4.25).abs() < 1e-9);
        assert!((selection.best.aggregate_confidence - 81.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_evaluated_combination_beats_best() {
        let candidates = vec![
            combination(5.2, 60.0),
            combination(3.9, 75.0),
            combination(4.4, 88.0),
            combination(7.0, 92.0),
        ];
        let selection = selector(4.0).select(candidates.clone()).unwrap();

        let best_diff = (selection.best.total_odds - 4.0).abs();
        for candidate in &candidates {
            let diff = (candidate.total_odds - 4.0).abs();
            assert!(
                diff > best_diff
                    || (diff == best_diff
                        && candidate.aggregate_confidence <= selection.best.aggregate_confidence)
            );
        }
    }

    #[test]
    fn test_alternatives_are_ranked_and_bounded() {
        let selection = selector(4.0)
            .select(vec![
                combination(9.0, 70.0),
                combination(4.2, 70.0),
                combination(5.0, 70.0),
                combination(6.0, 70.0),
                combination(7.0, 70.0),
                combination(8.0, 70.0),
                combination(3.8, 70.0),
            ])
            .unwrap();

        // Best is excluded from the alternatives.
        assert_eq!(selection.alternatives.len(), 4);
        assert!(selection
            .alternatives
            .iter()
            .all(|a| a.combination.total_odds != selection.best.total_odds));

        // Ordered by the same ranking key, with per-entry differences.
        let mut previous = (selection.best.total_odds - 4.0).abs();
        for alternative in &selection.alternatives {
            assert!(alternative.difference >= previous);
            assert!(
                (alternative.difference - (alternative.combination.total_odds - 4.0).abs()).abs()
                    < 1e-9
            );
            previous = alternative.difference;
        }
    }

    #[test]
    fn test_exactness_classification() {
        // Tolerance 0.10 around 4.0 -> |diff| < 0.4 counts as exact.
        let selection = selector(4.0)
            .select(vec![combination(4.2, 70.0), combination(4.5, 70.0)])
            .unwrap();

        assert!(selection.best.is_exact);
        assert!(!selection.alternatives[0].combination.is_exact);
    }

    #[test]
    fn test_selection_is_deterministic_across_runs() {
        let candidates = vec![
            combination(4.25, 80.0),
            combination(3.75, 80.0),
            combination(5.0, 60.0),
        ];

        let first = selector(4.0).select(candidates.clone()).unwrap();
        let second = selector(4.0).select(candidates).unwrap();

        assert_eq!(first.best.total_odds, second.best.total_odds);
        let firsts: Vec<_> = first.alternatives.iter().map(|a| a.difference).collect();
        let seconds: Vec<_> = second.alternatives.iter().map(|a| a.difference).collect();
        assert_eq!(firsts, seconds);
    }
}
