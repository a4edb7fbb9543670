use crate::engine::types::SelectionChoice;

/// Aggregate confidence of a combination: arithmetic mean of member
/// confidences, 0 for an empty set.
pub fn aggregate_confidence(selections: &[SelectionChoice]) -> f64 {
    if selections.is_empty() {
        return 0.0;
    }
    let sum: f64 = selections.iter().map(|s| s.confidence).sum();
    sum / selections.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{CandidateSelection, MarketType};

    fn choice(confidence: f64) -> SelectionChoice {
        SelectionChoice::new(
            "f1",
            "A vs B",
            &CandidateSelection {
                market_type: MarketType::TotalGoals,
                value: "Over 2.5".to_string(),
                odds: 1.8,
                confidence,
            },
        )
    }

    #[test]
    fn test_empty_scores_zero() {
        assert_eq!(aggregate_confidence(&[]), 0.0);
    }

    #[test]
    fn test_single_member_is_its_own_mean() {
        assert!((aggregate_confidence(&[choice(82.0)]) - 82.0).abs() < 1e-9);
    }

    #[test]
    fn test_mean_of_members() {
        let selections = vec![choice(70.0), choice(80.0), choice(90.0)];
        assert!((aggregate_confidence(&selections) - 80.0).abs() < 1e-9);
    }
}
