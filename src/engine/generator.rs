use std::time::Instant;

use crate::engine::scorer::aggregate_confidence;
use crate::engine::types::{CatalogEntry, Combination, MarketType, SearchConfig, SelectionChoice};
use crate::engine::validator::ConstraintValidator;

/// Feasibility oracle consulted before descending from a node. The
/// default accepts every branch; embedders with large catalogs can
/// plug odds-bound checks here without touching `generate`.
pub trait PruneOracle {
    fn worth_descending(&self, running_odds: f64, depth: usize) -> bool;
}

/// Unrestricted exhaustive traversal.
pub struct NoPruning;

impl PruneOracle for NoPruning {
    fn worth_descending(&self, _running_odds: f64, _depth: usize) -> bool {
        true
    }
}

/// Depth-first backtracking enumeration of every combination that
/// satisfies the cardinality and odds-band constraints.
pub struct CombinationGenerator<'a> {
    config: &'a SearchConfig,
    deadline: Option<Instant>,
    pruner: &'a dyn PruneOracle,
}

impl<'a> CombinationGenerator<'a> {
    pub fn new(config: &'a SearchConfig) -> Self {
        Self {
            config,
            deadline: None,
            pruner: &NoPruning,
        }
    }

    /// Cooperative cancellation: the search gives up between
    /// top-level fixture-index branches once the deadline has passed,
    /// keeping whatever it has emitted so far.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_pruner(mut self, pruner: &'a dyn PruneOracle) -> Self {
        self.pruner = pruner;
        self
    }

    /// Enumerate all valid combinations over the catalog. An empty
    /// result is a normal outcome, not an error.
    pub fn generate(&self, catalog: &[CatalogEntry]) -> Vec<Combination> {
        let validator = ConstraintValidator::new(self.config);
        let mut results = Vec::new();
        let mut partial: Vec<SelectionChoice> = Vec::new();
        let mut used_types: Vec<MarketType> = Vec::new();

        self.search(
            catalog,
            0,
            1.0,
            &mut partial,
            &mut used_types,
            &validator,
            &mut results,
        );

        results
    }

    #[allow(clippy::too_many_arguments)]
    fn search(
        &self,
        catalog: &[CatalogEntry],
        index: usize,
        running_odds: f64,
        partial: &mut Vec<SelectionChoice>,
        used_types: &mut Vec<MarketType>,
        validator: &ConstraintValidator<'_>,
        results: &mut Vec<Combination>,
    ) {
        if partial.is_empty() && self.deadline_passed() {
            return;
        }

        // Emission is non-terminal: an in-band partial is recorded as
        // an independent snapshot and the branch keeps extending.
        if partial.len() >= 2
            && running_odds >= self.config.band_low()
            && running_odds <= self.config.band_high()
        {
            results.push(Combination {
                selections: partial.clone(),
                total_odds: running_odds,
                aggregate_confidence: aggregate_confidence(partial),
                is_exact: false,
            });
        }

        if index >= catalog.len() || partial.len() >= self.config.max_matches {
            return;
        }

        if !self.pruner.worth_descending(running_odds, partial.len()) {
            return;
        }

        let entry = &catalog[index];
        for candidate in &entry.candidates {
            if validator.is_extensible(partial, &entry.fixture_id, candidate, used_types) {
                partial.push(SelectionChoice::new(
                    &entry.fixture_id,
                    &entry.teams,
                    candidate,
                ));
                used_types.push(candidate.market_type);
                self.search(
                    catalog,
                    index + 1,
                    running_odds * candidate.odds,
                    partial,
                    used_types,
                    validator,
                    results,
                );
                used_types.pop();
                partial.pop();
            }
        }

        // Skip this fixture entirely.
        self.search(
            catalog,
            index + 1,
            running_odds,
            partial,
            used_types,
            validator,
            results,
        );
    }

    fn deadline_passed(&self) -> bool {
        self.deadline
            .map(|deadline| Instant::now() >= deadline)
            .unwrap_or(false)
    }
}
