pub mod generator;
pub mod scorer;
pub mod selector;
pub mod types;
pub mod validator;

use std::time::Instant;

use tracing::warn;

use crate::engine::generator::CombinationGenerator;
use crate::engine::selector::BestCombinationSelector;
use crate::engine::types::{
    CandidateSelection, CatalogEntry, DroppedFixture, GenerateRequest, GenerateResult, MarketType,
    RequestCandidate, RequestFixture, SearchConfig,
};

/// At most this many candidates are ever taken per fixture; any
/// surplus offered by the catalog is ignored.
const MAX_CANDIDATES_PER_FIXTURE: usize = 2;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid config: {}", violations.join("; "))]
    InvalidConfig { violations: Vec<String> },
}

/// Observer for coarse pipeline progress. The search itself stays
/// callback-free; only the stage boundaries report.
pub trait Progress {
    fn on_progress(&self, percent: u8, stage: &str);
}

/// Discards all progress reports.
pub struct NoProgress;

impl Progress for NoProgress {
    fn on_progress(&self, _percent: u8, _stage: &str) {}
}

/// Engine-level knobs that are not part of the request shape.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Relative tolerance under which a result counts as an exact
    /// match of the target odds.
    pub exactness_tolerance: f64,
    /// Optional search deadline; the generator stops cooperatively
    /// once it has passed and keeps what it found.
    pub deadline: Option<Instant>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            exactness_tolerance: 0.10,
            deadline: None,
        }
    }
}

/// Run one full generation + selection pass over the request.
///
/// An empty search space is a normal outcome (`found: false`), never
/// an error. Only an out-of-domain configuration is.
pub fn run_generation(
    request: &GenerateRequest,
    options: &EngineOptions,
    progress: &dyn Progress,
) -> Result<GenerateResult, EngineError> {
    let config = build_search_config(request, options)?;
    progress.on_progress(10, "configuration validated");

    let (catalog, dropped_fixtures) = ingest_fixtures(&request.fixtures);
    progress.on_progress(30, "catalog ingested");

    let mut generator = CombinationGenerator::new(&config);
    if let Some(deadline) = options.deadline {
        generator = generator.with_deadline(deadline);
    }
    let combinations = generator.generate(&catalog);
    let combinations_evaluated = combinations.len();
    progress.on_progress(70, "combinations generated");

    let selector = BestCombinationSelector::new(
        config.target_odds,
        config.alternatives_count,
        config.exactness_tolerance,
    );
    let result = match selector.select(combinations) {
        Some(selection) => GenerateResult {
            found: true,
            best: Some(selection.best),
            alternatives: selection.alternatives,
            combinations_evaluated,
            dropped_fixtures,
        },
        None => GenerateResult {
            found: false,
            best: None,
            alternatives: Vec::new(),
            combinations_evaluated,
            dropped_fixtures,
        },
    };
    progress.on_progress(100, "selection complete");

    Ok(result)
}

/// Validate request-level settings without running a search, so
/// callers can fail fast before spending provider calls.
pub fn validate_settings(
    request: &GenerateRequest,
    options: &EngineOptions,
) -> Result<(), EngineError> {
    build_search_config(request, options).map(|_| ())
}

fn build_search_config(
    request: &GenerateRequest,
    options: &EngineOptions,
) -> Result<SearchConfig, EngineError> {
    let mut violations = Vec::new();

    let mut forbidden_market_pairs = Vec::new();
    for pair in &request.forbidden_market_pairs {
        match (pair[0].parse::<MarketType>(), pair[1].parse::<MarketType>()) {
            (Ok(a), Ok(b)) => forbidden_market_pairs.push((a, b)),
            (Err(e), _) | (_, Err(e)) => {
                violations.push(format!("forbiddenMarketPairs: {}", e));
            }
        }
    }

    let config = SearchConfig {
        target_odds: request.target_odds,
        max_matches: request.max_matches,
        min_odds_ratio: request.min_odds_ratio,
        max_odds_ratio: request.max_odds_ratio,
        forbidden_market_pairs,
        alternatives_count: request.alternatives_count,
        exactness_tolerance: options.exactness_tolerance,
    };
    violations.extend(config.violations());

    if violations.is_empty() {
        Ok(config)
    } else {
        Err(EngineError::InvalidConfig { violations })
    }
}

/// Build the engine's working set. Malformed candidates are rejected
/// here, before any search work; fixtures left without a usable
/// candidate are dropped and reported rather than failing the request.
fn ingest_fixtures(fixtures: &[RequestFixture]) -> (Vec<CatalogEntry>, Vec<DroppedFixture>) {
    let mut catalog = Vec::new();
    let mut dropped = Vec::new();

    for fixture in fixtures {
        if fixture.candidates.len() > MAX_CANDIDATES_PER_FIXTURE {
            warn!(
                fixture_id = %fixture.id,
                offered = fixture.candidates.len(),
                "fixture offered more than {} candidates, keeping the first {}",
                MAX_CANDIDATES_PER_FIXTURE,
                MAX_CANDIDATES_PER_FIXTURE
            );
        }

        let mut candidates = Vec::new();
        let mut rejections = Vec::new();
        for candidate in fixture.candidates.iter().take(MAX_CANDIDATES_PER_FIXTURE) {
            match sanitize_candidate(candidate) {
                Ok(candidate) => candidates.push(candidate),
                Err(reason) => rejections.push(reason),
            }
        }

        if candidates.is_empty() {
            let reason = if rejections.is_empty() {
                "no candidates offered".to_string()
            } else {
                rejections.join("; ")
            };
            warn!(fixture_id = %fixture.id, %reason, "dropping fixture");
            dropped.push(DroppedFixture {
                fixture_id: fixture.id.clone(),
                reason,
            });
            continue;
        }

        catalog.push(CatalogEntry {
            fixture_id: fixture.id.clone(),
            teams: fixture.teams.clone(),
            candidates,
        });
    }

    (catalog, dropped)
}

fn sanitize_candidate(candidate: &RequestCandidate) -> Result<CandidateSelection, String> {
    let market_type: MarketType = candidate
        .market_type
        .parse()
        .map_err(|e: types::UnknownMarketType| e.to_string())?;

    if candidate.odds <= 1.0 {
        return Err(format!(
            "odds must exceed 1.0, got {} for {}",
            candidate.odds, market_type
        ));
    }

    Ok(CandidateSelection {
        market_type,
        value: candidate.value.clone(),
        odds: candidate.odds,
        confidence: candidate.confidence.clamp(0.0, 100.0),
    })
}
