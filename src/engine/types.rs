use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of wager offered on a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketType {
    Victory,
    TotalGoals,
    BothTeamsScore,
    ShotsOnTarget,
    Handicap,
    Corners,
}

impl MarketType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarketType::Victory => "victory",
            MarketType::TotalGoals => "total_goals",
            MarketType::BothTeamsScore => "both_teams_score",
            MarketType::ShotsOnTarget => "shots_on_target",
            MarketType::Handicap => "handicap",
            MarketType::Corners => "corners",
        }
    }
}

impl fmt::Display for MarketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown market type: {0}")]
pub struct UnknownMarketType(pub String);

impl FromStr for MarketType {
    type Err = UnknownMarketType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "victory" => Ok(MarketType::Victory),
            "total_goals" => Ok(MarketType::TotalGoals),
            "both_teams_score" => Ok(MarketType::BothTeamsScore),
            "shots_on_target" => Ok(MarketType::ShotsOnTarget),
            "handicap" => Ok(MarketType::Handicap),
            "corners" => Ok(MarketType::Corners),
            other => Err(UnknownMarketType(other.to_string())),
        }
    }
}

/// One betting proposition on a fixture, as offered by the catalog.
#[derive(Debug, Clone)]
pub struct CandidateSelection {
    pub market_type: MarketType,
    pub value: String,
    pub odds: f64,
    pub confidence: f64,
}

/// One fixture paired with one of its candidates; the atomic unit of
/// a combination.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectionChoice {
    pub fixture_id: String,
    #[serde(skip_serializing)]
    pub teams: String,
    pub market_type: MarketType,
    pub value: String,
    pub odds: f64,
    pub confidence: f64,
}

impl SelectionChoice {
    pub fn new(fixture_id: &str, teams: &str, candidate: &CandidateSelection) -> Self {
        Self {
            fixture_id: fixture_id.to_string(),
            teams: teams.to_string(),
            market_type: candidate.market_type,
            value: candidate.value.clone(),
            odds: candidate.odds,
            confidence: candidate.confidence,
        }
    }
}

/// A combined bet: selections across distinct fixtures whose odds
/// multiply. Built once by the generator, never mutated afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Combination {
    pub selections: Vec<SelectionChoice>,
    pub total_odds: f64,
    pub aggregate_confidence: f64,
    pub is_exact: bool,
}

/// One fixture with its (already sanitized) candidates, the working
/// set the generator walks over.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub fixture_id: String,
    pub teams: String,
    pub candidates: Vec<CandidateSelection>,
}

pub const TARGET_ODDS_MIN: f64 = 2.0;
pub const TARGET_ODDS_MAX: f64 = 1000.0;
pub const MAX_MATCHES_MIN: usize = 2;
pub const MAX_MATCHES_MAX: usize = 8;

/// Immutable parameters for one generation + selection call.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub target_odds: f64,
    pub max_matches: usize,
    pub min_odds_ratio: f64,
    pub max_odds_ratio: f64,
    pub forbidden_market_pairs: Vec<(MarketType, MarketType)>,
    pub alternatives_count: usize,
    pub exactness_tolerance: f64,
}

impl SearchConfig {
    /// Lower bound of the acceptance band.
    pub fn band_low(&self) -> f64 {
        self.target_odds * self.min_odds_ratio
    }

    /// Upper bound of the acceptance band.
    pub fn band_high(&self) -> f64 {
        self.target_odds * self.max_odds_ratio
    }

    /// Collect every domain-range violation. Nothing is clamped; the
    /// caller surfaces the full list.
    pub fn violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        if !(TARGET_ODDS_MIN..=TARGET_ODDS_MAX).contains(&self.target_odds) {
            violations.push(format!(
                "targetOdds must be between {:.1} and {:.1}, got {}",
                TARGET_ODDS_MIN, TARGET_ODDS_MAX, self.target_odds
            ));
        }
        if !(MAX_MATCHES_MIN..=MAX_MATCHES_MAX).contains(&self.max_matches) {
            violations.push(format!(
                "maxMatches must be between {} and {}, got {}",
                MAX_MATCHES_MIN, MAX_MATCHES_MAX, self.max_matches
            ));
        }
        if self.min_odds_ratio <= 0.0 {
            violations.push(format!(
                "minOddsRatio must be positive, got {}",
                self.min_odds_ratio
            ));
        }
        if self.max_odds_ratio <= 0.0 {
            violations.push(format!(
                "maxOddsRatio must be positive, got {}",
                self.max_odds_ratio
            ));
        }
        if self.min_odds_ratio > self.max_odds_ratio {
            violations.push(format!(
                "minOddsRatio {} exceeds maxOddsRatio {}",
                self.min_odds_ratio, self.max_odds_ratio
            ));
        }
        for (a, b) in &self.forbidden_market_pairs {
            if a == b {
                violations.push(format!(
                    "forbiddenMarketPairs entry pairs {} with itself",
                    a
                ));
            }
        }
        if self.exactness_tolerance < 0.0 {
            violations.push(format!(
                "exactnessTolerance must not be negative, got {}",
                self.exactness_tolerance
            ));
        }

        violations
    }
}

// ---------------------------------------------------------------------------
// Boundary shapes (request/result JSON)
// ---------------------------------------------------------------------------

fn default_min_odds_ratio() -> f64 {
    0.4
}

fn default_max_odds_ratio() -> f64 {
    2.5
}

fn default_alternatives_count() -> usize {
    4
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub fixtures: Vec<RequestFixture>,
    pub target_odds: f64,
    pub max_matches: usize,
    #[serde(default = "default_min_odds_ratio")]
    pub min_odds_ratio: f64,
    #[serde(default = "default_max_odds_ratio")]
    pub max_odds_ratio: f64,
    #[serde(default)]
    pub forbidden_market_pairs: Vec<[String; 2]>,
    #[serde(default = "default_alternatives_count")]
    pub alternatives_count: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestFixture {
    pub id: String,
    pub teams: String,
    #[serde(default)]
    pub candidates: Vec<RequestCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestCandidate {
    pub market_type: String,
    pub value: String,
    pub odds: f64,
    pub confidence: f64,
}

/// An alternative combination, annotated with its own distance to the
/// target odds.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedAlternative {
    #[serde(flatten)]
    pub combination: Combination,
    pub difference: f64,
}

/// A fixture rejected at ingestion, with the reason it was dropped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedFixture {
    pub fixture_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResult {
    pub found: bool,
    pub best: Option<Combination>,
    pub alternatives: Vec<RankedAlternative>,
    pub combinations_evaluated: usize,
    pub dropped_fixtures: Vec<DroppedFixture>,
}
