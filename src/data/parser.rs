//! Regex adapters from the provider's free-text responses to typed
//! catalog records. The prompts pin a strict block format, but the
//! parsing stays defensive: a malformed block is skipped, never fatal.

use rand::Rng;
use regex::Regex;
use tracing::warn;

use crate::data::types::{OutrightOdds, QuotedLine, QuotedPick, RawFixture, TotalGoalsLine};
use crate::engine::types::{CandidateSelection, MarketType};

/// Hard cap on fixtures kept from one listing response.
pub const MAX_FIXTURES_PER_FETCH: usize = 15;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("fixture block is missing its header line")]
    MissingHeader,
    #[error("no picks found in annotation response")]
    NoPicks,
    #[error("bad pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Random 9-character base-36 fixture id.
pub fn random_fixture_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..9)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Parse a fixture-listing response into raw fixtures. Blocks that do
/// not follow the format are skipped with a warning; at most
/// [`MAX_FIXTURES_PER_FETCH`] fixtures are kept.
pub fn parse_fixture_blocks(content: &str) -> Result<Vec<RawFixture>, ParseError> {
    let separator = Regex::new(r"━+")?;
    let patterns = FixturePatterns::new()?;

    let mut fixtures = Vec::new();
    for block in separator.split(content) {
        if block.trim().is_empty() {
            continue;
        }
        match parse_fixture_block(block, &patterns) {
            Ok(fixture) => fixtures.push(fixture),
            Err(e) => warn!("skipping unparseable fixture block: {}", e),
        }
        if fixtures.len() >= MAX_FIXTURES_PER_FETCH {
            break;
        }
    }

    Ok(fixtures)
}

struct FixturePatterns {
    decimal: Regex,
    handicap: Regex,
    total: Regex,
    btts: Regex,
    line_at_odds: Regex,
}

impl FixturePatterns {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            decimal: Regex::new(r"(\d+\.\d+)")?,
            handicap: Regex::new(r"H\(([-+]?\d+(?:\.\d+)?)\) @(\d+\.\d+)")?,
            total: Regex::new(r"(Over|Under) (\d+(?:\.\d+)?) @(\d+\.\d+)")?,
            btts: Regex::new(r"(Yes|No) @(\d+\.\d+)")?,
            line_at_odds: Regex::new(r"\+(\d+(?:\.\d+)?) @(\d+\.\d+)")?,
        })
    }
}

fn parse_fixture_block(block: &str, patterns: &FixturePatterns) -> Result<RawFixture, ParseError> {
    let lines: Vec<&str> = block.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let header = lines
        .iter()
        .find(|l| l.starts_with("🕒"))
        .ok_or(ParseError::MissingHeader)?;
    let (kickoff, home_team, away_team) = parse_header(header).ok_or(ParseError::MissingHeader)?;

    let mut fixture = RawFixture {
        id: random_fixture_id(),
        kickoff,
        home_team,
        away_team,
        outright: None,
        handicap: None,
        total_goals: None,
        btts: None,
        corners: None,
        shots: Vec::new(),
    };

    for line in &lines {
        if line.starts_with("🏆") {
            let odds: Vec<f64> = patterns
                .decimal
                .captures_iter(line)
                .filter_map(|c| c[1].parse().ok())
                .collect();
            if odds.len() >= 3 {
                fixture.outright = Some(OutrightOdds {
                    home: odds[0],
                    draw: odds[1],
                    away: odds[2],
                });
            }
        } else if line.contains("Handicap:") {
            if let Some(c) = patterns.handicap.captures(line) {
                if let (Ok(handicap_line), Ok(odds)) = (c[1].parse(), c[2].parse()) {
                    fixture.handicap = Some(QuotedLine {
                        line: handicap_line,
                        odds,
                    });
                }
            }
        } else if line.contains("Total:") {
            if let Some(c) = patterns.total.captures(line) {
                if let (Ok(goal_line), Ok(odds)) = (c[2].parse(), c[3].parse()) {
                    fixture.total_goals = Some(TotalGoalsLine {
                        direction: c[1].to_string(),
                        line: goal_line,
                        odds,
                    });
                }
            }
        } else if line.contains("BTTS:") {
            if let Some(c) = patterns.btts.captures(line) {
                if let Ok(odds) = c[2].parse() {
                    fixture.btts = Some(QuotedPick {
                        value: c[1].to_string(),
                        odds,
                    });
                }
            }
        } else if line.contains("Corners:") {
            if let Some(c) = patterns.line_at_odds.captures(line) {
                if let (Ok(corner_line), Ok(odds)) = (c[1].parse(), c[2].parse()) {
                    fixture.corners = Some(QuotedLine {
                        line: corner_line,
                        odds,
                    });
                }
            }
        } else if line.contains("Shots:") {
            for c in patterns.line_at_odds.captures_iter(line) {
                if let (Ok(shot_line), Ok(odds)) = (c[1].parse(), c[2].parse()) {
                    fixture.shots.push(QuotedLine {
                        line: shot_line,
                        odds,
                    });
                }
            }
        }
    }

    Ok(fixture)
}

fn parse_header(header: &str) -> Option<(String, String, String)> {
    // "🕒 14:30 | Paris SG vs Marseille"
    let rest = header.trim_start_matches("🕒").trim();
    let (kickoff, teams) = rest.split_once('|')?;
    let (home, away) = teams.split_once(" vs ")?;
    Some((
        kickoff.trim().to_string(),
        home.trim().to_string(),
        away.trim().to_string(),
    ))
}

const DEFAULT_CONFIDENCE: f64 = 70.0;

/// Parse an annotation response into at most two candidate selections.
/// The per-fixture confidence figure applies to both picks; missing
/// confidence falls back to a conservative default.
pub fn parse_safe_elements(content: &str) -> Result<Vec<CandidateSelection>, ParseError> {
    let pick = Regex::new(r"Pick \d+:\s*([A-Za-z_ ]+?)\s*-\s*(.+?)\s*-\s*Odds\s*(\d+(?:\.\d+)?)")?;
    let confidence_re = Regex::new(r"Confidence:\s*(\d+)\s*%")?;

    let confidence = confidence_re
        .captures(content)
        .and_then(|c| c[1].parse().ok())
        .unwrap_or(DEFAULT_CONFIDENCE);

    let mut candidates = Vec::new();
    for captures in pick.captures_iter(content) {
        let label = &captures[1];
        let market_type = match normalize_market(label) {
            Some(market_type) => market_type,
            None => {
                warn!("skipping pick with unrecognized market label: {}", label);
                continue;
            }
        };
        let odds: f64 = match captures[3].parse() {
            Ok(odds) => odds,
            Err(_) => continue,
        };
        candidates.push(CandidateSelection {
            market_type,
            value: captures[2].trim().to_string(),
            odds,
            confidence,
        });
        if candidates.len() == 2 {
            break;
        }
    }

    if candidates.is_empty() {
        return Err(ParseError::NoPicks);
    }
    Ok(candidates)
}

/// Map the loose market labels models produce onto the canonical
/// market types.
fn normalize_market(label: &str) -> Option<MarketType> {
    let normalized = label.trim().to_lowercase().replace(' ', "_");
    match normalized.as_str() {
        "victory" | "win" | "1x2" | "result" | "match_result" | "victoire" => {
            Some(MarketType::Victory)
        }
        "total_goals" | "total" | "goals" | "over_under" => Some(MarketType::TotalGoals),
        "both_teams_score" | "btts" | "both_teams_to_score" => Some(MarketType::BothTeamsScore),
        "shots_on_target" | "shots" | "tirs_cadres" => Some(MarketType::ShotsOnTarget),
        "handicap" => Some(MarketType::Handicap),
        "corners" => Some(MarketType::Corners),
        _ => None,
    }
}
