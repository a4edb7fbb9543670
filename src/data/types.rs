use std::fmt;
use std::str::FromStr;

/// Which slice of the fixture calendar to ask the provider for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Today,
    Tomorrow,
    Custom { days_ahead: u32 },
}

impl Period {
    pub fn from_config(period: &str, days_ahead: Option<u32>) -> anyhow::Result<Self> {
        match period {
            "today" => Ok(Period::Today),
            "tomorrow" => Ok(Period::Tomorrow),
            "custom" => {
                let days_ahead = days_ahead
                    .ok_or_else(|| anyhow::anyhow!("period 'custom' requires days_ahead"))?;
                if days_ahead > 7 {
                    anyhow::bail!("days_ahead must be at most 7, got {}", days_ahead);
                }
                Ok(Period::Custom { days_ahead })
            }
            other => anyhow::bail!("unknown period: {}", other),
        }
    }

    /// Cache key for fetched catalogs.
    pub fn key(&self) -> String {
        match self {
            Period::Today => "today".to_string(),
            Period::Tomorrow => "tomorrow".to_string(),
            Period::Custom { days_ahead } => format!("custom-{}", days_ahead),
        }
    }

    /// Human phrasing used in the fixture-fetch prompt.
    pub fn prompt_phrase(&self) -> String {
        match self {
            Period::Today => "today (next 24 hours)".to_string(),
            Period::Tomorrow => "tomorrow (24 to 48 hours from now)".to_string(),
            Period::Custom { days_ahead } => format!("within the next {} days", days_ahead),
        }
    }
}

impl FromStr for Period {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::from_config(s, None)
    }
}

/// Outright (1X2) odds line.
#[derive(Debug, Clone, Copy)]
pub struct OutrightOdds {
    pub home: f64,
    pub draw: f64,
    pub away: f64,
}

/// A numeric line with its quoted odds, e.g. corners +8.5 @1.85.
#[derive(Debug, Clone, Copy)]
pub struct QuotedLine {
    pub line: f64,
    pub odds: f64,
}

/// Over/Under total-goals line.
#[derive(Debug, Clone)]
pub struct TotalGoalsLine {
    pub direction: String,
    pub line: f64,
    pub odds: f64,
}

/// Yes/No pick with quoted odds (both-teams-score).
#[derive(Debug, Clone)]
pub struct QuotedPick {
    pub value: String,
    pub odds: f64,
}

/// One fixture as parsed out of the provider's free-text listing,
/// before annotation.
#[derive(Debug, Clone)]
pub struct RawFixture {
    pub id: String,
    pub kickoff: String,
    pub home_team: String,
    pub away_team: String,
    pub outright: Option<OutrightOdds>,
    pub handicap: Option<QuotedLine>,
    pub total_goals: Option<TotalGoalsLine>,
    pub btts: Option<QuotedPick>,
    pub corners: Option<QuotedLine>,
    pub shots: Vec<QuotedLine>,
}

impl RawFixture {
    pub fn teams(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }

    /// Compact rendering of every quoted line, fed back to the
    /// annotator as pricing context.
    pub fn odds_summary(&self) -> String {
        let mut lines = Vec::new();
        if let Some(o) = self.outright {
            lines.push(format!(
                "1X2 {:.2} / {:.2} / {:.2}",
                o.home, o.draw, o.away
            ));
        }
        if let Some(h) = self.handicap {
            lines.push(format!("Handicap H({:+}) @{:.2}", h.line, h.odds));
        }
        if let Some(t) = &self.total_goals {
            lines.push(format!("Total {} {} @{:.2}", t.direction, t.line, t.odds));
        }
        if let Some(b) = &self.btts {
            lines.push(format!("BTTS {} @{:.2}", b.value, b.odds));
        }
        if let Some(c) = self.corners {
            lines.push(format!("Corners +{} @{:.2}", c.line, c.odds));
        }
        for s in &self.shots {
            lines.push(format!("Shots +{} @{:.2}", s.line, s.odds));
        }
        if lines.is_empty() {
            "no quoted lines".to_string()
        } else {
            lines.join(" | ")
        }
    }
}

impl fmt::Display for RawFixture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.teams(), self.kickoff)
    }
}
