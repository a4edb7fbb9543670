use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::{EnvConfig, ProviderConfig};
use crate::data::parser;
use crate::data::types::{Period, RawFixture};
use crate::engine::types::{CandidateSelection, Combination};

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Chat-completions client for the catalog and narrative providers.
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    fixtures_model: String,
    narrative_model: String,
    max_retries: u32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl OpenAiClient {
    pub fn new(env: &EnvConfig, config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key: env.openai_api_key.clone(),
            base_url: env.openai_base_url.clone(),
            fixtures_model: config.fixtures_model.clone(),
            narrative_model: config.narrative_model.clone(),
            max_retries: config.max_retries,
        })
    }

    /// Ask the provider for the period's fixture listing and parse it.
    pub async fn fetch_fixtures(&self, period: &Period) -> Result<Vec<RawFixture>> {
        let content = self
            .chat(
                &self.fixtures_model,
                "You are a professional bookmaker with access to live odds feeds.",
                &fixture_listing_prompt(period),
                0.3,
                2500,
            )
            .await
            .context("Fixture listing request failed")?;

        let fixtures = parser::parse_fixture_blocks(&content)?;
        info!("Fetched {} fixtures for period {}", fixtures.len(), period.key());
        Ok(fixtures)
    }

    /// Ask the provider for the two safest selections on one fixture.
    pub async fn annotate_fixture(
        &self,
        fixture: &RawFixture,
        markets: &[String],
    ) -> Result<Vec<CandidateSelection>> {
        let content = self
            .chat(
                &self.fixtures_model,
                "You are an ultra-precise sports analyst who only backs high-probability picks (>70%).",
                &annotation_prompt(fixture, markets),
                0.2,
                600,
            )
            .await
            .with_context(|| format!("Annotation request failed for {}", fixture))?;

        let candidates = parser::parse_safe_elements(&content)
            .with_context(|| format!("Annotation response unusable for {}", fixture))?;
        Ok(candidates)
    }

    /// Free-text rationale for a selected combination. Purely additive:
    /// failures here never block the recommendation.
    pub async fn explain_combination(&self, combination: &Combination) -> Result<String> {
        self.chat(
            &self.narrative_model,
            "You are a professional sports betting advisor.",
            &narrative_prompt(combination),
            0.5,
            400,
        )
        .await
        .context("Narrative request failed")
    }

    /// One chat-completions round trip with bounded retries: linear
    /// backoff on rate limiting and timeouts, immediate failure on
    /// other errors.
    async fn chat(
        &self,
        model: &str,
        system: &str,
        user: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String> {
        let url = format!("{}{}", self.base_url, CHAT_COMPLETIONS_PATH);
        let payload = json!({
            "model": model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user }
            ],
            "temperature": temperature,
            "max_tokens": max_tokens,
        });

        let mut attempt = 0u32;
        loop {
            let send_result = self
                .client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&payload)
                .send()
                .await;

            match send_result {
                Ok(response) => {
                    let status = response.status();
                    if status.as_u16() == 429 && attempt < self.max_retries {
                        attempt += 1;
                        warn!("Provider rate limited, retry {}/{}", attempt, self.max_retries);
                        sleep(Duration::from_millis(150 * u64::from(attempt))).await;
                        continue;
                    }
                    if !status.is_success() {
                        let body = response.text().await.unwrap_or_default();
                        anyhow::bail!("Provider returned {}: {}", status, body);
                    }

                    let parsed: ChatResponse = response
                        .json()
                        .await
                        .context("Failed to parse provider response")?;
                    let content = parsed
                        .choices
                        .into_iter()
                        .next()
                        .map(|choice| choice.message.content)
                        .context("Provider response had no choices")?;
                    return Ok(content);
                }
                Err(e) if e.is_timeout() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!("Provider timed out, retry {}/{}", attempt, self.max_retries);
                    sleep(Duration::from_millis(150 * u64::from(attempt))).await;
                }
                Err(e) => return Err(e).context("Provider request failed"),
            }
        }
    }
}

fn fixture_listing_prompt(period: &Period) -> String {
    format!(
        r#"List the 15 most important football fixtures {period}.

FOR EACH FIXTURE provide EXACTLY this block, between separator lines:
━━━━━━━━━━━━━━━━━━━━━━━
🕒 14:30 | Paris SG vs Marseille
🏆 1X2: 1.85 / 3.40 / 4.20
🎯 Handicap: H(-0.5) @1.95
⚽ Total: Over 2.5 @1.80
🔁 BTTS: Yes @1.70
📐 Corners: +8.5 @1.85
🎯 Shots: +7.5 @1.90
━━━━━━━━━━━━━━━━━━━━━━━

Use realistic odds. Output only the blocks, no commentary."#,
        period = period.prompt_phrase()
    )
}

fn annotation_prompt(fixture: &RawFixture, markets: &[String]) -> String {
    format!(
        r#"Fixture: {teams} (kickoff {kickoff})
Quoted lines: {lines}

Among these markets: {markets},
choose EXACTLY 2 picks with the HIGHEST probability (>70%).

RULES:
1. NEVER combine victory and shots_on_target on the same fixture
2. At most ONE shots_on_target pick per fixture
3. Odds must be realistic (1.50 to 2.50)
4. Justify each pick in one short clause

FORMAT, exactly:
⚽ {teams}
🎯 Pick 1: [market] - [value] - Odds X.XX - [justification]
🎯 Pick 2: [market] - [value] - Odds X.XX - [justification]
🧠 Confidence: XX%"#,
        teams = fixture.teams(),
        kickoff = fixture.kickoff,
        lines = fixture.odds_summary(),
        markets = markets.join(", ")
    )
}

fn narrative_prompt(combination: &Combination) -> String {
    let fixtures = combination
        .selections
        .iter()
        .map(|s| s.teams.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"Review this combined bet and explain why it holds up:

Fixtures: {fixtures}
Total odds: {total:.2}
Average confidence: {confidence:.0}%

Provide:
1. Overall risk analysis (2-3 sentences)
2. The combination's strong point
3. One point of caution
4. A stake recommendation (e.g. "2% of bankroll")"#,
        fixtures = fixtures,
        total = combination.total_odds,
        confidence = combination.aggregate_confidence,
    )
}
