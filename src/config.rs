use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub system: SystemConfig,
    pub engine: EngineSettings,
    pub provider: ProviderConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SystemConfig {
    /// Skip provider calls and run on the built-in demo catalog.
    pub dry_run: bool,
    /// Seconds between recommendation runs; 0 means run once and exit.
    #[serde(default)]
    pub refresh_interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineSettings {
    pub target_odds: f64,
    pub max_matches: usize,
    #[serde(default = "default_min_odds_ratio")]
    pub min_odds_ratio: f64,
    #[serde(default = "default_max_odds_ratio")]
    pub max_odds_ratio: f64,
    #[serde(default = "default_forbidden_market_pairs")]
    pub forbidden_market_pairs: Vec<[String; 2]>,
    #[serde(default = "default_alternatives_count")]
    pub alternatives_count: usize,
    #[serde(default = "default_exactness_tolerance")]
    pub exactness_tolerance: f64,
    /// Optional cap on search time, in milliseconds.
    #[serde(default)]
    pub search_deadline_ms: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    pub fixtures_model: String,
    pub narrative_model: String,
    /// Markets the annotator may pick from.
    pub markets: Vec<String>,
    /// "today", "tomorrow" or "custom".
    pub period: String,
    #[serde(default)]
    pub days_ahead: Option<u32>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    pub csv_logging: bool,
    pub csv_log_path: String,
}

fn default_min_odds_ratio() -> f64 {
    0.4
}
fn default_max_odds_ratio() -> f64 {
    2.5
}
fn default_forbidden_market_pairs() -> Vec<[String; 2]> {
    vec![["victory".to_string(), "shots_on_target".to_string()]]
}
fn default_alternatives_count() -> usize {
    4
}
fn default_exactness_tolerance() -> f64 {
    0.10
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_max_retries() -> u32 {
    2
}
fn default_cache_ttl_secs() -> u64 {
    300
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub openai_api_key: String,
    pub openai_base_url: String,
}

impl EnvConfig {
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        Ok(Self {
            openai_api_key: std::env::var("OPENAI_API_KEY")
                .context("OPENAI_API_KEY not set")?,
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [system]
            dry_run = true

            [engine]
            target_odds = 4.0
            max_matches = 3

            [provider]
            fixtures_model = "gpt-4-turbo-preview"
            narrative_model = "gpt-3.5-turbo"
            markets = ["victory", "total_goals", "corners"]
            period = "today"

            [monitoring]
            csv_logging = false
            csv_log_path = "recommendations.csv"
            "#,
        )
        .unwrap();

        assert!((config.engine.min_odds_ratio - 0.4).abs() < 1e-9);
        assert!((config.engine.max_odds_ratio - 2.5).abs() < 1e-9);
        assert_eq!(config.engine.alternatives_count, 4);
        assert_eq!(
            config.engine.forbidden_market_pairs,
            vec![["victory".to_string(), "shots_on_target".to_string()]]
        );
        assert_eq!(config.provider.timeout_secs, 60);
        assert_eq!(config.provider.cache_ttl_secs, 300);
        assert_eq!(config.system.refresh_interval_secs, 0);
        assert!(config.engine.search_deadline_ms.is_none());
    }
}
