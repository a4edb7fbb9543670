mod config;
mod data;
mod engine;
mod monitoring;

use std::time::{Duration, Instant};

use anyhow::Result;
use futures::future::join_all;
use serde::Serialize;
use tracing::{error, info, warn};

use config::{Config, EnvConfig};
use data::cache::FixtureCache;
use data::openai::OpenAiClient;
use data::types::{Period, RawFixture};
use engine::types::{GenerateRequest, GenerateResult, RequestCandidate, RequestFixture};
use engine::EngineOptions;
use monitoring::logger::CsvLogger;
use monitoring::TracingProgress;

const NARRATIVE_FALLBACK: &str = "No analysis available for this combination.";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunReport {
    result: GenerateResult,
    narrative: Option<String>,
    metadata: RunMetadata,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunMetadata {
    duration_seconds: f64,
    fixtures_analyzed: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    info!("parlay-bot starting");
    let config = Config::load("config.toml")?;
    info!(
        "Target odds {} over up to {} fixtures (band {:.1}x-{:.1}x)",
        config.engine.target_odds,
        config.engine.max_matches,
        config.engine.min_odds_ratio,
        config.engine.max_odds_ratio
    );
    info!("Dry run mode: {}", config.system.dry_run);

    let csv = if config.monitoring.csv_logging {
        Some(CsvLogger::new(config.monitoring.csv_log_path.clone())?)
    } else {
        None
    };

    if config.system.dry_run {
        let started = Instant::now();
        let report = recommend(
            &config,
            demo_catalog(),
            None,
            csv.as_ref(),
            "demo",
            started,
        )
        .await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    // Fail on bad engine settings before spending any provider call.
    engine::validate_settings(&build_request(&config, Vec::new()), &engine_options(&config))?;

    let env = EnvConfig::load()?;
    let client = OpenAiClient::new(&env, &config.provider)?;
    let period = Period::from_config(&config.provider.period, config.provider.days_ahead)?;
    let cache = FixtureCache::new(Duration::from_secs(config.provider.cache_ttl_secs));

    loop {
        if let Err(e) = run_once(&config, &client, &cache, period, csv.as_ref()).await {
            error!("Recommendation run failed: {:#}", e);
        }

        if config.system.refresh_interval_secs == 0 {
            break;
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutting down...");
                break;
            }
            _ = tokio::time::sleep(Duration::from_secs(config.system.refresh_interval_secs)) => {}
        }
    }

    Ok(())
}

/// One full fetch -> annotate -> generate -> narrate pass.
async fn run_once(
    config: &Config,
    client: &OpenAiClient,
    cache: &FixtureCache,
    period: Period,
    csv: Option<&CsvLogger>,
) -> Result<()> {
    let started = Instant::now();

    let fixtures = match cache.get(&period.key()) {
        Some(fixtures) => {
            info!("Using cached catalog for {}", period.key());
            fixtures
        }
        None => {
            let fetched = client.fetch_fixtures(&period).await?;
            cache.insert(period.key(), fetched.clone());
            fetched
        }
    };

    // Annotate only the head of the listing; beyond twice the
    // combination cap extra fixtures cannot change the outcome much
    // and each one costs a provider call.
    let to_annotate: Vec<&RawFixture> = fixtures
        .iter()
        .take(config.engine.max_matches * 2)
        .collect();
    info!("Annotating {} fixtures", to_annotate.len());

    let annotations = join_all(to_annotate.into_iter().map(|fixture| async move {
        let picks = client
            .annotate_fixture(fixture, &config.provider.markets)
            .await;
        (fixture, picks)
    }))
    .await;

    let mut request_fixtures = Vec::new();
    for (fixture, picks) in annotations {
        match picks {
            Ok(candidates) => request_fixtures.push(RequestFixture {
                id: fixture.id.clone(),
                teams: fixture.teams(),
                candidates: candidates
                    .into_iter()
                    .map(|c| RequestCandidate {
                        market_type: c.market_type.as_str().to_string(),
                        value: c.value,
                        odds: c.odds,
                        confidence: c.confidence,
                    })
                    .collect(),
            }),
            Err(e) => warn!("Dropping {}: {:#}", fixture, e),
        }
    }

    let report = recommend(
        config,
        request_fixtures,
        Some(client),
        csv,
        &period.key(),
        started,
    )
    .await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}

/// Run the engine over an annotated catalog and assemble the report.
async fn recommend(
    config: &Config,
    fixtures: Vec<RequestFixture>,
    client: Option<&OpenAiClient>,
    csv: Option<&CsvLogger>,
    period_key: &str,
    started: Instant,
) -> Result<RunReport> {
    let fixtures_analyzed = fixtures.len();
    let request = build_request(config, fixtures);
    let options = engine_options(config);

    let result = engine::run_generation(&request, &options, &TracingProgress)?;

    let narrative = match &result.best {
        Some(best) => {
            if let Some(csv) = csv {
                csv.log_recommendation(period_key, config.engine.target_odds, best)?;
            }
            match client {
                Some(client) => Some(match client.explain_combination(best).await {
                    Ok(text) => text,
                    Err(e) => {
                        warn!("Narrative provider failed: {:#}", e);
                        NARRATIVE_FALLBACK.to_string()
                    }
                }),
                None => None,
            }
        }
        None => {
            info!(
                "No combination inside the acceptance band; consider lowering \
                 target_odds or widening the ratio band"
            );
            None
        }
    };

    Ok(RunReport {
        result,
        narrative,
        metadata: RunMetadata {
            duration_seconds: started.elapsed().as_secs_f64(),
            fixtures_analyzed,
        },
    })
}

fn build_request(config: &Config, fixtures: Vec<RequestFixture>) -> GenerateRequest {
    GenerateRequest {
        fixtures,
        target_odds: config.engine.target_odds,
        max_matches: config.engine.max_matches,
        min_odds_ratio: config.engine.min_odds_ratio,
        max_odds_ratio: config.engine.max_odds_ratio,
        forbidden_market_pairs: config.engine.forbidden_market_pairs.clone(),
        alternatives_count: config.engine.alternatives_count,
    }
}

fn engine_options(config: &Config) -> EngineOptions {
    EngineOptions {
        exactness_tolerance: config.engine.exactness_tolerance,
        deadline: config
            .engine
            .search_deadline_ms
            .map(|ms| Instant::now() + Duration::from_millis(ms)),
    }
}

/// Small built-in catalog for dry runs, no provider calls needed.
fn demo_catalog() -> Vec<RequestFixture> {
    let fixture = |id: &str, teams: &str, picks: [(&str, &str, f64, f64); 2]| RequestFixture {
        id: id.to_string(),
        teams: teams.to_string(),
        candidates: picks
            .into_iter()
            .map(|(market_type, value, odds, confidence)| RequestCandidate {
                market_type: market_type.to_string(),
                value: value.to_string(),
                odds,
                confidence,
            })
            .collect(),
    };

    vec![
        fixture(
            "demo-psg-om",
            "Paris SG vs Marseille",
            [
                ("victory", "Paris SG", 1.85, 80.0),
                ("total_goals", "Over 2.5", 1.80, 74.0),
            ],
        ),
        fixture(
            "demo-ol-asm",
            "Lyon vs Monaco",
            [
                ("both_teams_score", "Yes", 1.70, 76.0),
                ("corners", "+8.5", 1.85, 70.0),
            ],
        ),
        fixture(
            "demo-rma-fcb",
            "Real Madrid vs Barcelona",
            [
                ("total_goals", "Over 2.5", 1.75, 78.0),
                ("shots_on_target", "+7.5", 1.90, 72.0),
            ],
        ),
        fixture(
            "demo-mci-liv",
            "Man City vs Liverpool",
            [
                ("handicap", "H(-0.5)", 2.05, 71.0),
                ("both_teams_score", "Yes", 1.65, 79.0),
            ],
        ),
        fixture(
            "demo-bay-bvb",
            "Bayern Munich vs Dortmund",
            [
                ("victory", "Bayern Munich", 1.70, 82.0),
                ("corners", "+9.5", 2.00, 68.0),
            ],
        ),
    ]
}
