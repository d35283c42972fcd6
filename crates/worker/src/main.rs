//! `sportsfest-worker` -- validate a batch of participants and sync their
//! eligibility issues.
//!
//! Usage: `sportsfest-worker <participants.json>` or set `PARTICIPANTS_FILE`.
//! The file holds a JSON array of normalized participant records, each with
//! a `church_code` and optionally `church_name`, `updated_at` and
//! `completion_checklist`. `CHURCHES_FILE`, when set, names a JSON array of
//! churches (`church_code`, `name`, `pastor_name`, `pastor_email`) upserted
//! before the participants.
//! See [`SyncConfig::from_env`] for the remaining environment variables.

use anyhow::Context;
use serde_json::{Map, Value};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sportsfest_core::validation::EligibilityValidator;
use sportsfest_core::validation::RuleStore;
use sportsfest_db::models::church::CreateChurch;
use sportsfest_worker::{HttpPhotoProbe, SyncConfig, SyncRunner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sportsfest_worker=debug,sportsfest_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = SyncConfig::from_env()?;
    tracing::info!(
        rules_dir = %config.rules_dir.display(),
        collection = %config.rules_collection,
        live_test = config.live_test,
        concurrency = config.validation_concurrency,
        "Loaded sync configuration"
    );

    let input = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("PARTICIPANTS_FILE").ok())
        .context("participants file path required as first argument or PARTICIPANTS_FILE")?;

    // --- Rules ---
    let store = RuleStore::new(&config.rules_dir);
    let mut validator = EligibilityValidator::from_collection(&store, &config.rules_collection)?;
    if let Some(date) = config.event_date {
        validator = validator.with_event_date(date);
    }
    tracing::info!(event_date = %validator.event_date(), rules = validator.rules().len(), "Validator ready");

    // --- Database ---
    let pool = sportsfest_db::create_pool(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    sportsfest_db::health_check(&pool)
        .await
        .context("Database health check failed")?;
    sportsfest_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database ready");

    // --- Input ---
    let raw = std::fs::read_to_string(&input).with_context(|| format!("Cannot read {input}"))?;
    let records: Vec<Map<String, Value>> =
        serde_json::from_str(&raw).with_context(|| format!("{input} is not a JSON array of objects"))?;

    let churches: Vec<CreateChurch> = match std::env::var("CHURCHES_FILE").ok() {
        Some(path) => {
            let raw = std::fs::read_to_string(&path).with_context(|| format!("Cannot read {path}"))?;
            serde_json::from_str(&raw).with_context(|| format!("{path} is not a JSON array of churches"))?
        }
        None => Vec::new(),
    };

    // --- Sync ---
    let probe = if config.live_test {
        Some(HttpPhotoProbe::new(config.photo_probe_timeout)?)
    } else {
        None
    };
    let runner = SyncRunner::new(pool, validator, probe).with_concurrency(config.validation_concurrency);
    let church_stats = runner.sync_churches(&churches).await;
    let mut stats = runner.run(records).await;
    stats.churches += church_stats;

    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
