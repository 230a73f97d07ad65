//! deepage - undersea aging prediction CLI
//!
//! Reads records, models and candidates as JSON files and writes results as
//! pretty JSON on stdout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use deepage_common::config::{load_config, TomlConfig};
use deepage_common::models::{
    CandidateProduct, CoefficientOverrides, FlavorProfile, PredictionRecord, TerrestrialRecord,
    TrainedClusterModel,
};
use deepage_common::EngineParams;
use deepage_predict::{config, db, AgingEngine};

/// Command-line arguments for deepage
#[derive(Parser, Debug)]
#[command(name = "deepage")]
#[command(about = "Undersea aging prediction engine")]
#[command(version)]
struct Args {
    /// Config file (overrides DEEPAGE_CONFIG)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database with stored settings (overrides database_path)
    #[arg(long, global = true, env = "DEEPAGE_DATABASE")]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train cluster models from terrestrial records
    Train {
        /// JSON array of terrestrial records
        #[arg(long)]
        records: PathBuf,

        /// Where to write the trained models
        #[arg(long)]
        out: PathBuf,
    },

    /// Predict the outcome of aging a candidate undersea
    Predict {
        /// JSON candidate product
        #[arg(long)]
        candidate: PathBuf,

        /// JSON array of trained models
        #[arg(long)]
        models: PathBuf,

        /// Months of undersea aging to evaluate
        #[arg(long)]
        months: u32,

        /// Optional JSON flavor profile from an outside tasting source
        #[arg(long)]
        qualitative: Option<PathBuf>,
    },

    /// Month-by-month quality curves for a candidate
    Timeline {
        /// JSON candidate product
        #[arg(long)]
        candidate: PathBuf,
    },

    /// Correction coefficients at a given depth
    Coefficients {
        /// Immersion depth in meters
        #[arg(long)]
        depth: f64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (toml_config, config_source) =
        load_config(args.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&toml_config)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting deepage");
    config_source.log();

    let (params, overrides) = load_settings(&toml_config, args.database.as_deref()).await?;

    match args.command {
        Command::Train { records, out } => {
            let records: Vec<TerrestrialRecord> = read_json(&records)?;
            let engine = AgingEngine::new(params, deepage_predict::Blender::statistical_only());

            let (models, stats) = engine.train(&records);

            let json = serde_json::to_string_pretty(models.as_slice())?;
            std::fs::write(&out, json)
                .with_context(|| format!("Failed to write {}", out.display()))?;
            info!(path = %out.display(), models = models.len(), "Models written");
            print_json(&serde_json::json!({
                "records": stats.records,
                "groups": stats.groups,
                "models": stats.models,
                "skippedGroups": stats.skipped_groups,
            }))?;
        }

        Command::Predict {
            candidate,
            models,
            months,
            qualitative,
        } => {
            let candidate: CandidateProduct = read_json(&candidate)?;
            let models: Vec<TrainedClusterModel> = read_json(&models)?;
            let qualitative: Option<FlavorProfile> =
                qualitative.as_deref().map(read_json::<FlavorProfile>).transpose()?;

            let blender = config::build_blender(&toml_config)
                .context("Failed to configure inference")?;
            let engine = AgingEngine::new(params, blender)
                .with_overrides(overrides)
                .with_models(models);

            let prediction = engine
                .predict_with_qualitative(&candidate, months, None, qualitative.as_ref())
                .await;

            print_json(&PredictionRecord::new(candidate.id, prediction))?;
        }

        Command::Timeline { candidate } => {
            let candidate: CandidateProduct = read_json(&candidate)?;
            let engine = AgingEngine::new(params, deepage_predict::Blender::statistical_only());

            let coefficients = engine.coefficients_for(&candidate, &overrides);
            print_json(&engine.timeline(&candidate, &coefficients))?;
        }

        Command::Coefficients { depth } => {
            anyhow::ensure!(
                depth.is_finite() && depth >= 0.0,
                "Depth must be a non-negative number of meters, got {}",
                depth
            );
            let coefficients =
                deepage_predict::coefficients::compute(&params.environment, depth, &overrides);
            print_json(&coefficients)?;
        }
    }

    Ok(())
}

/// Install the global subscriber; RUST_LOG overrides the configured level
fn init_tracing(config: &TomlConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    // Logs go to stderr so stdout stays pure JSON
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = if config.logging.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))
}

/// Engine parameters and coefficient overrides, with stored settings applied
async fn load_settings(
    config: &TomlConfig,
    cli_database: Option<&Path>,
) -> Result<(EngineParams, CoefficientOverrides)> {
    let Some(path) = cli_database.or(config.database_path.as_deref()) else {
        return Ok((config.engine.clone(), CoefficientOverrides::default()));
    };

    info!(path = %path.display(), "Reading stored settings");
    let pool = db::init_database_pool(path)
        .await
        .with_context(|| format!("Failed to open database {}", path.display()))?;
    let settings = db::settings::load_engine_settings(&pool, &config.engine)
        .await
        .context("Failed to read stored settings")?;
    pool.close().await;
    Ok(settings)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
