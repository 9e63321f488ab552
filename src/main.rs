//! Celestial Core - batch entry point
//!
//! `train` runs the correlation batch job and saves the registry, `detect`
//! and `score` run over an events file, `risk` reads the saved registry.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Parser, Subcommand};

use celestial_core::constants::{APP_NAME, APP_VERSION};
use celestial_core::{
    detect_patterns, load_registry, predict_risk, predict_risk_from_events, save_registry, score_event,
    train_all_correlations, Config, CoreError, EventSource, EventType, HistoricalEventSource, Hypothesis,
    InMemorySource, ScoringContext, SyntheticHistory,
};

#[derive(Parser)]
#[command(name = "celestial-core", about = "Celestial/geophysical event correlation core", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train every correlation hypothesis and save the registry
    Train {
        /// JSON array of historical events (synthetic history if omitted)
        #[arg(long)]
        history: Option<PathBuf>,

        /// Seed for the synthetic history
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Detect clusters, patterns and similar pairs in [start, end)
    Detect {
        events: PathBuf,
        start: NaiveDate,
        end: NaiveDate,

        /// Comma-separated event types to keep
        #[arg(long, value_delimiter = ',')]
        types: Vec<EventType>,
    },

    /// Score every event in [start, end) with its detection context
    Score {
        events: PathBuf,
        start: NaiveDate,
        end: NaiveDate,
    },

    /// Predict risk for one hypothesis from the saved registry
    Risk {
        hypothesis: String,

        /// Comma-separated feature vector
        #[arg(value_delimiter = ',', allow_negative_numbers = true)]
        features: Vec<f64>,

        /// Build the feature vector from recent events instead
        #[arg(long)]
        events: Option<PathBuf>,

        /// Day to predict for (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Train { history, seed } => {
            let source: Box<dyn HistoricalEventSource> = match history {
                Some(path) => Box::new(InMemorySource::from_json_file(&path)?),
                None => {
                    let seed = seed.unwrap_or(config.training.seed);
                    log::info!("No history file given, using synthetic history (seed {})", seed);
                    Box::new(SyntheticHistory::new(seed))
                }
            };

            let (registry, report) = train_all_correlations(source.as_ref(), &config.training)?;
            save_registry(&registry, &config.model_path)?;
            print_json(&report)
        }

        Commands::Detect { events, start, end, types } => {
            let source = InMemorySource::from_json_file(&events)?;
            let types = (!types.is_empty()).then_some(types);
            let report = detect_patterns(&source, midnight(start), midnight(end), types.as_deref(), &config.detection)?;
            print_json(&report)
        }

        Commands::Score { events, start, end } => {
            let source = InMemorySource::from_json_file(&events)?;
            let (start, end) = (midnight(start), midnight(end));
            let report = detect_patterns(&source, start, end, None, &config.detection)?;

            let alerts: Vec<_> = source
                .fetch_events(start, end, None)?
                .iter()
                .map(|event| score_event(event, Some(&ScoringContext::for_event(&report, &event.id))))
                .collect();
            print_json(&alerts)
        }

        Commands::Risk { hypothesis, features, events, date } => {
            let registry = load_registry(&config.model_path)?;
            let risk = match events {
                Some(path) => {
                    let id = Hypothesis::from_id(&hypothesis)
                        .ok_or_else(|| CoreError::InvalidParameter(format!("unknown hypothesis '{}'", hypothesis)))?;
                    let source = InMemorySource::from_json_file(&path)?;
                    let day = date.unwrap_or_else(|| Utc::now().date_naive());
                    predict_risk_from_events(&registry, id, source.events(), day)?
                }
                None => predict_risk(&registry, &hypothesis, &features)?,
            };
            print_json(&serde_json::json!({ "hypothesis": hypothesis, "risk": risk }))
        }
    }
}

fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::from_env();
    log::info!("{} v{}", APP_NAME, APP_VERSION);

    if let Err(e) = run(cli, &config) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
