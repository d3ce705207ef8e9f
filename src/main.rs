//! Stride - PE activity recommender CLI
//!
//! Runs recommendations against a JSON dataset of students, classes,
//! activities and performance records.

use clap::{Parser, Subcommand};
use stride_core::{
    error::Result, ActivityId, ActivityType, CacheStore, ClassId, InMemoryStorage,
    PreferenceInput, RecommendationEngine, RecommendationFilters, RecommendationRequest,
    ScoredRecommendation, StrideConfig, StudentId,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stride")]
#[command(about = "Recommend physical-education activities for a student", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file (overridable with STRIDE__SECTION__FIELD env vars)
    #[arg(long, global = true, env = "STRIDE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank activities for a student in a class
    Recommend {
        /// JSON dataset file
        #[arg(long, env = "STRIDE_DATA")]
        data: PathBuf,

        #[arg(long)]
        student: String,

        #[arg(long)]
        class: String,

        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,

        /// Drop activities scoring below this (0-1)
        #[arg(long)]
        min_score: Option<f32>,

        /// Drop activities longer than this many minutes
        #[arg(long)]
        max_duration: Option<u32>,

        /// Drop activities performed within the recent window
        #[arg(long)]
        exclude_recent: bool,

        /// At most one activity per category
        #[arg(long)]
        balanced: bool,

        /// Preferred activity type (repeatable)
        #[arg(long = "prefer-type")]
        prefer_types: Vec<ActivityType>,

        /// Preferred difficulty (1-5)
        #[arg(long)]
        difficulty: Option<u8>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the score breakdown of one activity
    Explain {
        #[arg(long, env = "STRIDE_DATA")]
        data: PathBuf,

        #[arg(long)]
        student: String,

        #[arg(long)]
        class: String,

        #[arg(long)]
        activity: String,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
}

fn preferences_from_args(
    prefer_types: Vec<ActivityType>,
    difficulty: Option<u8>,
) -> Option<PreferenceInput> {
    if prefer_types.is_empty() && difficulty.is_none() {
        return None;
    }

    Some(PreferenceInput {
        activity_types: if prefer_types.is_empty() {
            None
        } else {
            Some(prefer_types.into_iter().collect())
        },
        difficulty,
        ..Default::default()
    })
}

fn print_table(results: &[ScoredRecommendation]) {
    if results.is_empty() {
        println!("No recommendations.");
        return;
    }

    println!(
        "{:<3} {:<28} {:<18} {:<16} {:>6}  {:>5} {:>5} {:>5} {:>5} {:>5}",
        "#", "Activity", "Type", "Category", "Score", "Skill", "Fit", "Pref", "Class", "Perf"
    );
    for (i, rec) in results.iter().enumerate() {
        let b = &rec.breakdown;
        println!(
            "{:<3} {:<28} {:<18} {:<16} {:>6.3}  {:>5.2} {:>5.2} {:>5.2} {:>5.2} {:>5.2}",
            i + 1,
            rec.activity.name,
            rec.activity.activity_type.to_string(),
            rec.activity.category.to_string(),
            rec.score,
            b.skill_level_match,
            b.fitness_level_match,
            b.preference_match,
            b.class_requirements,
            b.recent_performance
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::new(format!(
        "stride={0},stride_core={0}",
        level.as_str().to_lowercase()
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    debug!("Stride v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = StrideConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Recommend {
            data,
            student,
            class,
            limit,
            min_score,
            max_duration,
            exclude_recent,
            balanced,
            prefer_types,
            difficulty,
            json,
        } => {
            let storage = Arc::new(InMemoryStorage::from_json_file(&data)?);
            let cache = Arc::new(CacheStore::new(config.cache.clone()));
            let engine = RecommendationEngine::new(storage, config.recommendation.clone())
                .with_cache(cache);

            let mut request = RecommendationRequest::new(
                StudentId::from_string(&student)?,
                ClassId::from_string(&class)?,
            )
            .with_filters(RecommendationFilters {
                min_score,
                max_duration,
                exclude_recent,
            });
            request.limit = limit;
            request.balanced = balanced;
            request.preferences = preferences_from_args(prefer_types, difficulty);

            let results = engine.recommend(&request).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_table(&results);
            }
            Ok(())
        }
        Commands::Explain {
            data,
            student,
            class,
            activity,
        } => {
            let storage = Arc::new(InMemoryStorage::from_json_file(&data)?);
            let engine = RecommendationEngine::new(storage, config.recommendation.clone());

            let explained = engine
                .explain(
                    StudentId::from_string(&student)?,
                    ClassId::from_string(&class)?,
                    ActivityId::from_string(&activity)?,
                    None,
                )
                .await?;

            println!("{}", serde_json::to_string_pretty(&explained)?);
            Ok(())
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                print!("{}", config.to_toml()?);
                Ok(())
            }
        },
    }
}
