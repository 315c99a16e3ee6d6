//! Health Signal - constitution scoring, emergency triage and privacy-safe
//! symptom surveillance

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use healthsignal::{
    api::build_app,
    config::HealthSignalConfig,
    privacy::Anonymizer,
    safety::{SafetyClassifier, SafetyState},
    scoring::{QuizAnswer, ScoringEngine, ScoringState},
    surveillance::{open_store, IntakePipeline, RetryPolicy, SurveillanceState},
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "healthsignal")]
#[command(author = "Health Signal Team")]
#[command(version)]
#[command(about = "Constitution scoring, emergency triage and privacy-safe symptom surveillance")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "HEALTHSIGNAL_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Check text for emergency keywords
    Classify {
        /// Text to check
        #[arg(short, long)]
        text: String,

        /// Advisory language code
        #[arg(short, long, default_value = "en")]
        lang: String,
    },

    /// Compute a constitution profile from an answers file
    Score {
        /// Subject identifier
        #[arg(short, long)]
        subject: String,

        /// JSON file holding an array of answers
        #[arg(short, long)]
        answers: PathBuf,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("healthsignal={},tower_http=info", log_level).into());
    if cli.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Load configuration
    let config = match &cli.config {
        Some(path) => HealthSignalConfig::load(path)?,
        None => HealthSignalConfig::default(),
    };

    match cli.command {
        Commands::Serve { host, port } => {
            run_server(config, host, port).await?;
        }
        Commands::Classify { text, lang } => {
            classify(&config, &text, &lang)?;
        }
        Commands::Score { subject, answers } => {
            score(&config, &subject, &answers)?;
        }
        Commands::Config { default } => {
            show_config(if default { None } else { Some(&config) })?;
        }
    }

    Ok(())
}

async fn run_server(
    config: HealthSignalConfig,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    tracing::info!("Starting Health Signal");

    let salt = config.privacy.resolve_salt()?;
    let store = open_store(&config.storage).await?;
    let pipeline = IntakePipeline::new(
        Anonymizer::sha256(salt),
        store,
        RetryPolicy::from_config(&config.storage),
    );
    let classifier = SafetyClassifier::from_config(&config.safety)?;

    let app = build_app(
        ScoringState {
            engine: Arc::new(ScoringEngine::new(config.scoring)),
        },
        SafetyState {
            classifier: Arc::new(classifier),
        },
        SurveillanceState {
            pipeline: Arc::new(pipeline),
        },
        &config.server.cors_origins,
    );

    let host = host.unwrap_or(config.server.host);
    let port = port.unwrap_or(config.server.port);
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Health Signal listening on http://{}. Press Ctrl+C to stop.", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        })
        .await?;

    Ok(())
}

fn classify(config: &HealthSignalConfig, text: &str, lang: &str) -> Result<()> {
    let classifier = SafetyClassifier::from_config(&config.safety)?;
    let result = classifier.classify(text, lang);

    match result.advisory_text() {
        Some(advisory) => {
            println!("EMERGENCY: {}", result.matched_keywords().join(", "));
            println!();
            println!("{}", advisory);
        }
        None => println!("No emergency keywords found."),
    }
    Ok(())
}

fn score(config: &HealthSignalConfig, subject: &str, answers_path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(answers_path)
        .with_context(|| format!("Failed to read {}", answers_path.display()))?;
    let answers: Vec<QuizAnswer> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", answers_path.display()))?;

    let profile = ScoringEngine::new(config.scoring).compute_profile(subject, &answers)?;
    println!("{}", serde_json::to_string_pretty(&profile)?);
    Ok(())
}

fn show_config(config: Option<&HealthSignalConfig>) -> Result<()> {
    let config = config.cloned().unwrap_or_default();
    let toml = toml::to_string_pretty(&config)?;
    println!("{}", toml);
    Ok(())
}
