use std::env;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use wayfare_core::{FaqEntry, MessageInput, Place};
use wayfare_engine::{EngineConfig, GuideEngine};
use wayfare_observability::{init_tracing, AppMetrics};
use wayfare_storage::{FaqRepository, PlaceRepository, Store};

#[derive(Debug, Parser)]
#[command(name = "wayfare")]
#[command(about = "Wayfare Guide CLI")]
struct Cli {
    /// SQLite URL; falls back to an in-memory store when absent.
    #[arg(long, env = "WAYFARE_DATABASE_URL")]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive chat session.
    Chat {
        #[arg(long)]
        lat: Option<f64>,
        #[arg(long)]
        lon: Option<f64>,
    },
    /// Resolve a single message and print the outcome as JSON.
    Ask {
        message: String,
        #[arg(long)]
        lat: Option<f64>,
        #[arg(long)]
        lon: Option<f64>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Rank the whole catalog around a location.
    Nearest {
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lon: f64,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Import places (and optionally FAQs) from JSON files.
    Seed {
        #[arg(long)]
        places: PathBuf,
        #[arg(long)]
        faqs: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("wayfare_cli");
    let cli = Cli::parse();

    let store = build_store(cli.database_url.as_deref()).await?;
    let engine = GuideEngine::new(
        Arc::new(store.clone()),
        AppMetrics::shared(),
        engine_config_from_env(),
    );

    match cli.command {
        Command::Chat { lat, lon } => run_chat(engine, lat, lon).await?,
        Command::Ask {
            message,
            lat,
            lon,
            limit,
        } => {
            let outcome = engine
                .handle_message(MessageInput {
                    message,
                    latitude: lat,
                    longitude: lon,
                    limit,
                })
                .await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Nearest { lat, lon, limit } => {
            let outcome = engine.nearest(Some(lat), Some(lon), limit).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Seed { places, faqs } => {
            seed_places(&store, &places).await?;
            if let Some(faqs) = faqs {
                seed_faqs(&store, &faqs).await?;
            }
        }
    }

    Ok(())
}

async fn build_store(database_url: Option<&str>) -> Result<Store> {
    match database_url {
        Some(url) => Store::sqlite(url).await,
        None => Ok(Store::memory()),
    }
}

fn engine_config_from_env() -> EngineConfig {
    let defaults = EngineConfig::default();
    EngineConfig {
        faq_similarity_threshold: env::var("WAYFARE_FAQ_THRESHOLD")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.faq_similarity_threshold),
        cache_ttl_seconds: env::var("WAYFARE_CACHE_TTL_SECONDS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.cache_ttl_seconds),
    }
}

async fn run_chat(
    engine: GuideEngine<Store>,
    lat: Option<f64>,
    lon: Option<f64>,
) -> Result<()> {
    println!("Wayfare Guide chat mode. type 'exit' to quit.");

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message.is_empty() {
            continue;
        }

        let outcome = engine
            .handle_message(MessageInput {
                message: message.to_string(),
                latitude: lat,
                longitude: lon,
                limit: None,
            })
            .await;

        println!("\n{}\n", outcome.reply);
    }

    Ok(())
}

async fn seed_places(store: &Store, path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed reading places file {}", path.display()))?;
    let places: Vec<Place> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid places JSON in {}", path.display()))?;

    for place in places {
        let name = place.name.clone();
        if store.upsert_place(place).await? {
            println!("Added place: {}", name);
        } else {
            println!("Place already exists: {}", name);
        }
    }

    Ok(())
}

async fn seed_faqs(store: &Store, path: &Path) -> Result<()> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed reading FAQ file {}", path.display()))?;
    let faqs: Vec<FaqEntry> = serde_json::from_str(&raw)
        .with_context(|| format!("invalid FAQ JSON in {}", path.display()))?;

    for faq in faqs {
        let question = faq.question.clone();
        if store.upsert_faq(faq).await? {
            println!("Added FAQ: {}", question);
        } else {
            println!("FAQ already exists: {}", question);
        }
    }

    Ok(())
}
