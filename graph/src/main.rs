use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use clap::{Parser, Subcommand};
use germplasm_config::AppConfig;
use germplasm_observability::{init_tracing_for, DomainEvent, EventCategory};
use std::path::PathBuf;
use std::sync::Arc;

use wheat_graph::graph_db::{GraphStore, InMemoryGraphStore, Neo4jClient, UnavailableStore};
use wheat_graph::ingestion::{read_csv_path, IngestionPipeline};
use wheat_graph::llm::OpenAiClient;
use wheat_graph::{handlers, AppState, SERVICE_NAME};

#[derive(Parser)]
#[command(name = "wheat-graph", version, about = "Wheat germplasm knowledge graph service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (default)
    Serve,
    /// Load a crawler CSV export into the graph
    Ingest {
        /// CSV file with a header row
        csv: PathBuf,
        /// Run against an in-memory store and print the report without writing
        #[arg(long)]
        dry_run: bool,
    },
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing_for(SERVICE_NAME);
    let config = AppConfig::from_env();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Ingest { csv, dry_run } => ingest(config, csv, dry_run).await,
    }
}

async fn ingest(config: AppConfig, csv: PathBuf, dry_run: bool) -> anyhow::Result<()> {
    let table = read_csv_path(&csv).with_context(|| format!("reading {}", csv.display()))?;

    let store: Arc<dyn GraphStore> = if dry_run {
        tracing::info!("🧪 Dry run: writing to an in-memory store");
        Arc::new(InMemoryGraphStore::new())
    } else {
        Arc::new(
            Neo4jClient::connect(&config.neo4j)
                .await
                .context("connecting to Neo4j")?,
        )
    };

    let report = IngestionPipeline::new(store).ingest_table(table).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let store: Arc<dyn GraphStore> = match Neo4jClient::connect(&config.neo4j).await {
        Ok(client) => {
            if client.is_aura() {
                tracing::info!("☁️ Using Neo4j AuraDB at {}", client.uri());
            }
            DomainEvent::new(SERVICE_NAME, EventCategory::System, "store.connected")
                .metadata(serde_json::json!({ "aura": client.is_aura() }))
                .emit();
            Arc::new(client)
        }
        Err(e) => {
            tracing::error!("Failed to connect to Neo4j: {}", e);
            tracing::warn!("Graph operations will report the store as unavailable");
            DomainEvent::new(SERVICE_NAME, EventCategory::System, "store.connected")
                .failure(e.to_string())
                .emit();
            Arc::new(UnavailableStore::new(e.to_string()))
        }
    };

    let llm = Arc::new(OpenAiClient::new(&config.llm).context("building LLM client")?);
    tracing::info!("🤖 Questions answered by {}", llm.model());

    let state = web::Data::new(AppState::new(store, llm, config.limits));
    let bind = (config.server.host.clone(), config.server.port);

    tracing::info!("🚀 [Graph Service] Starting on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header();

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .configure(handlers::configure)
    })
    .bind(bind)?
    .run()
    .await?;

    Ok(())
}
