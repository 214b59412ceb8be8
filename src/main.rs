use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use neighborfit::config::{Settings, StoreKind};
use neighborfit::core::Matcher;
use neighborfit::routes::{self, AppState};
use neighborfit::services::{
    CandidateStore, MemoryStore, PostgresClient, SnapshotCache, StoreBackend, TokenVerifier,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str, format: &str) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.compact().init();
    }
}

fn config_error(e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
}

async fn build_backend(settings: &Settings) -> std::io::Result<StoreBackend> {
    match settings.store.backend {
        StoreKind::Postgres => {
            let db = &settings.database;
            let postgres = PostgresClient::from_settings(
                &db.url,
                db.max_connections,
                db.min_connections,
                db.acquire_timeout_secs,
                db.idle_timeout_secs,
            )
            .await
            .map_err(|e| {
                error!("Failed to connect to PostgreSQL: {}", e);
                config_error(e)
            })?;

            info!(
                "PostgreSQL client initialized (max: {} connections)",
                db.max_connections.unwrap_or(10)
            );
            Ok(StoreBackend::Postgres(postgres))
        }
        StoreKind::Memory => {
            let memory = match &settings.store.seed_path {
                Some(path) => MemoryStore::from_seed_file(path).map_err(|e| {
                    error!("Failed to load seed data from {}: {}", path, e);
                    config_error(e)
                })?,
                None => MemoryStore::new(),
            };
            Ok(StoreBackend::Memory(memory))
        }
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = Settings::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        config_error(e)
    })?;

    init_logging(&settings.logging.level, &settings.logging.format);

    info!("Starting NeighborFit matching service...");

    let backend = build_backend(&settings).await?;
    let cache = SnapshotCache::new(settings.cache.capacity, settings.cache.ttl_secs);
    let store = Arc::new(CandidateStore::new(backend, cache));

    info!(
        "Snapshot cache initialized (capacity: {} entries, TTL: {}s)",
        settings.cache.capacity, settings.cache.ttl_secs
    );

    let default_weights = settings.matching.default_weights().map_err(|e| {
        error!("Invalid matching settings: {}", e);
        config_error(e)
    })?;

    let matcher = Matcher::new(default_weights, settings.matching.max_results);

    info!(
        "Matcher initialized with default weights {:?}, max {} results",
        default_weights,
        matcher.max_results()
    );

    let app_state = AppState {
        store,
        matcher,
        verifier: TokenVerifier::new(&settings.auth.jwt_secret),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
