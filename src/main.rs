use actix_cors::Cors;
use actix_web::{web, App, HttpServer, middleware};
use bloodlink::config::{Settings, WhatsAppMode};
use bloodlink::core::DonorMatcher;
use bloodlink::routes::{self, AppState};
use bloodlink::services::{
    Dispatcher, DonorRegistry, InMemoryStore, PostgresClient, RequestStore, WhatsAppClient,
};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let filter = EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

fn build_whatsapp(settings: &Settings) -> WhatsAppClient {
    let notifications = &settings.notifications;
    if notifications.whatsapp_mode == WhatsAppMode::Log {
        return WhatsAppClient::log_only();
    }

    let Some(credentials) = notifications.twilio.as_ref().and_then(|t| t.credentials()) else {
        warn!("whatsapp_mode = twilio but Twilio sid, token or sender is missing, WhatsApp will be log only");
        return WhatsAppClient::log_only();
    };

    match WhatsAppClient::twilio(credentials) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to build Twilio client ({}), WhatsApp will be log only", e);
            WhatsAppClient::log_only()
        }
    }
}

async fn seed_donors(store: &InMemoryStore, path: &str) -> std::io::Result<()> {
    let json = std::fs::read_to_string(path)?;
    let count = store.load_donors_json(&json).await.map_err(|e| {
        error!("Invalid donor seed file {}: {}", path, e);
        std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
    })?;
    info!("Seeded {} donors from {}", count, path);
    Ok(())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    init_logging();

    info!("Starting BloodLink service...");

    let settings = Settings::load().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    info!("Configuration loaded successfully");

    let (registry, store): (Arc<dyn DonorRegistry>, Arc<dyn RequestStore>) =
        match settings.database.url.as_deref() {
            Some(url) => {
                let db = &settings.database;
                let postgres = PostgresClient::from_settings(
                    url,
                    db.max_connections,
                    db.min_connections,
                    db.acquire_timeout_secs,
                    db.idle_timeout_secs,
                )
                .await
                .map_err(|e| {
                    error!("Failed to connect to PostgreSQL: {}", e);
                    std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
                })?;

                info!("PostgreSQL client initialized (max: {} connections)", db.max_connections.unwrap_or(10));
                let postgres = Arc::new(postgres);
                let registry: Arc<dyn DonorRegistry> = postgres.clone();
                let store: Arc<dyn RequestStore> = postgres;
                (registry, store)
            }
            None => {
                warn!("No database configured, using the in-memory store");
                let memory = Arc::new(InMemoryStore::new());
                if let Some(path) = settings.database.seed_donors_path.as_deref() {
                    seed_donors(&memory, path).await?;
                }
                let registry: Arc<dyn DonorRegistry> = memory.clone();
                let store: Arc<dyn RequestStore> = memory;
                (registry, store)
            }
        };

    let whatsapp = build_whatsapp(&settings);
    info!("WhatsApp delivery: {}", if whatsapp.is_live() { "twilio" } else { "log only" });

    let dispatcher = Arc::new(Dispatcher::new(store.clone(), whatsapp));

    let matcher = DonorMatcher::new(settings.matching);
    info!("Matcher initialized with settings: {:?}", matcher.settings());

    let app_state = AppState {
        registry,
        store,
        dispatcher,
        matcher,
        jwt_secret: Arc::from(settings.auth.jwt_secret.as_str()),
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
