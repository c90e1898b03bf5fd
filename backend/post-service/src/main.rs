use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use post_service::config::{Config, StorageBackend};
use post_service::handlers;
use post_service::services::PostService;
use post_service::storage::{
    DynamoRecordStore, InMemoryObjectStore, InMemoryRecordStore, ObjectStore, RecordStore,
    S3ObjectStore,
};
use s3_utils::S3Client;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
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
}

async fn build_stores(
    config: &Config,
) -> anyhow::Result<(Arc<dyn RecordStore>, Arc<dyn ObjectStore>)> {
    match config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; posts are lost on restart");
            Ok((
                Arc::new(InMemoryRecordStore::new()),
                Arc::new(InMemoryObjectStore::new(config.s3.bucket.clone())),
            ))
        }
        StorageBackend::Aws => {
            let records = DynamoRecordStore::connect(&config.dynamodb).await;
            if let Err(e) = records.health_check().await {
                tracing::warn!(table = %config.dynamodb.table_name, "DynamoDB not reachable yet: {}", e);
            }

            let s3 = S3Client::with_config(config.s3.clone()).await;
            if let Err(e) = s3.health_check().await {
                tracing::warn!(bucket = %config.s3.bucket, "S3 bucket not reachable yet: {}", e);
            }

            Ok((Arc::new(records), Arc::new(S3ObjectStore::new(&s3))))
        }
    }
}

/// Post Service
///
/// # Routes
///
/// - `GET /` - health check
/// - `GET|POST /posts` - list, create
/// - `GET|PUT|DELETE /posts/{id}` - read, update, delete
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting post-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!(
        backend = ?config.storage,
        table = %config.dynamodb.table_name,
        bucket = %config.s3.bucket,
        "Storage configured"
    );

    let (records, objects) = build_stores(&config)
        .await
        .context("failed to initialize storage")?;

    let service = web::Data::new(PostService::new(records, objects));
    let uploads = web::Data::new(config.uploads.clone());

    let bind_address = config.app.bind_address();
    tracing::info!("Starting HTTP server at {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(uploads.clone())
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("failed to bind {}", bind_address))?
    .workers(config.app.workers)
    .run()
    .await
    .context("HTTP server error")?;

    tracing::info!("Post-service shutting down");
    Ok(())
}
