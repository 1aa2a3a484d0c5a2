use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use db_pool::{create_pool, DbConfig};
use posts_service::cache::PageCache;
use posts_service::config::{Config, StoreBackend};
use posts_service::db::{MemoryStore, PostgresStore, Store};
use posts_service::middleware::{IdentityMiddleware, JwtKeys};
use posts_service::{routes, AppState};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());

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

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn Store>> {
    match config.database.backend {
        StoreBackend::Memory => {
            warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let db_config = DbConfig {
                service_name: "posts-service".to_string(),
                database_url: config.database.url.clone(),
                max_connections: config.database.max_connections,
                ..DbConfig::default()
            };
            db_config.log_config();

            let pool = create_pool(db_config)
                .await
                .context("Failed to create database pool")?;

            if config.database.run_migrations {
                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("Failed to run database migrations")?;
                info!("Database migrations completed");
            }

            Ok(Arc::new(PostgresStore::new(pool)))
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        env = %config.app.env,
        backend = ?config.database.backend,
        posts_per_page = config.posts.per_page,
        index_cache_ttl_secs = config.cache.index_ttl_secs,
        "Starting posts-service"
    );
    if config.uses_development_secret() {
        warn!("JWT_SECRET is not set; using the insecure development secret");
    }

    let store = build_store(&config).await?;
    let page_cache = Arc::new(PageCache::new(Duration::from_secs(
        config.cache.index_ttl_secs,
    )));
    let state = web::Data::new(AppState::new(store, page_cache, config.settings()));
    let keys = Arc::new(JwtKeys::new(&config.auth.jwt_secret));

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    info!("Listening on {}", bind_address);

    let allowed_origins = config.cors.allowed_origins.clone();
    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(IdentityMiddleware::new(keys.clone()))
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(routes::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run()
    .await
    .context("HTTP server error")?;

    info!("posts-service stopped");
    Ok(())
}
