// Main entry point for the Next Play Recovery API server

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nextplay_core::domains::auth::JwtService;
use nextplay_core::kernel::assistant::SafetyAssistant;
use nextplay_core::kernel::image_store::LocalImageStore;
use nextplay_core::kernel::mailer::LogMailer;
use nextplay_core::kernel::memory::memory_deps;
use nextplay_core::kernel::pg::{PgChildStore, PgInjuryStore, PgUserStore};
use nextplay_core::kernel::response_cache::ResponseCache;
use nextplay_core::kernel::ServerDeps;
use nextplay_core::server::build_app;
use nextplay_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,nextplay_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Next Play Recovery API");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    let deps = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(database_url)
                .await
                .context("Failed to connect to database")?;
            tracing::info!("Database connected");

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Migrations complete");

            Arc::new(ServerDeps {
                users: Arc::new(PgUserStore::new(pool.clone())),
                children: Arc::new(PgChildStore::new(pool.clone())),
                injuries: Arc::new(PgInjuryStore::new(pool)),
                mailer: Arc::new(LogMailer),
                images: Arc::new(LocalImageStore::new(
                    config.upload_dir.clone(),
                    config.app_base_url.clone(),
                )),
                assistant: Arc::new(SafetyAssistant),
                jwt: Arc::new(JwtService::new(&config.jwt_secret, config.jwt_issuer.clone())),
                chat_cache: Arc::new(ResponseCache::new(Duration::from_secs(24 * 60 * 60))),
                app_base_url: config.app_base_url.clone(),
                backend: "postgres",
            })
        }
        None => {
            tracing::warn!("DATABASE_URL not set; running on in-memory stores (demo mode)");
            let backend = memory_deps(
                &config.jwt_secret,
                &config.jwt_issuer,
                &config.app_base_url,
            );
            Arc::new(backend.deps)
        }
    };

    let app = build_app(
        deps,
        &config.allowed_origins,
        config.secure_cookies,
        &config.upload_dir,
    );

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
