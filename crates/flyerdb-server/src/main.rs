mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

use flyerdb_ai::OpenAiClient;
use flyerdb_pipeline::{PipelineConfig, PipelineDeps};
use flyerdb_scraper::{ImageDownloader, RenderClient};
use flyerdb_shopping::RecipeCache;

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = flyerdb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = flyerdb_db::PoolConfig::from_app_config(&config);
    let pool = flyerdb_db::connect_pool(&config.database_url, pool_config).await?;
    flyerdb_db::run_migrations(&pool).await?;

    let stores = flyerdb_core::stores::load_stores(&config.stores_path)?;
    tracing::info!(stores = stores.stores.len(), "store allowlist loaded");

    let deps = Arc::new(PipelineDeps {
        render: RenderClient::new(
            &config.render_url,
            config.render_token.as_deref(),
            config.render_timeout_secs,
        )?,
        downloader: ImageDownloader::new(config.download_timeout_secs)?,
        ai: OpenAiClient::with_base_url(
            &config.openai_api_key,
            config.ai_timeout_secs,
            &config.openai_base_url,
        )?,
    });
    let pipeline = Arc::new(PipelineConfig {
        flyer_index_url: config.flyer_index_url.clone(),
        image_dir: config.image_dir.clone(),
        artifacts_dir: config.artifacts_dir.clone(),
        pages_per_store: config.pages_per_store,
        stores,
    });

    let state = AppState {
        pool,
        deps,
        pipeline,
        recipes: RecipeCache::new(),
        scrape_guard: Arc::new(Mutex::new(())),
    };

    let _scheduler = scheduler::build_scheduler(state.clone()).await?;

    let app = build_app(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
