mod commands;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "flyerdb-cli")]
#[command(about = "FlyerDB command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the full scrape pipeline and ingest the results
    Scrape {
        /// Restrict the run to a single store (by key)
        #[arg(long)]
        store: Option<String>,

        /// Print the flyers a run would fetch, without downloading anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Re-run flyer analysis over page images already on disk
    Analyze {
        /// Restrict analysis to a single store (by key)
        #[arg(long)]
        store: Option<String>,
    },
    /// Ingest existing artifact files into the database
    Import,
    /// Show the current promotion set
    Promotions,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = flyerdb_core::load_app_config()?;

    match cli.command {
        Commands::Scrape { store, dry_run } => {
            if dry_run {
                commands::run_scrape_dry_run(&config, store.as_deref()).await
            } else {
                let pool = connect(&config).await?;
                commands::run_scrape(&pool, &config, store.as_deref()).await
            }
        }
        Commands::Analyze { store } => commands::run_analyze(&config, store.as_deref()).await,
        Commands::Import => {
            let pool = connect(&config).await?;
            commands::run_import(&pool, &config.artifacts_dir).await
        }
        Commands::Promotions => {
            let pool = connect(&config).await?;
            commands::run_promotions(&pool, &config).await
        }
    }
}

/// Connect the pool and apply any pending migrations, so every command works
/// against a fresh database.
async fn connect(config: &flyerdb_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = flyerdb_db::PoolConfig::from_app_config(config);
    let pool = flyerdb_db::connect_pool(&config.database_url, pool_config).await?;
    let applied = flyerdb_db::run_migrations(&pool).await?;
    if applied > 0 {
        tracing::info!(applied, "applied pending migrations");
    }
    Ok(pool)
}
