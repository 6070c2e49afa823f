use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use storefront::{
    config::{database, settings},
    core::{cart, catalog},
    errors::Result,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "storefront", about = "Storefront maintenance CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create the tables and seed the catalog from config.toml
    Init,
    /// Delete carts with no activity within the retention window
    ExpireCarts {
        /// Retention window in days, defaults to the configured session cookie lifetime
        #[arg(long)]
        days: Option<i64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, env vars can also be set externally
    dotenv().ok();
    let cli = Cli::parse();

    // 3. Load the store configuration
    let app_config = settings::load_app_configuration()?;

    // 4. Connect and make sure the schema exists
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;
    info!("Database initialized successfully.");

    match cli.command {
        Commands::Init => {
            let inserted = catalog::seed_products(&db, &app_config.products).await?;
            info!("Catalog ready, {} new products.", inserted);
        }
        Commands::ExpireCarts { days } => {
            let days = days.unwrap_or(app_config.store.session_cookie_days);
            let report = cart::expire_stale_carts(&db, days)
                .await
                .inspect_err(|e| error!("Cart expiry failed: {}", e))?;
            info!(
                "Expired {} carts ({} lines) idle since before {}",
                report.carts_removed(),
                report.items_removed,
                report.cutoff
            );
        }
    }

    Ok(())
}
