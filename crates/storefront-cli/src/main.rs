mod import;
mod orders;

use clap::{Parser, Subcommand};
use storefront_core::DatastoreKind;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "storefront-cli")]
#[command(about = "Storefront operations command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending Postgres migrations
    Migrate,
    /// Copy the product API and supplemental catalog into the datastore
    ImportProducts {
        /// Print what would be written without touching the datastore
        #[arg(long)]
        dry_run: bool,
    },
    /// Print orders, newest first
    Orders {
        /// Only orders placed by this user id
        #[arg(long)]
        user: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("storefront-cli ready; run with --help for commands");
        return Ok(());
    };

    let config = storefront_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match command {
        Commands::Migrate => run_migrate(&config).await,
        Commands::ImportProducts { dry_run } => {
            let store = storefront_db::open_datastore(&config).await?;
            import::run_import_products(&config, store.as_ref(), dry_run).await
        }
        Commands::Orders { user } => {
            let store = storefront_db::open_datastore(&config).await?;
            orders::run_list_orders(store.as_ref(), user.as_deref()).await
        }
    }
}

async fn run_migrate(config: &storefront_core::AppConfig) -> anyhow::Result<()> {
    let DatastoreKind::Postgres { database_url } = &config.datastore else {
        anyhow::bail!(
            "migrate only applies to the postgres datastore (STOREFRONT_DATASTORE={})",
            config.datastore.name()
        );
    };

    let pool_config = storefront_db::PoolConfig::from_app_config(config);
    let pool = storefront_db::connect_pool(database_url, pool_config).await?;
    let applied = storefront_db::run_migrations(&pool).await?;
    println!("applied {applied} migration(s)");
    Ok(())
}
