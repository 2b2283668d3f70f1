mod brand;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::brand::BrandCommands;

#[derive(Debug, Parser)]
#[command(name = "companydb-cli")]
#[command(about = "companydb operator command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Check database connectivity
    Ping,
    /// Inspect and reconcile brands
    Brand {
        #[command(subcommand)]
        command: BrandCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("companydb-cli: pass --help to list commands");
        return Ok(());
    };

    let config = companydb_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let pool_config = companydb_db::PoolConfig::from_app_config(&config);
    let pool = companydb_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Migrate => {
            let applied = companydb_db::run_migrations(&pool).await?;
            println!("migrations applied: {applied}");
        }
        Commands::Ping => {
            companydb_db::ping(&pool).await?;
            println!("database ok");
        }
        Commands::Brand { command } => brand::run(&pool, command).await?,
    }

    Ok(())
}
