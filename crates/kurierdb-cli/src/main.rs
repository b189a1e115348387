use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod harvest;

#[derive(Debug, Parser)]
#[command(name = "kurierdb")]
#[command(about = "Harvests courier jobs off the dispatch website into a local store")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch, extract, normalize, and archive a range of days.
    Harvest {
        /// First day of the range (YYYY-MM-DD).
        #[arg(long)]
        since: NaiveDate,
        /// Last day of the range, inclusive. Defaults to SINCE.
        #[arg(long)]
        until: Option<NaiveDate>,
        /// Serve everything from the local cache; never touch the network.
        #[arg(long)]
        offline: bool,
    },
    /// Open the database and apply pending migrations, nothing else.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = kurierdb_core::load_app_config_from_env()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Harvest {
            since,
            until,
            offline,
        } => {
            let until = until.unwrap_or(since);
            anyhow::ensure!(since <= until, "--since must not be after --until");
            harvest::run(&config, since, until, offline).await
        }
        Commands::Migrate => {
            kurierdb_db::connect(&config.database_url).await?;
            println!("database is up to date");
            Ok(())
        }
    }
}
