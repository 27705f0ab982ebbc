use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

mod classify;
mod ingestion;
mod init;
mod maintenance;
mod policy;
mod sources;
mod telemetry;
mod util;
mod videos;

#[cfg(test)]
mod test_support;

#[derive(Parser)]
#[command(name = "harvest", about = "Scheduled RSS and YouTube harvester for the newsletter")]
struct Cli {
    #[arg(global = true, short, long, env = "DATABASE_URL", default_value = "sqlite://newsletter.db?mode=rwc")]
    dsn: String,
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and apply migrations
    Init(init::InitCmd),
    /// Harvest recent articles from RSS/Atom sources
    Rss(ingestion::RssCmd),
    /// Harvest recent videos from YouTube channels
    Videos(videos::VideosCmd),
    /// Delete all articles and compact the database
    Housekeeping(maintenance::housekeeping::HousekeepingCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // logs go to stderr. Respect RUST_LOG and HARVEST_LOG_FORMAT
    telemetry::config::init_tracing();

    let pool = init::connect(&cli.dsn).await?;

    match cli.command {
        Commands::Init(args) => init::run(&pool, args).await?,
        Commands::Rss(args) => ingestion::run(&pool, args).await?,
        Commands::Videos(args) => videos::run(&pool, args).await?,
        Commands::Housekeeping(args) => maintenance::housekeeping::run(&pool, args).await?,
    }

    Ok(())
}
