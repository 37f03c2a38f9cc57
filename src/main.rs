use clap::Parser;

use crefy_passport::bootstrap;
use crefy_passport::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is normal.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    bootstrap::tracing::init_tracing_subscriber()?;

    bootstrap::run(cli).await
}
