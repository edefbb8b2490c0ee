use anyhow::Result;
use clap::Parser;
use personal_site::{config::Config, init_logging, start_server};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = Config::parse();
    start_server(config).await
}
