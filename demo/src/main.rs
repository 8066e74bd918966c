use clap::Parser;
use demo::{DemoEndpoint, DemoResult};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Create an item on the mock server and print the listing.
#[derive(Debug, Parser)]
#[command(name = "demo", version)]
struct Cli {
    /// Base URL of the items API
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    base_url: String,

    /// Name of the item to create
    #[arg(long, default_value = "demo item")]
    name: String,
}

#[tokio::main]
async fn main() -> DemoResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let endpoint = DemoEndpoint::new(cli.base_url)?;

    let created = endpoint.create_item(&cli.name).await?;
    info!(id = created.id, name = %created.name, "created");

    for item in endpoint.list_items().await? {
        println!("{}\t{}", item.id, item.name);
    }
    Ok(())
}
