use clap::Parser;
use tameny::cli::{commands::{Cli, Commands}, run_cli};
use tameny::config::AppConfig;
use tameny::relay;
use tracing::{error, info};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if !matches!(cli.command, Commands::Relay) {
        run_cli(cli.command, cli.config).await;
        return Ok(());
    }

    info!("Starting Tameny push relay...");

    let config = match AppConfig::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    relay::serve(config).await
}
