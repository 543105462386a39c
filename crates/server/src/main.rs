use clap::Parser;
use tracing::info;

use usquest_server::cli::{CliArgs, Command};
use usquest_server::{build_router, scheduler, startup};

fn load_config() -> usquest_core::Config {
    usquest_core::config::load_dotenv();
    usquest_core::Config::from_env()
}

async fn serve(config: &usquest_core::Config) -> anyhow::Result<()> {
    config.log_summary();

    let state = startup::build_app_state(config).await?;
    scheduler::spawn_quest_schedulers(state.clone(), &config.cron)?;

    let app = build_router(state, &config.server.cors_origin);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn trigger(config: &usquest_core::Config, frequency: usquest_core::Frequency) -> anyhow::Result<()> {
    let state = startup::build_app_state(config).await?;
    let report = state.cycle.run(frequency).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    let args = CliArgs::parse();
    let config = load_config();

    match args.command() {
        Command::Serve => serve(&config).await,
        Command::Trigger { frequency } => trigger(&config, frequency).await,
    }
}
