use assetsync_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let (_state, router, databases) = assetsync_api::setup::initialize_app(&config).await?;

    let served = assetsync_api::setup::server::start_server(&config, router).await;

    databases.shutdown().await;
    tracing::info!("Shutdown complete");
    assetsync_api::telemetry::shutdown_tracing();

    served
}
