use plotbridge::{init_logging, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    init_logging()?;

    let config = ServerConfig::from_env();
    tracing::info!(
        "plotbridge {} driving {}:{}",
        plotbridge::VERSION,
        config.device.host,
        config.device.port
    );

    plotbridge::serve(config).await
}
