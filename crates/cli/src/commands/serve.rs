//! `ragloop serve` — Start the HTTP chat server.

use std::path::Path;

use tracing::info;

pub async fn run(
    config_path: Option<&Path>,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config_path)?;

    if let Some(host) = host_override {
        config.gateway.host = host;
    }
    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    info!(
        host = %config.gateway.host,
        port = config.gateway.port,
        model = %config.llm.model,
        collection = %config.vector_store.collection,
        "Starting ragloop gateway"
    );

    ragloop_gateway::start(config).await?;

    Ok(())
}
