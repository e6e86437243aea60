use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinSet;

use kvgate_server::config::Config;
use kvgate_server::metrics::Metrics;
use kvgate_server::store;
use kvgate_server::transport::{Transport, http::HttpTransport};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse configuration from environment variables and CLI arguments
    let config = Config::from_env_and_args()?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(format!("kvgate={}", config.log_level).parse()?)
                .add_directive(format!("kvgate_server={}", config.log_level).parse()?),
        )
        .init();

    let service = Arc::new(store::create_service(&config));
    let metrics = Arc::new(Metrics::new());

    let mut transport_tasks = JoinSet::new();

    {
        let transport = HttpTransport::new(&config.http.host, config.http.port, config.enable_list)?;
        let service = Arc::clone(&service);
        let metrics = Arc::clone(&metrics);
        let host = config.http.host.clone();
        let port = config.http.port;

        transport_tasks.spawn(async move {
            tracing::info!("Starting HTTP transport on {}:{}", host, port);
            transport.start(service, metrics).await
        });
    }

    tracing::info!(
        "kvgate server started with store type: {:?}",
        config.store.store_type
    );
    tracing::info!(
        "Store capacity: {}, Shards: {}",
        config.store.capacity,
        config.store.shards
    );
    if service.admission().config().is_enabled() {
        tracing::info!(
            "Admission control: {} requests per {}ms",
            config.admission.max_per_window,
            config.admission.window_ms
        );
    } else {
        tracing::info!("Admission control disabled");
    }
    tracing::info!(
        "Bulk listing: {}",
        if config.enable_list { "enabled" } else { "disabled" }
    );

    // Wait for the transport task to complete (it runs indefinitely)
    while let Some(result) = transport_tasks.join_next().await {
        match result {
            Ok(Ok(())) => {
                tracing::info!("Transport task completed successfully");
            }
            Ok(Err(e)) => {
                tracing::error!("Transport task failed: {:#}", e);
                return Err(e);
            }
            Err(e) => {
                tracing::error!("Transport task panicked: {}", e);
                return Err(anyhow::anyhow!("Transport task panicked"));
            }
        }
    }

    Ok(())
}
