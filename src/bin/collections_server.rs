//! collections-server: request collection gRPC service
//!
//! Serves `CollectionService` and the standard gRPC health service.
//!
//! ## Configuration
//! - `config.yaml`, `--config <path>`, or COLLECTIONS_CONFIG: YAML config file
//! - COLLECTIONS__SERVER__HOST / COLLECTIONS__SERVER__PORT: bind address
//! - COLLECTIONS__STORAGE__TYPE: `sqlite` (default) or `postgres`
//! - COLLECTIONS_LOG: tracing filter (default `info`)

use std::net::SocketAddr;

use tonic::transport::Server;
use tonic_health::server::health_reporter;
use tracing::{error, info};

use collections::config::Config;
use collections::proto::collection_service_server::CollectionServiceServer;
use collections::services::CollectionService;
use collections::storage::init_storage;
use collections::transport::grpc_trace_layer;
use collections::utils::bootstrap::{init_tracing, parse_config_path, shutdown_signal};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config_path = parse_config_path();
    let config = Config::load(config_path.as_deref()).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!("Starting collections-server");

    let store = init_storage(&config.storage).await.map_err(|e| {
        error!("Failed to initialize storage: {}", e);
        e
    })?;
    info!(storage_type = ?config.storage.storage_type, "Storage initialized");

    let service = CollectionService::new(store);

    let (mut health_reporter, health_service) = health_reporter();
    health_reporter
        .set_serving::<CollectionServiceServer<CollectionService>>()
        .await;

    let addr: SocketAddr = config.server.addr().parse()?;
    info!(%addr, "collections-server listening");

    Server::builder()
        .layer(grpc_trace_layer())
        .add_service(health_service)
        .add_service(CollectionServiceServer::new(service))
        .serve_with_shutdown(addr, shutdown_signal())
        .await?;

    info!("collections-server stopped");
    Ok(())
}
