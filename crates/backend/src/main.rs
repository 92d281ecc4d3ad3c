pub mod dashboards;
pub mod domain;
pub mod handlers;
pub mod routes;
pub mod shared;
pub mod system;
pub mod usecases;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    use axum::http::{header, Method};
    use axum::middleware;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;
    use tower_http::cors::{Any, CorsLayer};

    use crate::shared::app_state::AppState;
    use crate::shared::config::{load_config, Credentials};
    use crate::system::tasks::worker::SyncScheduler;

    system::tracing::initialize()?;

    let config = load_config()?;
    let credentials = Credentials::from_env();
    if let Err(missing) = credentials.require_sync() {
        tracing::warn!("Sync disabled until configured: {}", missing);
    }

    let port = config.server.port;
    let state = AppState::new(config, credentials)?;

    if state.config.scheduler.enabled {
        let scheduler = SyncScheduler::new(state.executor.clone(), &state.config.scheduler.cron)?;
        tokio::spawn(async move {
            scheduler.run_loop().await;
        });
    } else {
        tracing::info!("Internal sync scheduler disabled");
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION]);

    let app = routes::configure_routes(state)
        .layer(middleware::from_fn(
            system::middleware::request_logger::request_logger,
        ))
        .layer(cors);

    let addr: SocketAddr = ([0, 0, 0, 0], port).into();

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    port
                );
            } else {
                tracing::error!("Failed to bind to port {}. Error: {}", port, e);
            }
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
