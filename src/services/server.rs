use anyhow::Result;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use super::leaderboard::Leaderboard;
use super::shutdown::Shutdown;
use crate::api::handlers::AppState;
use crate::api::routes::create_router;

pub struct ServerService {
    port: u16,
    leaderboard: Arc<Leaderboard>,
    shutdown: Arc<Shutdown>,
}

impl ServerService {
    pub fn new(port: u16, leaderboard: Arc<Leaderboard>, shutdown: Arc<Shutdown>) -> Self {
        Self {
            port,
            leaderboard,
            shutdown,
        }
    }

    /// Serves the read API until the shutdown signal fires.
    pub async fn run(&self) -> Result<()> {
        let state = Arc::new(AppState {
            leaderboard: self.leaderboard.clone(),
        });

        let app = create_router(state).layer(CorsLayer::permissive());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let shutdown = self.shutdown.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await?;

        info!("Server stopped");
        Ok(())
    }
}
