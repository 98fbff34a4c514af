//! Axum-based read API server.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tracing::info;

use stakeindex_store::stake::StakeStore;
use stakeindex_store::wallet::WalletStore;

use crate::error::RpcError;
use crate::handlers;

/// Shared read-only store handles for the request handlers.
pub struct ReadState {
    pub wallets: Arc<dyn WalletStore + Send + Sync>,
    pub stakes: Arc<dyn StakeStore + Send + Sync>,
}

/// Build the API router. Exposed separately from [`RpcServer`] so tests can
/// drive it without binding a socket.
pub fn router(state: Arc<ReadState>) -> Router {
    Router::new()
        .route("/wallet/:address", get(handlers::get_wallet))
        .route("/wallet/:address/stakes", get(handlers::get_wallet_stakes))
        .route("/summary", get(handlers::get_summary))
        .with_state(state)
}

/// The read API server, configured with a port and shared state.
pub struct RpcServer {
    port: u16,
    state: Arc<ReadState>,
}

impl RpcServer {
    pub fn new(port: u16, state: Arc<ReadState>) -> Self {
        Self { port, state }
    }

    /// Bind and serve until the process exits.
    pub async fn start(self) -> Result<(), RpcError> {
        let app = router(self.state);
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", self.port))
            .await
            .map_err(|e| RpcError::Server(e.to_string()))?;
        info!(port = self.port, "read API listening");
        axum::serve(listener, app)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}
