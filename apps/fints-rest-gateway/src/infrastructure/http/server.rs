//! Gateway HTTP server.
//!
//! Binds the listener up front so the bound address is known before serving,
//! then serves until the cancellation token fires. In-flight requests finish
//! before `run` returns.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Gateway server errors.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Failed to bind the listener.
    #[error("failed to bind to {0}: {1}")]
    BindFailed(SocketAddr, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

/// Bound gateway listener plus its router.
pub struct GatewayServer {
    listener: TcpListener,
    router: Router,
    cancel: CancellationToken,
}

impl GatewayServer {
    /// Bind `addr`.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::BindFailed` if the address is unavailable.
    pub async fn bind(
        addr: SocketAddr,
        router: Router,
        cancel: CancellationToken,
    ) -> Result<Self, ServerError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindFailed(addr, e.to_string()))?;

        Ok(Self {
            listener,
            router,
            cancel,
        })
    }

    /// Address actually bound (resolves port 0).
    ///
    /// # Errors
    ///
    /// Returns an error if the socket address cannot be read.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener
            .local_addr()
            .map_err(|e| ServerError::ServerFailed(e.to_string()))
    }

    /// Serve until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `ServerError::ServerFailed` if the server hits a fatal error.
    pub async fn run(self) -> Result<(), ServerError> {
        if let Ok(addr) = self.listener.local_addr() {
            tracing::info!(%addr, "Gateway listening");
        }

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| ServerError::ServerFailed(e.to_string()))?;

        tracing::info!("Gateway stopped");
        Ok(())
    }
}
