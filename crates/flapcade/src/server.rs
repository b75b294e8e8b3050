//! `FlapcadeServer` builder and server loop.
//!
//! This is the entry point for running a Flapcade arcade. It ties together
//! the layers: transport → protocol → session.

use std::sync::Arc;

use flapcade_session::PaymentGate;
use flapcade_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::{ArcadeService, FlapcadeError, ServerConfig};

/// Builder for configuring and starting a Flapcade server.
///
/// # Example
///
/// ```rust,no_run
/// use flapcade::prelude::*;
///
/// # async fn run() -> Result<(), FlapcadeError> {
/// let server = FlapcadeServerBuilder::new()
///     .config(ServerConfig::default().pay_to("0xarcade"))
///     .bind("0.0.0.0", 3001)
///     .build(DevPaymentGate::new())
///     .await?;
/// server.run().await
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct FlapcadeServerBuilder {
    config: ServerConfig,
}

impl FlapcadeServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Overrides the listen address.
    pub fn bind(mut self, host: impl Into<String>, port: u16) -> Self {
        self.config = self.config.bind(host, port);
        self
    }

    /// Validates the configuration and binds the listener.
    ///
    /// # Errors
    /// [`FlapcadeError::Config`] for a missing payee address,
    /// [`FlapcadeError::Transport`] if the address can't be bound.
    pub async fn build<G: PaymentGate>(self, gate: G) -> Result<FlapcadeServer<G>, FlapcadeError> {
        self.config.validate()?;
        let transport = WebSocketTransport::bind(&self.config.bind_addr()).await?;

        tracing::info!(
            addr = %self.config.bind_addr(),
            network = %self.config.network,
            pay_to = %self.config.pay_to,
            game_price = %self.config.game_price,
            continue_price = %self.config.continue_price,
            "arcade configured"
        );

        Ok(FlapcadeServer {
            transport,
            service: Arc::new(ArcadeService::new(self.config, gate)),
        })
    }
}

/// A bound Flapcade server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct FlapcadeServer<G> {
    transport: WebSocketTransport,
    service: Arc<ArcadeService<G>>,
}

impl<G: PaymentGate> FlapcadeServer<G> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// The shared service, for inspecting the registry.
    pub fn service(&self) -> &Arc<ArcadeService<G>> {
        &self.service
    }

    /// Runs the accept loop.
    ///
    /// Spawns a handler task per connection. Runs until the process is
    /// terminated.
    pub async fn run(mut self) -> Result<(), FlapcadeError> {
        tracing::info!("Flapcade server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let service = Arc::clone(&self.service);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, service).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
