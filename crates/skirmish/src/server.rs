//! `SkirmishServer` builder and entry point.
//!
//! This ties the layers together for one rule engine: a TCP listener, the
//! JSON codec, and a reactor hosting a single match.

use std::marker::PhantomData;
use std::net::SocketAddr;
use std::time::Instant;

use skirmish_match::{MatchConfig, RuleEngine};
use skirmish_protocol::JsonCodec;
use skirmish_session::ReliabilityConfig;
use skirmish_transport::{TcpConnection, TcpTransport, Transport, TransportOptions};
use tokio::sync::mpsc;

use crate::SkirmishError;
use crate::handler::InboundEvent;
use crate::reactor::Reactor;

/// Builder for configuring and starting a Skirmish server.
///
/// # Example
///
/// ```rust,ignore
/// use skirmish::prelude::*;
///
/// let server = SkirmishServer::<Duel>::builder()
///     .bind("0.0.0.0:8080")
///     .build(())
///     .await?;
/// server.run().await
/// ```
pub struct SkirmishServerBuilder<E: RuleEngine> {
    bind_addr: String,
    reliability: ReliabilityConfig,
    transport: TransportOptions,
    match_config: MatchConfig,
    engine: PhantomData<E>,
}

impl<E: RuleEngine> SkirmishServerBuilder<E> {
    /// Creates a builder with the engine's own match configuration.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            reliability: ReliabilityConfig::default(),
            transport: TransportOptions::default(),
            match_config: E::match_config(),
            engine: PhantomData,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets heartbeat, timeout and retry limits.
    pub fn reliability(mut self, config: ReliabilityConfig) -> Self {
        self.reliability = config;
        self
    }

    /// Sets the frame size limit and send timeout.
    pub fn transport_options(mut self, options: TransportOptions) -> Self {
        self.transport = options;
        self
    }

    /// Overrides the engine's match configuration.
    pub fn match_config(mut self, config: MatchConfig) -> Self {
        self.match_config = config;
        self
    }

    /// Binds the listener and creates the match.
    pub async fn build(self, engine_config: E::Config) -> Result<SkirmishServer<E>, SkirmishError> {
        let transport = TcpTransport::bind_with(&self.bind_addr, self.transport).await?;
        let (reactor, inbound) = Reactor::new(
            &engine_config,
            self.match_config,
            self.reliability,
            JsonCodec,
            Instant::now(),
        );
        Ok(SkirmishServer {
            transport,
            reactor,
            inbound,
        })
    }
}

impl<E: RuleEngine> Default for SkirmishServerBuilder<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Skirmish server hosting one match of `E`.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct SkirmishServer<E: RuleEngine> {
    transport: TcpTransport,
    reactor: Reactor<E, TcpConnection, JsonCodec>,
    inbound: mpsc::UnboundedReceiver<InboundEvent>,
}

impl<E: RuleEngine> SkirmishServer<E> {
    /// Creates a new builder.
    pub fn builder() -> SkirmishServerBuilder<E> {
        SkirmishServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, SkirmishError> {
        Ok(self.transport.local_addr()?)
    }

    /// Runs the server.
    ///
    /// Returns `Ok(())` when a match finishes under
    /// [`FinishPolicy::Halt`](skirmish_match::FinishPolicy::Halt). Engines
    /// that re-arm run until the process is terminated.
    pub async fn run(self) -> Result<(), SkirmishError> {
        match self.local_addr() {
            Ok(addr) => tracing::info!(%addr, "Skirmish server running"),
            Err(e) => tracing::warn!(error = %e, "Skirmish server running on unknown address"),
        }
        self.reactor.run(self.transport, self.inbound).await
    }
}
