//! WebSocket bridge.
//!
//! Owns the socket listener, accepts connections, parses inbound
//! messages, dispatches to the [`ServiceRouter`], and relays
//! results/errors/stream chunks back on the same connection.
//!
//! Each inbound message is handled in its own task, so requests on one
//! connection interleave freely; all of a connection's handlers share a
//! single bounded writer channel, which keeps a stream's chunks in
//! production order while letting responses to distinct correlation ids
//! interleave on the wire in any order.
//!
//! In mock mode the backend is never invoked; requests are answered with
//! deterministic literal output derived from the resolved model and the
//! prompt.

use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::router::ServiceRouter;
use crate::telemetry;
use crate::{BifrostError, Result};

pub mod protocol;

pub use protocol::{Envelope, Operation, Outbound};

/// Outbound envelopes buffered per connection before the socket write.
///
/// Bounded so a slow client applies backpressure to its own stream
/// relays instead of growing unbounded memory.
const OUTBOUND_BUFFER: usize = 64;

/// The WebSocket listener plus everything a connection handler needs.
pub struct Bridge {
    listener: TcpListener,
    router: Arc<ServiceRouter>,
    mock: bool,
    shutdown: watch::Sender<bool>,
}

/// Cloneable handle for stopping a running [`Bridge`].
#[derive(Clone)]
pub struct BridgeHandle {
    shutdown: watch::Sender<bool>,
}

impl BridgeHandle {
    /// Stop accepting new connections. Idempotent: signalling an
    /// already-stopped bridge performs nothing.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }
}

impl Bridge {
    /// Bind the bridge listener. Failure to bind is the one fatal error
    /// of the subsystem; everything after this point is per-connection.
    pub async fn bind(config: &Config, router: Arc<ServiceRouter>) -> Result<Self> {
        let address = &config.server.bridge_address;
        let listener = TcpListener::bind(address).await.map_err(|e| {
            BifrostError::Configuration(format!("failed to bind bridge to {address}: {e}"))
        })?;
        let (shutdown, _) = watch::channel(false);
        Ok(Self {
            listener,
            router,
            mock: config.mock,
            shutdown,
        })
    }

    /// The address the listener actually bound (useful with port 0).
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .map_err(|e| BifrostError::Configuration(e.to_string()))
    }

    /// A handle that can stop this bridge from another task.
    pub fn handle(&self) -> BridgeHandle {
        BridgeHandle {
            shutdown: self.shutdown.clone(),
        }
    }

    /// Accept connections until shutdown is signalled.
    ///
    /// Resolves once the listener stops accepting; connections already
    /// established run to their own completion in their own tasks.
    pub async fn run(self) -> Result<()> {
        if let Ok(address) = self.local_addr() {
            info!(%address, mock = self.mock, "bridge listening");
        }
        let mut shutdown = self.shutdown.subscribe();
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok((stream, peer)) => {
                            metrics::counter!(telemetry::CONNECTIONS_TOTAL).increment(1);
                            let router = Arc::clone(&self.router);
                            let mock = self.mock;
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, peer, router, mock).await {
                                    debug!(%peer, error = %e, "connection ended with error");
                                }
                            });
                        }
                        Err(e) => warn!(error = %e, "accept failed"),
                    }
                }
                _ = shutdown.wait_for(|stopped| *stopped) => {
                    info!("bridge shutting down");
                    break;
                }
            }
        }
        Ok(())
    }
}

/// Serve one WebSocket connection until the peer closes it.
async fn handle_connection(
    stream: TcpStream,
    peer: SocketAddr,
    router: Arc<ServiceRouter>,
    mock: bool,
) -> Result<()> {
    let ws = accept_async(stream)
        .await
        .map_err(|e| BifrostError::Http(e.to_string()))?;
    info!(%peer, "connection opened");

    let (mut sink, mut source) = ws.split();
    let (tx, mut rx) = mpsc::channel::<Outbound>(OUTBOUND_BUFFER);

    // Single writer owns the sink; concurrent handlers enqueue envelopes.
    let writer = tokio::spawn(async move {
        while let Some(envelope) = rx.recv().await {
            if sink.send(WsMessage::Text(envelope.to_json())).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
    });

    while let Some(message) = source.next().await {
        match message {
            Ok(WsMessage::Text(text)) => {
                let router = Arc::clone(&router);
                let tx = tx.clone();
                tokio::spawn(async move {
                    dispatch(&text, router, mock, tx).await;
                });
            }
            Ok(WsMessage::Close(_)) => break,
            Ok(_) => {} // binary/ping/pong: nothing to do
            Err(e) => {
                debug!(%peer, error = %e, "transport error");
                break;
            }
        }
    }

    // Writer drains once every in-flight handler drops its sender.
    drop(tx);
    let _ = writer.await;
    info!(%peer, "connection closed");
    Ok(())
}

/// Handle one inbound message: parse, process, and on failure convert
/// the error into an error envelope. Never propagates; failure of one
/// message leaves the connection open for the next.
async fn dispatch(text: &str, router: Arc<ServiceRouter>, mock: bool, tx: mpsc::Sender<Outbound>) {
    let envelope = match protocol::parse(text) {
        Ok(envelope) => envelope,
        Err(reply) => {
            let _ = tx.send(reply).await;
            return;
        }
    };

    let operation = envelope.operation;
    let id = envelope.id.clone();
    let outcome = process(envelope, &router, mock, &tx).await;

    let status = if outcome.is_ok() { "ok" } else { "error" };
    metrics::counter!(
        telemetry::REQUESTS_TOTAL,
        "operation" => operation.label(),
        "status" => status
    )
    .increment(1);

    if let Err(e) = outcome {
        let _ = tx.send(Outbound::error(id, &e)).await;
    }
}

/// Process a validated envelope, sending every response it produces.
async fn process(
    envelope: Envelope,
    router: &ServiceRouter,
    mock: bool,
    tx: &mpsc::Sender<Outbound>,
) -> Result<()> {
    let service = router.service(envelope.model.as_deref());
    let model = service.model().to_string();
    let prompt = envelope.prompt.ok_or(BifrostError::InvalidPrompt)?;

    if mock {
        return match envelope.operation {
            Operation::Generate => {
                let data = format!("MOCK:{model}:{prompt}");
                send(tx, Outbound::data(envelope.id, data, model)).await
            }
            Operation::Stream => {
                // Fixed literal fragmentation, kept for client-test
                // compatibility; not derived from the joined string.
                let prefix: String = prompt.chars().take(5).collect();
                let fragments = ["MO", "CK", ":", model.as_str(), ":", prefix.as_str()];
                for fragment in fragments {
                    send(
                        tx,
                        Outbound::chunk(envelope.id.clone(), fragment.to_string(), model.clone()),
                    )
                    .await?;
                }
                send(tx, Outbound::done(envelope.id, model)).await
            }
        };
    }

    match envelope.operation {
        Operation::Generate => {
            let data = service.generate(&prompt, &envelope.options).await?;
            send(tx, Outbound::data(envelope.id, data, model)).await
        }
        Operation::Stream => {
            let mut tokens = service.generate_stream(&prompt, &envelope.options).await?;
            while let Some(token) = tokens.next().await {
                // A stream error replaces `done` with an error envelope.
                let token = token?;
                metrics::counter!(telemetry::STREAM_TOKENS_TOTAL, "model" => model.clone())
                    .increment(1);
                send(
                    tx,
                    Outbound::chunk(envelope.id.clone(), token, model.clone()),
                )
                .await?;
            }
            send(tx, Outbound::done(envelope.id, model)).await
        }
    }
}

/// Enqueue one envelope for the connection writer.
///
/// Failure means the connection is gone; returning the error unwinds the
/// handler, dropping any in-flight token stream and thereby cancelling
/// the backend call.
async fn send(tx: &mpsc::Sender<Outbound>, envelope: Outbound) -> Result<()> {
    tx.send(envelope)
        .await
        .map_err(|_| BifrostError::Stream("connection closed".into()))
}
