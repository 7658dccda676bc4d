//! Change Feed Client
//!
//! Opens one socket per subscribed category, joins the category channel and
//! forwards decoded row changes until the feed is stopped.

use futures_util::{SinkExt, StreamExt};
use std::ops::ControlFlow;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use super::error::BackendError;
use super::protocol::{
    channel_topic, decode, socket_url, ChangeFilter, Incoming, PhoenixMessage, RefCounter,
    HEARTBEAT_TOPIC,
};
use super::{BackendConfig, RealtimeConfig};
use crate::entries::{Category, ChangeEvent};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Client for the backend's change feed
#[derive(Debug, Clone)]
pub struct RealtimeClient {
    backend: BackendConfig,
    config: RealtimeConfig,
}

/// Stops a running feed. Dropping the handle stops it too.
#[derive(Debug)]
pub struct FeedHandle {
    stop: oneshot::Sender<()>,
}

impl FeedHandle {
    pub fn stop(self) {
        let _ = self.stop.send(());
    }
}

impl RealtimeClient {
    pub fn new(backend: BackendConfig, config: RealtimeConfig) -> Self {
        Self { backend, config }
    }

    /// Connect, join the category channel and start forwarding changes.
    ///
    /// Returns once the join request is sent; the join reply is only logged.
    pub async fn subscribe(
        &self,
        category: Category,
    ) -> Result<(mpsc::Receiver<ChangeEvent>, FeedHandle), BackendError> {
        let url = socket_url(&self.backend.url, &self.backend.api_key)?;

        let mut refs = RefCounter::new();
        let join_ref = refs.next_ref();
        let filter = ChangeFilter::new(&self.backend.schema, &self.backend.table, category);
        let join = PhoenixMessage::join(&filter, &self.backend.api_key, join_ref.clone());
        let join_text = join.to_text()?;

        // A backend that accepts the connection but never answers must not
        // hold up the caller
        let socket = tokio::time::timeout(self.backend.request_timeout(), async {
            let (mut socket, _response) = connect_async(url.as_str()).await?;
            socket.send(Message::Text(join_text)).await?;
            Ok::<_, BackendError>(socket)
        })
        .await
        .map_err(|_| BackendError::Timeout)??;

        tracing::info!(category = %category, topic = %join.topic, "Joining change feed");

        let (tx, rx) = mpsc::channel(self.config.event_buffer.max(1));
        let (stop_tx, stop_rx) = oneshot::channel();

        let feed = Feed {
            category,
            topic: channel_topic(category),
            join_ref,
            refs,
            heartbeat: self.config.heartbeat_interval(),
            events: tx,
        };
        tokio::spawn(feed.run(socket, stop_rx));

        Ok((rx, FeedHandle { stop: stop_tx }))
    }
}

/// State of one running subscription
struct Feed {
    category: Category,
    topic: String,
    join_ref: String,
    refs: RefCounter,
    heartbeat: Duration,
    events: mpsc::Sender<ChangeEvent>,
}

impl Feed {
    async fn run(mut self, socket: Socket, mut stop: oneshot::Receiver<()>) {
        let (mut sink, mut stream) = socket.split();

        let mut ticker = tokio::time::interval(self.heartbeat);
        // First tick fires immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = &mut stop => {
                    let leave = PhoenixMessage::leave(
                        self.category,
                        Some(self.join_ref.clone()),
                        self.refs.next_ref(),
                    );
                    if let Ok(text) = leave.to_text() {
                        let _ = sink.send(Message::Text(text)).await;
                    }
                    let _ = sink.close().await;
                    tracing::info!(category = %self.category, "Left change feed");
                    break;
                }

                _ = ticker.tick() => {
                    let heartbeat = PhoenixMessage::heartbeat(self.refs.next_ref());
                    let sent = match heartbeat.to_text() {
                        Ok(text) => sink.send(Message::Text(text)).await.is_ok(),
                        Err(_) => false,
                    };
                    if !sent {
                        tracing::warn!(category = %self.category, "Heartbeat failed, closing change feed");
                        break;
                    }
                }

                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if self.handle_text(&text).await.is_break() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!(category = %self.category, "Change feed closed by backend");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!(category = %self.category, error = %e, "Change feed socket error");
                        break;
                    }
                },
            }
        }
    }

    async fn handle_text(&self, text: &str) -> ControlFlow<()> {
        let message = match PhoenixMessage::from_text(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse change feed frame");
                return ControlFlow::Continue(());
            }
        };

        if message.topic != self.topic && message.topic != HEARTBEAT_TOPIC {
            return ControlFlow::Continue(());
        }

        match decode(&message) {
            Ok(Incoming::Change(event)) => {
                tracing::debug!(category = %self.category, kind = event.kind(), "Change received");
                if self.events.send(event).await.is_err() {
                    // Subscriber is gone
                    return ControlFlow::Break(());
                }
            }
            Ok(Incoming::Reply { msg_ref, ok, detail }) => {
                if msg_ref.as_deref() == Some(self.join_ref.as_str()) {
                    if ok {
                        tracing::info!(category = %self.category, "Change feed joined");
                    } else {
                        tracing::error!(category = %self.category, detail = %detail, "Change feed join rejected");
                    }
                } else if !ok {
                    tracing::warn!(category = %self.category, detail = %detail, "Change feed request failed");
                }
            }
            Ok(Incoming::System { status, message }) => {
                tracing::debug!(category = %self.category, status = %status, message = %message, "Change feed system message");
            }
            Ok(Incoming::ChannelClosed { reason }) => {
                tracing::warn!(category = %self.category, reason = %reason, "Change feed channel closed");
                return ControlFlow::Break(());
            }
            Ok(Incoming::Ignored) => {}
            Err(e) => {
                tracing::warn!(category = %self.category, error = %e, "Dropping undecodable change");
            }
        }

        ControlFlow::Continue(())
    }
}
