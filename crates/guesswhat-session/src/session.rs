//! Session types: the outbound handle shared with rooms, and the session
//! owned by a connection task.

use std::sync::Arc;

use guesswhat_protocol::{ClientMessage, Codec, Envelope, ServerMessage};
use guesswhat_transport::{Connection, ConnectionId, TransportError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::SessionError;

// ---------------------------------------------------------------------------
// SessionHandle
// ---------------------------------------------------------------------------

/// Cheap, cloneable sender for one client's outbound messages.
///
/// Rooms store one per member and push broadcasts through it. Sending never
/// blocks and never touches the network.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<ServerMessage>,
}

impl SessionHandle {
    /// Creates a handle and the receiving end of its queue.
    ///
    /// [`Session::start`] wires the receiver to a writer pump; tests can
    /// keep it and inspect what a player would have been sent.
    pub fn channel(id: ConnectionId) -> (Self, SessionReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { id, tx }, SessionReceiver { rx })
    }

    /// The connection this handle delivers to.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queues a message for delivery.
    ///
    /// # Errors
    /// Returns [`SessionError::Closed`] if the writer has stopped. Callers
    /// doing fan-out ignore this: delivery is best-effort.
    pub fn send(&self, msg: ServerMessage) -> Result<(), SessionError> {
        self.tx.send(msg).map_err(|_| SessionError::Closed(self.id))
    }

    /// Whether the receiving side has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving end of a [`SessionHandle`]'s queue.
#[derive(Debug)]
pub struct SessionReceiver {
    rx: mpsc::UnboundedReceiver<ServerMessage>,
}

impl SessionReceiver {
    /// Waits for the next queued message. `None` once every handle is dropped.
    pub async fn recv(&mut self) -> Option<ServerMessage> {
        self.rx.recv().await
    }

    /// Returns the next queued message without waiting.
    pub fn try_recv(&mut self) -> Option<ServerMessage> {
        self.rx.try_recv().ok()
    }

    /// Takes everything currently queued.
    pub fn drain(&mut self) -> Vec<ServerMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            out.push(msg);
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One client's connection session.
///
/// Owned by the connection task. Inbound frames are read with
/// [`recv`](Self::recv); outbound messages go through handles obtained from
/// [`handle`](Self::handle) and are written by a background pump, so the
/// read loop never waits on a slow socket.
pub struct Session<C, K> {
    conn: Arc<C>,
    codec: K,
    handle: SessionHandle,
    writer: JoinHandle<()>,
}

impl<C, K> Session<C, K>
where
    C: Connection<Error = TransportError>,
    K: Codec + Clone,
{
    /// Wraps a connection and spawns its writer pump.
    pub fn start(conn: C, codec: K) -> Self {
        let conn = Arc::new(conn);
        let (handle, rx) = SessionHandle::channel(conn.id());
        let writer = tokio::spawn(pump(Arc::clone(&conn), codec.clone(), rx));
        Self {
            conn,
            codec,
            handle,
            writer,
        }
    }

    /// The connection id.
    pub fn id(&self) -> ConnectionId {
        self.handle.id()
    }

    /// A new handle for queuing outbound messages.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Receives the next well-formed client message.
    ///
    /// Frames that are not valid envelopes, or carry a type the server does
    /// not consume, are dropped here and never surface to the caller.
    /// Returns `Ok(None)` when the client closed the connection.
    pub async fn recv(&self) -> Result<Option<ClientMessage>, SessionError> {
        loop {
            let Some(text) = self.conn.recv().await? else {
                return Ok(None);
            };

            let decoded = self
                .codec
                .decode::<Envelope>(&text)
                .and_then(ClientMessage::try_from);
            match decoded {
                Ok(msg) => return Ok(Some(msg)),
                Err(e) => {
                    tracing::debug!(id = %self.id(), error = %e, "discarding malformed frame");
                }
            }
        }
    }

    /// Stops the writer pump and closes the connection.
    pub async fn close(self) {
        let Self {
            conn,
            handle,
            writer,
            ..
        } = self;
        drop(handle);
        writer.abort();
        if let Err(e) = conn.close().await {
            tracing::trace!(id = %conn.id(), error = %e, "close after disconnect");
        }
    }
}

/// Drains the outbound queue onto the connection.
///
/// Ends when every handle is dropped or the first write fails. After a
/// failed write the queue is abandoned: delivery is best-effort and the
/// read side will notice the dead connection on its own.
async fn pump<C, K>(conn: Arc<C>, codec: K, mut rx: SessionReceiver)
where
    C: Connection<Error = TransportError>,
    K: Codec,
{
    while let Some(msg) = rx.recv().await {
        let text = match msg.to_envelope().and_then(|env| codec.encode(&env)) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(id = %conn.id(), kind = msg.kind(), error = %e, "failed to encode message");
                continue;
            }
        };
        if let Err(e) = conn.send(&text).await {
            tracing::debug!(id = %conn.id(), error = %e, "send failed, stopping writer");
            break;
        }
    }
}
