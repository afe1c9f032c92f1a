//! Relay of reply fragments from the completion stream to the HTTP body.
//!
//! A spawned task pulls fragments from upstream and pushes them through a
//! one-slot channel whose receiver backs the response body, so each fragment
//! is written to the client as soon as it is produced and upstream is never
//! read far ahead of the client. When the client goes away the channel closes
//! and the task stops pulling.

use axum::body::Bytes;
use futures::StreamExt;
use profrag_core::traits::ChunkStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::Instrument;

/// Item type of a relayed body.
pub type RelayItem = Result<Bytes, RelayError>;

/// Terminal failure surfaced to the body after zero or more fragments.
#[derive(Debug, Clone, thiserror::Error)]
#[error("reply stream failed: {0}")]
pub struct RelayError(pub String);

/// How a relay ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Open,
    /// Upstream finished and every fragment was handed to the body.
    ClosedSuccess,
    /// Upstream failed mid-stream; the error was the last item sent.
    ClosedError,
    /// The client stopped reading.
    Cancelled,
}

impl RelayState {
    pub fn is_closed(self) -> bool {
        !matches!(self, Self::Open)
    }
}

/// Forward `upstream` into `tx` until it ends, fails or the receiver is gone.
pub async fn pump(mut upstream: ChunkStream, tx: mpsc::Sender<RelayItem>) -> RelayState {
    let mut state = RelayState::Open;
    let mut fragments = 0usize;

    while !state.is_closed() {
        state = tokio::select! {
            _ = tx.closed() => RelayState::Cancelled,
            next = upstream.next() => match next {
                Some(Ok(fragment)) => {
                    fragments += 1;
                    match tx.send(Ok(Bytes::from(fragment))).await {
                        Ok(()) => RelayState::Open,
                        Err(_) => RelayState::Cancelled,
                    }
                }
                Some(Err(e)) => {
                    tracing::warn!("Reply stream failed after {fragments} fragment(s): {e}");
                    // Nothing follows the error, whether or not it was delivered.
                    let _ = tx.send(Err(RelayError(e.to_string()))).await;
                    RelayState::ClosedError
                }
                None => RelayState::ClosedSuccess,
            },
        };
    }

    match state {
        RelayState::ClosedSuccess => tracing::info!("Reply complete ({fragments} fragment(s))"),
        RelayState::Cancelled => tracing::info!("Client disconnected after {fragments} fragment(s)"),
        _ => {}
    }
    state
}

/// Start relaying `upstream` on its own task.
///
/// Returns the body stream and a handle resolving to the final state. The
/// task runs inside the caller's current span.
pub fn spawn_relay(upstream: ChunkStream) -> (ReceiverStream<RelayItem>, JoinHandle<RelayState>) {
    let (tx, rx) = mpsc::channel(1);
    let handle = tokio::spawn(pump(upstream, tx).instrument(tracing::Span::current()));
    (ReceiverStream::new(rx), handle)
}
