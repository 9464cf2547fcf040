//! Event fan-out to WebSocket subscribers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use chime_events::ChimeEvent;
use futures::stream::SplitSink;
use futures::SinkExt;
use tokio::sync::{mpsc, Mutex};
use tokio::time::timeout;
use tracing::{debug, warn};

/// Per-subscriber write deadline. Generous for local browsers; it exists
/// only to bound how long a dead peer can hold up a broadcast.
const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Sink half of a subscriber's WebSocket connection.
pub type SubscriberSink = SplitSink<WebSocket, Message>;

/// Fans classified events out to every connected WebSocket client.
///
/// Subscribers have no per-client queue: each broadcast serializes the
/// event once and attempts a single deadline-bounded write per subscriber,
/// evicting on any failure. A slow or dead client therefore never blocks
/// delivery to healthy ones, at the cost of dropping frames for the
/// evicted peer — acceptable for a live sound stream with no replay.
pub struct Hub {
    subscribers: Mutex<HashMap<u64, SubscriberSink>>,
    next_id: AtomicU64,
}

impl Hub {
    /// Create a hub with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a subscriber, returning the id used to deregister it.
    pub async fn register(&self, sink: SubscriberSink) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.lock().await.insert(id, sink);
        debug!(subscriber = id, "websocket subscriber registered");
        id
    }

    /// Remove a subscriber and close its connection, if still present.
    ///
    /// Safe to call after the hub already evicted the subscriber.
    pub async fn deregister(&self, id: u64) {
        let sink = self.subscribers.lock().await.remove(&id);
        if let Some(mut sink) = sink {
            let _ = sink.close().await;
            debug!(subscriber = id, "websocket subscriber removed");
        }
    }

    /// Number of currently connected subscribers.
    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }

    /// Drain `events` until the channel closes, broadcasting each event.
    ///
    /// This is the hub's single broadcast loop; it ends when every sender
    /// is gone. In-flight frames are not flushed on exit.
    pub async fn run(&self, mut events: mpsc::Receiver<ChimeEvent>) {
        while let Some(event) = events.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => self.broadcast(Utf8Bytes::from(json)).await,
                Err(e) => warn!(error = %e, "cannot serialize event"),
            }
        }
        debug!("event channel closed; broadcast loop exiting");
    }

    /// Write one frame to every subscriber, evicting any that fail.
    ///
    /// The whole fan-out runs under the subscriber-set lock; subscriber
    /// counts are a handful of local browsers, so the critical section
    /// stays short.
    async fn broadcast(&self, frame: Utf8Bytes) {
        let mut subscribers = self.subscribers.lock().await;
        let mut dead = Vec::new();

        for (&id, sink) in subscribers.iter_mut() {
            match timeout(WRITE_TIMEOUT, sink.send(Message::Text(frame.clone()))).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    debug!(subscriber = id, error = %e, "write failed; evicting");
                    dead.push(id);
                }
                Err(_) => {
                    debug!(subscriber = id, "write timed out; evicting");
                    dead.push(id);
                }
            }
        }

        for id in dead {
            if let Some(mut sink) = subscribers.remove(&id) {
                let _ = sink.close().await;
            }
        }
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Hub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hub").finish_non_exhaustive()
    }
}
