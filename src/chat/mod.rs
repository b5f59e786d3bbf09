mod msg;
mod view;
mod ws;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::AppState;

pub use msg::{append, SendMessageQuery};
pub use view::{fetch_snapshot, ChannelView};

/// Upper bound on message text, enforced by [`append`] itself.
pub const MAX_TEXT_LEN: usize = 500;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{peer_id}", get(view::channel))
        .route("/{peer_id}/msg", post(msg::send_msg))
        .route("/{peer_id}/ws", get(ws::channel_ws))
}

/// Canonical id of the two-party channel between `a` and `b`. Pure and
/// symmetric: both argument orders yield the same id.
pub fn channel_id(a: &str, b: &str) -> String {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    format!("{lo}_{hi}")
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Message {
    pub id: String,
    pub channel_id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub text: String,
    pub timestamp: i64,
    /// Reserved. Written `false` on every append, never read back.
    pub read: bool,
}

/// Per-channel change notifications plus the store's write clock.
#[derive(Clone)]
pub struct Channels {
    inner: Arc<Mutex<ChannelsInner>>,
}

struct ChannelsInner {
    notifiers: HashMap<String, broadcast::Sender<()>>,
    clock: i64,
}

impl Channels {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(ChannelsInner {
                notifiers: HashMap::new(),
                clock: 0,
            })),
        }
    }

    pub(crate) fn subscribe(&self, channel: &str) -> broadcast::Receiver<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .notifiers
            .entry(channel.to_owned())
            .or_insert_with(|| broadcast::channel(64).0)
            .subscribe()
    }

    pub(crate) fn notify(&self, channel: &str) {
        let mut inner = self.inner.lock().unwrap();
        let stale = match inner.notifiers.get(channel) {
            Some(tx) => tx.send(()).is_err(),
            None => return,
        };
        // every receiver is gone; the entry has nothing left to wake
        if stale {
            inner.notifiers.remove(channel);
        }
    }

    /// Drops the notifier once the last receiver for `channel` is gone.
    pub(crate) fn release(&self, channel: &str) {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .notifiers
            .get(channel)
            .is_some_and(|tx| tx.receiver_count() == 0)
        {
            inner.notifiers.remove(channel);
        }
    }

    pub(crate) fn tracked_channels(&self) -> usize {
        self.inner.lock().unwrap().notifiers.len()
    }

    /// Server-assigned write timestamp in microseconds, strictly increasing
    /// for the life of the process even when the wall clock stalls or steps
    /// backwards.
    pub(crate) fn next_timestamp(&self) -> i64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as i64)
            .unwrap_or(0);
        let mut inner = self.inner.lock().unwrap();
        inner.clock = now.max(inner.clock + 1);
        inner.clock
    }
}

impl Default for Channels {
    fn default() -> Self {
        Self::new()
    }
}
