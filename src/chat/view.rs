use axum::{
    debug_handler,
    extract::{Path, State},
    Json,
};
use sqlx::SqlitePool;
use tokio::sync::broadcast;
use tower_sessions::Session;

use crate::{profiles, session, AppError, AppResult, AppState};

use super::{channel_id, Channels, Message};

/// One-shot snapshot over HTTP. The live variant is the WebSocket route.
#[debug_handler(state = AppState)]
pub(crate) async fn channel(
    Path(peer_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Json<Vec<Message>>> {
    let user_id = session::current_user(&session).await?;
    if user_id == peer_id {
        return Err(AppError::Validation(
            "cannot open a channel with yourself".into(),
        ));
    }
    if profiles::fetch(&db_pool, &peer_id).await?.is_none() {
        return Err(AppError::NotFound("peer profile"));
    }
    Ok(Json(
        fetch_snapshot(&db_pool, &channel_id(&user_id, &peer_id)).await?,
    ))
}

/// Full ordered message list for a channel, in the store's write order.
pub async fn fetch_snapshot(db_pool: &SqlitePool, channel: &str) -> AppResult<Vec<Message>> {
    Ok(sqlx::query_as::<_, Message>(
        "SELECT id,channel_id,sender_id,receiver_id,text,timestamp,read
         FROM messages WHERE channel_id=? ORDER BY timestamp ASC, id ASC",
    )
    .bind(channel)
    .fetch_all(db_pool)
    .await?)
}

/// A live subscription to one channel. Yields full replacement snapshots:
/// the current list first, then a recomputed list after every store change,
/// indefinitely until [`close`](ChannelView::close).
pub struct ChannelView {
    channel: String,
    db_pool: SqlitePool,
    channels: Channels,
    rx: Option<broadcast::Receiver<()>>,
    primed: bool,
}

impl ChannelView {
    pub fn open(db_pool: SqlitePool, channels: &Channels, channel: impl Into<String>) -> Self {
        let channel = channel.into();
        let rx = channels.subscribe(&channel);
        Self {
            channel,
            db_pool,
            channels: channels.clone(),
            rx: Some(rx),
            primed: false,
        }
    }

    /// The next replacement snapshot, or `Ok(None)` once the view is closed.
    /// A store failure is terminal: the error is returned and the
    /// subscription released; the view performs no retry of its own.
    ///
    /// Cancel safe: `primed` is cleared the moment a wakeup is consumed, so
    /// a caller that drops this future mid-query (a `select!` arm, say) gets
    /// an immediate re-query on the next call instead of a lost snapshot.
    pub async fn next_snapshot(&mut self) -> AppResult<Option<Vec<Message>>> {
        let Some(rx) = self.rx.as_mut() else {
            return Ok(None);
        };

        if self.primed {
            match rx.recv().await {
                Ok(()) => self.primed = false,
                // a lagged receiver simply recomputes a fresher snapshot
                Err(broadcast::error::RecvError::Lagged(_)) => self.primed = false,
                Err(broadcast::error::RecvError::Closed) => {
                    self.release();
                    return Ok(None);
                }
            }
        }

        match fetch_snapshot(&self.db_pool, &self.channel).await {
            Ok(messages) => {
                self.primed = true;
                Ok(Some(messages))
            }
            Err(e) => {
                self.release();
                Err(e)
            }
        }
    }

    /// Releases the subscription. Idempotent: closing an already-closed view
    /// is a no-op.
    pub fn close(&mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.rx.take().is_some() {
            self.channels.release(&self.channel);
        }
    }
}

impl Drop for ChannelView {
    fn drop(&mut self) {
        self.release();
    }
}
