use axum::{
    debug_handler,
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;
use uuid::Uuid;

use crate::{session, AppError, AppResult, AppState};

use super::{channel_id, Channels, MAX_TEXT_LEN};

#[derive(Debug, Deserialize)]
pub struct SendMessageQuery {
    pub text: String,
}

/// HTTP append. The response body is intentionally empty: the message only
/// becomes visible through a channel subscription.
#[debug_handler(state = AppState)]
pub(crate) async fn send_msg(
    Path(peer_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    State(channels): State<Channels>,
    session: Session,
    Json(SendMessageQuery { text }): Json<SendMessageQuery>,
) -> AppResult<StatusCode> {
    let user_id = session::current_user(&session).await?;
    let channel = channel_id(&user_id, &peer_id);
    append(&db_pool, &channels, &channel, &user_id, &peer_id, &text).await?;
    Ok(StatusCode::ACCEPTED)
}

/// Validates and stores one message, then wakes every open view on the
/// channel. Fire-and-forget: `Ok` means the store accepted the write, not
/// that the peer has seen it.
pub async fn append(
    db_pool: &SqlitePool,
    channels: &Channels,
    channel: &str,
    sender_id: &str,
    receiver_id: &str,
    text: &str,
) -> AppResult<()> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("message text is empty".into()));
    }
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(AppError::Validation(format!(
            "message text exceeds {MAX_TEXT_LEN} characters"
        )));
    }
    if sender_id == receiver_id {
        return Err(AppError::Validation("cannot message yourself".into()));
    }
    if channel != channel_id(sender_id, receiver_id) {
        return Err(AppError::Validation(
            "sender/receiver pair does not match the channel".into(),
        ));
    }

    let id = Uuid::now_v7();
    let timestamp = channels.next_timestamp();
    sqlx::query(
        "INSERT INTO messages (id,channel_id,sender_id,receiver_id,text,timestamp,read)
         VALUES (?,?,?,?,?,?,?)",
    )
    .bind(id.to_string())
    .bind(channel)
    .bind(sender_id)
    .bind(receiver_id)
    .bind(text)
    .bind(timestamp)
    // reserved; nothing flips this to true yet
    .bind(false)
    .execute(db_pool)
    .await?;

    channels.notify(channel);
    tracing::debug!(%channel, %sender_id, "message appended");
    Ok(())
}
