use axum::{
    debug_handler,
    extract::{
        ws::{Message as WsMessage, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{profiles, session, AppError, AppResult, AppState};

use super::{channel_id, msg, view::ChannelView, Channels, SendMessageQuery};

/// Live channel endpoint. The server pushes a full snapshot on open and
/// again after every change; the client sends `{"text": …}` to append.
#[debug_handler(state = AppState)]
pub(crate) async fn channel_ws(
    Path(peer_id): Path<String>,
    State(db_pool): State<SqlitePool>,
    State(channels): State<Channels>,
    session: Session,
    ws: WebSocketUpgrade,
) -> AppResult<Response> {
    let user_id = session::current_user(&session).await?;
    if user_id == peer_id {
        return Err(AppError::Validation(
            "cannot open a channel with yourself".into(),
        ));
    }
    if profiles::fetch(&db_pool, &peer_id).await?.is_none() {
        return Err(AppError::NotFound("peer profile"));
    }
    let channel = channel_id(&user_id, &peer_id);

    Ok(ws.on_upgrade(move |socket| serve(socket, db_pool, channels, channel, user_id, peer_id)))
}

async fn serve(
    socket: WebSocket,
    db_pool: SqlitePool,
    channels: Channels,
    channel: String,
    user_id: String,
    peer_id: String,
) {
    let mut view = ChannelView::open(db_pool.clone(), &channels, channel.clone());
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            snapshot = view.next_snapshot() => {
                let payload = match snapshot {
                    Ok(Some(messages)) => match serde_json::to_string(&messages) {
                        Ok(payload) => payload,
                        Err(e) => {
                            tracing::error!(%channel, error = %e, "snapshot serialization failed");
                            break;
                        }
                    },
                    Ok(None) => break,
                    Err(e) => {
                        tracing::warn!(%channel, error = %e, "snapshot delivery failed");
                        break;
                    }
                };
                if sender.send(payload.into()).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => {
                let Some(Ok(ws_msg)) = incoming else { break };
                if let WsMessage::Close(_) = ws_msg {
                    break;
                }
                let Ok(SendMessageQuery { text }) = serde_json::from_slice(&ws_msg.into_data()) else {
                    continue;
                };
                // rejection is the sender's problem; open views are untouched
                if let Err(e) = msg::append(&db_pool, &channels, &channel, &user_id, &peer_id, &text).await {
                    tracing::debug!(%channel, error = %e, "append rejected");
                    if sender.send(error_frame(&e).into()).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    view.close();
}

/// Error frames are JSON objects; snapshot frames are JSON arrays, so a
/// client can tell the two apart.
fn error_frame(err: &AppError) -> String {
    serde_json::json!({ "error": err.to_string() }).to_string()
}
