use axum::{debug_handler, http::StatusCode};
use tower_sessions::Session;

use crate::{session, AppResult};

#[debug_handler]
pub(crate) async fn logout(session: Session) -> AppResult<StatusCode> {
    session::sign_out(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}
