use axum::{
    debug_handler,
    extract::{Path, State},
    Json,
};
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{session, AppError, AppResult};

use super::Profile;

#[debug_handler]
pub(crate) async fn profile(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Path(user_id): Path<String>,
) -> AppResult<Json<Profile>> {
    session::current_user(&session).await?;

    let profile = super::fetch(&db_pool, &user_id)
        .await?
        .ok_or(AppError::NotFound("profile"))?;
    Ok(Json(profile))
}
