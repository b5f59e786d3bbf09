use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{session, AppError, AppResult};

use super::{fetch, now_unix, Profile};

#[debug_handler]
pub(crate) async fn me(
    State(db_pool): State<SqlitePool>,
    session: Session,
) -> AppResult<Json<Profile>> {
    Ok(Json(session::current_profile(&session, &db_pool).await?))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProfileUpdateQuery {
    role: String,
    field: String,
    experience: String,
    country: String,
    citizenship: String,
    gender: String,
    bio: String,
}

/// Owner-only update. `user_type` is fixed at signup and not editable here.
#[debug_handler]
pub(crate) async fn update(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(update): Json<ProfileUpdateQuery>,
) -> AppResult<Json<Profile>> {
    let user_id = session::current_user(&session).await?;

    sqlx::query(
        "UPDATE profiles SET role=?,field=?,experience=?,country=?,citizenship=?,gender=?,bio=?,updated_at=?
         WHERE user_id=?",
    )
    .bind(&update.role)
    .bind(&update.field)
    .bind(&update.experience)
    .bind(&update.country)
    .bind(&update.citizenship)
    .bind(&update.gender)
    .bind(&update.bio)
    .bind(now_unix())
    .bind(&user_id)
    .execute(&db_pool)
    .await?;

    let profile = fetch(&db_pool, &user_id)
        .await?
        .ok_or(AppError::NotFound("profile"))?;
    session::cache_profile(&session, &profile).await?;
    Ok(Json(profile))
}
