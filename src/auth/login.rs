use axum::{debug_handler, extract::State, Json};
use serde::Deserialize;
use sqlx::SqlitePool;
use tower_sessions::Session;

use crate::{
    profiles::{self, Profile},
    session, AppError, AppResult,
};

use super::password;

#[derive(Debug, Deserialize)]
pub(crate) struct LoginQuery {
    email: String,
    password: String,
}

#[debug_handler]
pub(crate) async fn login(
    State(db_pool): State<SqlitePool>,
    session: Session,
    Json(LoginQuery { email, password }): Json<LoginQuery>,
) -> AppResult<Json<Profile>> {
    let email = email.trim().to_lowercase();
    let Some((user_id, password_hash)): Option<(String, String)> =
        sqlx::query_as("SELECT user_id,password_hash FROM users WHERE email=?")
            .bind(&email)
            .fetch_optional(&db_pool)
            .await?
    else {
        return Err(AppError::PermissionDenied("invalid email or password"));
    };

    password::verify_password(&password, &password_hash)?;

    let profile = profiles::fetch(&db_pool, &user_id)
        .await?
        .ok_or(AppError::NotFound("profile"))?;
    session::sign_in(&session, &user_id, &profile).await?;
    tracing::info!(%user_id, "signed in");

    Ok(Json(profile))
}
