mod me;
mod page;

use axum::{routing::get, Router};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::{AppResult, AppState};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me::me).put(me::update))
        .route("/{user_id}", get(page::profile))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum UserType {
    Employee,
    Employer,
}

impl UserType {
    /// The type a user browses for: employees look for employers and the
    /// other way around.
    pub fn counterpart(self) -> UserType {
        match self {
            UserType::Employee => UserType::Employer,
            UserType::Employer => UserType::Employee,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Profile {
    pub user_id: String,
    pub role: String,
    pub field: String,
    pub experience: String,
    pub country: String,
    pub citizenship: String,
    pub gender: String,
    pub bio: String,
    pub user_type: UserType,
    pub created_at: i64,
    pub updated_at: i64,
}

pub(crate) fn now_unix() -> i64 {
    time::OffsetDateTime::now_utc().unix_timestamp()
}

pub async fn fetch(db_pool: &SqlitePool, user_id: &str) -> AppResult<Option<Profile>> {
    Ok(sqlx::query_as::<_, Profile>(
        "SELECT user_id,role,field,experience,country,citizenship,gender,bio,user_type,created_at,updated_at
         FROM profiles WHERE user_id=?",
    )
    .bind(user_id)
    .fetch_optional(db_pool)
    .await?)
}
