pub mod auth;
pub mod catalog;
pub mod chat;
pub mod db;
pub mod directory;
pub mod error;
pub mod profiles;
pub mod session;

use axum::extract::FromRef;
use sqlx::SqlitePool;

pub use error::{AppError, AppResult};

#[derive(Clone, FromRef)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub channels: chat::Channels,
}
