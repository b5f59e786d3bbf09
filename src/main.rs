use axum::{routing::get, Router};
use bridgeit::{auth, catalog, chat, db, directory, profiles, AppState};
use tower_http::cors::CorsLayer;
use tower_sessions::{cookie::SameSite, Expiry, MemoryStore, SessionManagerLayer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bridgeit=info")),
        )
        .init();

    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(false)
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(30)));

    let db_url = dotenv::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:bridgeit.db?mode=rwc".to_string());
    let db_pool = db::connect(&db_url).await.expect("store unavailable");

    let app_state = AppState {
        db_pool,
        channels: chat::Channels::new(),
    };

    let app = Router::new()
        .route("/d", get(directory::browse))
        .route("/catalog", get(catalog::catalog))
        .nest("/auth", auth::router())
        .nest("/c", chat::router())
        .nest("/p", profiles::router())
        .with_state(app_state)
        .layer(session_layer)
        .layer(CorsLayer::permissive());

    let addr = dotenv::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await.unwrap();
}
