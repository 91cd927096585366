use std::sync::Arc;

use axum::{Router, middleware, routing::get};
use dotenvy::dotenv;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use drive_auth::{GoogleProvider, MemoryTokenStore, SessionGate, SqliteTokenStore, TokenStore};
use drive_auth_axum::{AuthState, authorize_401};

mod drive;
mod handlers;

use crate::drive::{about, create_file, get_file, update_file, user_info};
use crate::handlers::index;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let tokens: Arc<dyn TokenStore> = match std::env::var("DRIVE_AUTH_DB_URL") {
        Ok(url) => {
            tracing::info!("Using SQLite token store at {url}");
            Arc::new(SqliteTokenStore::connect(&url).await?)
        }
        Err(_) => {
            tracing::info!("DRIVE_AUTH_DB_URL not set, tokens held in memory");
            Arc::new(MemoryTokenStore::default())
        }
    };
    let gate = Arc::new(SessionGate::new(Arc::new(GoogleProvider::new()), tokens));
    let state = AuthState::new(gate);

    let svc = Router::new()
        .route("/svc", get(get_file).post(create_file).put(update_file))
        .route("/user", get(user_info))
        .route("/about", get(about))
        .route_layer(middleware::from_fn_with_state(state.clone(), authorize_401));

    let app = Router::new()
        .route("/", get(index))
        .merge(svc)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
