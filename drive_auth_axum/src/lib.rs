//! Axum bindings for `drive-auth`: the OAuth2 callback handler, session-gate
//! middleware, and the authorized client handed to storage-proxy handlers.

mod client;
mod error;
mod middleware;
mod oauth2;
mod session;

use std::sync::Arc;

use drive_auth::SessionGate;

pub use client::{AuthorizedClient, ClientAccess, with_authorized_client};
pub use middleware::{authenticate_headers, authorize_401, authorize_redirect};
pub use oauth2::{CallbackParams, authorized_callback, redirect_for_intent};

// Re-exported so binaries only need this crate for wiring.
pub use drive_auth::{
    AuthError, AuthOutcome, GateOutcome, GoogleProvider, LaunchIntent, MemoryTokenStore,
    SqliteTokenStore, TokenStore, build_consent_url,
};

/// Shared state for the auth routes and middleware.
#[derive(Clone)]
pub struct AuthState {
    pub gate: Arc<SessionGate>,
}

impl AuthState {
    pub fn new(gate: Arc<SessionGate>) -> Self {
        Self { gate }
    }
}
