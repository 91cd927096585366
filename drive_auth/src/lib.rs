//! OAuth2 token lifecycle and session gating for a Drive-backed text editor.
//!
//! The crate owns three concerns:
//! - the authorization flow against the provider (code exchange, identity
//!   lookup, refresh-token fallback),
//! - durable storage of token pairs keyed by user id,
//! - the per-request session gate that hydrates and refreshes tokens.
//!
//! HTTP framework integration lives in the companion `drive-auth-axum` crate.

mod config;
mod errors;
mod oauth2;
mod session;
mod storage;
mod utils;

#[cfg(test)]
mod test_utils;

pub use config::{SESSION_COOKIE_MAX_AGE, SESSION_COOKIE_NAME};
pub use errors::AuthError;
pub use oauth2::{
    AuthOutcome, Credential, GoogleProvider, LaunchIntent, TokenPair, TokenProvider, UserIdentity,
    build_consent_url, get_or_refresh_credentials,
};
pub use session::{GateContext, GateOutcome, SessionGate};
pub use storage::{MemoryTokenStore, SqliteTokenStore, TokenStore};
