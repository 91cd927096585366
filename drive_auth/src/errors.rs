use thiserror::Error;

/// Failures of the token lifecycle. All variants are recoverable at the
/// request boundary; none should take the process down.
#[derive(Debug, Error, Clone)]
pub enum AuthError {
    #[error("Code exchange error: {0}")]
    CodeExchange(String),

    #[error("No usable identity: {0}")]
    NoIdentity(String),

    /// No refresh token could be obtained from the exchange or the store.
    /// Callers must redirect the user agent to `consent_url`, not render an
    /// error page.
    #[error("No refresh token available")]
    NoRefreshToken { consent_url: String },

    #[error("Token refresh error: {0}")]
    TokenRefresh(String),

    #[error("Transient provider error: {0}")]
    Transient(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Cookie error: {0}")]
    Cookie(String),

    #[error("Serde error: {0}")]
    Serde(String),
}
