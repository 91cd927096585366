use async_trait::async_trait;

use crate::errors::AuthError;

use super::types::{TokenPair, UserIdentity};

/// Outbound calls to the authorization provider's token and identity
/// endpoints. The production implementation is [`GoogleProvider`]; tests
/// drive the flow against a stub.
///
/// [`GoogleProvider`]: super::google::GoogleProvider
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Exchange an authorization code for a token pair.
    async fn exchange_code(&self, code: &str) -> Result<TokenPair, AuthError>;

    /// Resolve the subject the access token belongs to.
    async fn fetch_user_identity(&self, tokens: &TokenPair) -> Result<UserIdentity, AuthError>;

    /// Mint a new access token from the pair's refresh token.
    async fn refresh(&self, tokens: &TokenPair) -> Result<TokenPair, AuthError>;
}
