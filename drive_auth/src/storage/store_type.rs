use async_trait::async_trait;

use crate::errors::AuthError;
use crate::oauth2::TokenPair;

/// Persistence for token pairs, keyed by the provider's user id.
///
/// `put` replaces any pair already stored under the key. Implementations must
/// be safe to share across request handlers behind an `Arc`.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<TokenPair>, AuthError>;
    async fn put(&self, user_id: &str, tokens: &TokenPair) -> Result<(), AuthError>;
}
