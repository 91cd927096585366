use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::errors::AuthError;
use crate::oauth2::TokenPair;

use super::store_type::TokenStore;

/// In-process store for development and tests. Tokens are lost on restart,
/// which simply sends users back through consent.
#[derive(Default)]
pub struct MemoryTokenStore {
    entries: Mutex<HashMap<String, TokenPair>>,
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn get(&self, user_id: &str) -> Result<Option<TokenPair>, AuthError> {
        let entries = self.entries.lock().await;
        Ok(entries.get(user_id).cloned())
    }

    async fn put(&self, user_id: &str, tokens: &TokenPair) -> Result<(), AuthError> {
        let mut entries = self.entries.lock().await;
        entries.insert(user_id.to_string(), tokens.clone());
        Ok(())
    }
}
