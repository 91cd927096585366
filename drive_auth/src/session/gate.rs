use std::sync::Arc;

use chrono::Utc;

use crate::errors::AuthError;
use crate::oauth2::{AuthOutcome, TokenPair, TokenProvider, get_or_refresh_credentials};
use crate::storage::TokenStore;

use super::store::SessionStore;

/// The per-request view of an authenticated user: who they are and the
/// tokens the request should use. `refreshed` marks a pair minted during
/// this request that still has to be written back.
#[derive(Debug, Clone)]
pub struct GateContext {
    pub user_id: String,
    pub tokens: TokenPair,
    refreshed: bool,
}

impl GateContext {
    pub fn was_refreshed(&self) -> bool {
        self.refreshed
    }
}

/// What the gate decided about a request before it reaches a handler.
#[derive(Debug)]
pub enum GateOutcome {
    Proceed(GateContext),
    Unauthenticated,
}

/// Front door for every request: resolves the session cookie to a user,
/// hydrates their token pair, refreshes it when expired, and writes refreshed
/// pairs back after the handler ran.
pub struct SessionGate {
    provider: Arc<dyn TokenProvider>,
    tokens: Arc<dyn TokenStore>,
    sessions: SessionStore,
}

impl SessionGate {
    pub fn new(provider: Arc<dyn TokenProvider>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            provider,
            tokens,
            sessions: SessionStore::default(),
        }
    }

    /// Run the OAuth2 callback handshake for an authorization code.
    pub async fn handle_callback(&self, code: &str, state: &str) -> Result<AuthOutcome, AuthError> {
        get_or_refresh_credentials(self.provider.as_ref(), self.tokens.as_ref(), code, state).await
    }

    pub async fn create_session(&self, user_id: &str) -> Result<String, AuthError> {
        self.sessions.create(user_id).await
    }

    pub async fn destroy_session(&self, session_id: &str) {
        self.sessions.remove(session_id).await;
    }

    /// Gate a request by its session cookie. A missing or unknown session is
    /// `Unauthenticated`, never an error.
    pub async fn authenticate(&self, session_id: Option<&str>) -> Result<GateOutcome, AuthError> {
        let Some(session_id) = session_id else {
            return Ok(GateOutcome::Unauthenticated);
        };
        let Some(user_id) = self.sessions.lookup(session_id).await else {
            return Ok(GateOutcome::Unauthenticated);
        };
        self.authorize_user(&user_id).await
    }

    /// Hydrate the stored token pair for `user_id`, refreshing it first when
    /// the access token has expired.
    ///
    /// A failed refresh means the refresh token was revoked or the provider
    /// is unreachable; either way the user has to re-consent, so the request
    /// is treated as unauthenticated rather than failed.
    pub async fn authorize_user(&self, user_id: &str) -> Result<GateOutcome, AuthError> {
        let Some(tokens) = self.tokens.get(user_id).await? else {
            return Ok(GateOutcome::Unauthenticated);
        };

        if !tokens.is_expired(Utc::now()) {
            return Ok(GateOutcome::Proceed(GateContext {
                user_id: user_id.to_string(),
                tokens,
                refreshed: false,
            }));
        }

        if !tokens.has_refresh_token() {
            tracing::debug!("Expired access token and no refresh token for {user_id}");
            return Ok(GateOutcome::Unauthenticated);
        }

        match self.provider.refresh(&tokens).await {
            Ok(fresh) => Ok(GateOutcome::Proceed(GateContext {
                user_id: user_id.to_string(),
                tokens: fresh,
                refreshed: true,
            })),
            Err(e) => {
                tracing::warn!("Token refresh failed for {user_id}: {e}");
                Ok(GateOutcome::Unauthenticated)
            }
        }
    }

    /// Write a refreshed pair back to the store. Runs after the handler,
    /// regardless of whether the handler succeeded.
    pub async fn persist(&self, ctx: &GateContext) -> Result<(), AuthError> {
        if ctx.refreshed {
            self.tokens.put(&ctx.user_id, &ctx.tokens).await?;
        }
        Ok(())
    }
}
