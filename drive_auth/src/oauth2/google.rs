use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::config::{
    AUTH_REDIRECT_URI, GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET, TOKEN_URL, USERINFO_URL,
};
use crate::errors::AuthError;

use super::provider::TokenProvider;
use super::types::{ProviderUserInfo, TokenPair, TokenResponse, UserIdentity};

/// Google's token and userinfo endpoints over reqwest.
pub struct GoogleProvider {
    client: reqwest::Client,
}

impl GoogleProvider {
    pub fn new() -> Self {
        Self {
            client: build_client(),
        }
    }
}

impl Default for GoogleProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// All outbound calls get a bounded timeout so a stalled provider endpoint
/// surfaces as a typed failure instead of hanging the request.
fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(32)
        .build()
        .expect("Failed to create reqwest client")
}

// A timed-out or unreachable endpoint is a transient failure; anything else
// keeps the operation's own error kind.
fn send_error(e: reqwest::Error, wrap: fn(String) -> AuthError) -> AuthError {
    if e.is_timeout() || e.is_connect() {
        AuthError::Transient(e.to_string())
    } else {
        wrap(e.to_string())
    }
}

#[async_trait]
impl TokenProvider for GoogleProvider {
    async fn exchange_code(&self, code: &str) -> Result<TokenPair, AuthError> {
        let response = self
            .client
            .post(TOKEN_URL.as_str())
            .form(&[
                ("code", code),
                ("client_id", GOOGLE_CLIENT_ID.as_str()),
                ("client_secret", GOOGLE_CLIENT_SECRET.as_str()),
                ("redirect_uri", AUTH_REDIRECT_URI.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| send_error(e, AuthError::CodeExchange))?;

        match response.status() {
            reqwest::StatusCode::OK => {}
            status => {
                tracing::debug!("Code exchange rejected: {:#?}", response);
                return Err(AuthError::CodeExchange(status.to_string()));
            }
        };

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::CodeExchange(e.to_string()))?;

        Ok(token_response.into_token_pair(Utc::now()))
    }

    async fn fetch_user_identity(&self, tokens: &TokenPair) -> Result<UserIdentity, AuthError> {
        let response = self
            .client
            .get(USERINFO_URL.as_str())
            .bearer_auth(&tokens.access_token)
            .send()
            .await
            .map_err(|e| send_error(e, AuthError::NoIdentity))?;

        match response.status() {
            reqwest::StatusCode::OK => {}
            status => return Err(AuthError::NoIdentity(status.to_string())),
        };

        let user_info: ProviderUserInfo = response
            .json()
            .await
            .map_err(|e| AuthError::Serde(format!("Failed to deserialize userinfo: {e}")))?;

        if user_info.id.is_empty() {
            return Err(AuthError::NoIdentity(
                "Userinfo response carried no subject id".to_string(),
            ));
        }

        tracing::debug!("Resolved identity for subject {}", user_info.id);
        Ok(UserIdentity {
            id: user_info.id,
            email: user_info.email,
        })
    }

    async fn refresh(&self, tokens: &TokenPair) -> Result<TokenPair, AuthError> {
        let refresh_token = tokens
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::TokenRefresh("No refresh token to refresh with".to_string()))?;

        let response = self
            .client
            .post(TOKEN_URL.as_str())
            .form(&[
                ("refresh_token", refresh_token),
                ("client_id", GOOGLE_CLIENT_ID.as_str()),
                ("client_secret", GOOGLE_CLIENT_SECRET.as_str()),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| send_error(e, AuthError::TokenRefresh))?;

        match response.status() {
            reqwest::StatusCode::OK => {}
            status => return Err(AuthError::TokenRefresh(status.to_string())),
        };

        let token_response: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::TokenRefresh(e.to_string()))?;

        let mut fresh = token_response.into_token_pair(Utc::now());
        // The refresh grant does not rotate the refresh token; carry the old
        // one forward when the response omits it.
        if fresh.refresh_token.is_none() {
            fresh.refresh_token = tokens.refresh_token.clone();
        }
        Ok(fresh)
    }
}
