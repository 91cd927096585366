use std::time::Duration;

use drive_auth::{AuthError, GateOutcome, SessionGate, build_consent_url};

/// A ready-to-use HTTP client for storage-provider calls on behalf of one
/// user. Handlers receive it from the gate middleware via request extensions;
/// the access token inside is already refreshed.
#[derive(Clone)]
pub struct AuthorizedClient {
    pub user_id: String,
    access_token: String,
    http: reqwest::Client,
}

impl std::fmt::Debug for AuthorizedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The access token stays out of logs.
        f.debug_struct("AuthorizedClient")
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

impl AuthorizedClient {
    pub(crate) fn new(user_id: String, access_token: String) -> Self {
        Self {
            user_id,
            access_token,
            http: build_client(),
        }
    }

    pub fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.http.get(url).bearer_auth(&self.access_token)
    }

    pub fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.http.post(url).bearer_auth(&self.access_token)
    }

    pub fn put(&self, url: &str) -> reqwest::RequestBuilder {
        self.http.put(url).bearer_auth(&self.access_token)
    }
}

fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(32)
        .build()
        .expect("Failed to create reqwest client")
}

/// Outcome of asking for an authorized client outside the middleware path.
#[derive(Debug)]
pub enum ClientAccess {
    Authorized(AuthorizedClient),
    AuthRequired { redirect_url: String },
}

/// Contract for collaborators that proxy storage-provider calls: resolve
/// `user_id` to an authorized client, refreshing and persisting tokens as
/// needed, or say where to send the user agent instead.
pub async fn with_authorized_client(
    gate: &SessionGate,
    user_id: &str,
) -> Result<ClientAccess, AuthError> {
    match gate.authorize_user(user_id).await? {
        GateOutcome::Proceed(ctx) => {
            // No post-request hook on this path, so persist up front.
            gate.persist(&ctx).await?;
            Ok(ClientAccess::Authorized(AuthorizedClient::new(
                ctx.user_id,
                ctx.tokens.access_token,
            )))
        }
        GateOutcome::Unauthenticated => Ok(ClientAccess::AuthRequired {
            redirect_url: build_consent_url("", ""),
        }),
    }
}
