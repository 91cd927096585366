use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// An OAuth2 access/refresh token pair.
///
/// If `refresh_token` is absent and the access token is expired, the pair is
/// unusable and the user must be sent back through the consent flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenPair {
    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// The provider-side subject the tokens belong to. Used solely as the lookup
/// key into the token store; immutable once fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
}

/// Tokens plus the identity they were issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub identity: UserIdentity,
    pub tokens: TokenPair,
}

/// Outcome of an authorization attempt. Callers must handle all three cases;
/// "redirect required" is an outcome, not an error.
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    Authorized(Credential),
    RedirectRequired(String),
    Unauthenticated,
}

// The token endpoint response. Google omits refresh_token on repeat consents.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) refresh_token: Option<String>,
    pub(crate) expires_in: Option<i64>,
}

impl TokenResponse {
    pub(crate) fn into_token_pair(self, now: DateTime<Utc>) -> TokenPair {
        TokenPair {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: self.expires_in.map(|secs| now + Duration::seconds(secs)),
        }
    }
}

// The user data we'll get back from the userinfo endpoint. An empty or
// missing id is a failure, never "anonymous".
#[derive(Debug, Deserialize)]
pub(crate) struct ProviderUserInfo {
    #[serde(default)]
    pub(crate) id: String,
    #[serde(default)]
    pub(crate) email: String,
}

/// What the user asked for when the provider UI launched the app, decoded
/// from the opaque `state` query parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchIntent {
    Open { file_id: String },
    Create { folder_id: Option<String> },
}

// Attacker-observable input; parse leniently and never error.
#[derive(Debug, Default, Deserialize)]
struct DriveLaunchState {
    #[serde(default)]
    ids: Vec<String>,
    #[serde(default)]
    action: Option<String>,
    #[serde(default, rename = "folderId", alias = "parentId")]
    folder_id: Option<String>,
}

impl LaunchIntent {
    /// Decode the Drive launch state. Malformed or empty input yields `None`
    /// (show the editor home) rather than an error.
    pub fn from_state(state: Option<&str>) -> Option<LaunchIntent> {
        let raw = state?.trim();
        if raw.is_empty() {
            return None;
        }
        let decoded: DriveLaunchState = match serde_json::from_str(raw) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::debug!("Ignoring malformed launch state: {e}");
                return None;
            }
        };
        if let Some(file_id) = decoded.ids.into_iter().next() {
            return Some(LaunchIntent::Open { file_id });
        }
        if decoded.folder_id.is_some() || decoded.action.as_deref() == Some("create") {
            return Some(LaunchIntent::Create {
                folder_id: decoded.folder_id,
            });
        }
        None
    }
}
