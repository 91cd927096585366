use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::config::SESSION_COOKIE_MAX_AGE;
use crate::errors::AuthError;
use crate::utils::gen_random_string;

struct SessionRecord {
    user_id: String,
    expires_at: DateTime<Utc>,
}

/// In-process session id to user id bindings. Sessions only prove who the
/// browser is; the tokens themselves live in the token store.
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl SessionStore {
    /// Mint a new session bound to `user_id` and return its id. Abandoned
    /// sessions are swept here, so the map stays bounded by sign-in rate
    /// rather than process lifetime.
    pub async fn create(&self, user_id: &str) -> Result<String, AuthError> {
        let session_id = gen_random_string(32)?;
        let now = Utc::now();
        let record = SessionRecord {
            user_id: user_id.to_string(),
            expires_at: now + Duration::seconds(*SESSION_COOKIE_MAX_AGE as i64),
        };
        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, r| r.expires_at > now);
        sessions.insert(session_id.clone(), record);
        Ok(session_id)
    }

    /// Resolve a session id to its user id. Expired sessions are dropped on
    /// lookup.
    pub async fn lookup(&self, session_id: &str) -> Option<String> {
        {
            let sessions = self.sessions.read().await;
            match sessions.get(session_id) {
                Some(record) if record.expires_at > Utc::now() => {
                    return Some(record.user_id.clone());
                }
                Some(_) => {}
                None => return None,
            }
        }
        self.remove(session_id).await;
        None
    }

    pub async fn remove(&self, session_id: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id);
    }
}
