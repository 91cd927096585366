use crate::config::{AUTH_REDIRECT_URI, AUTH_SCOPES, AUTH_URL, GOOGLE_CLIENT_ID};
use crate::errors::AuthError;
use crate::storage::TokenStore;

use super::provider::TokenProvider;
use super::types::{AuthOutcome, Credential};

/// Build the provider consent URL for the configured client.
///
/// Pure construction: identical inputs yield byte-identical URLs.
/// `access_type=offline` plus `approval_prompt=force` ensures the first
/// consent returns a refresh token.
pub fn build_consent_url(state: &str, hint_email: &str) -> String {
    consent_url(
        AUTH_URL.as_str(),
        GOOGLE_CLIENT_ID.as_str(),
        AUTH_REDIRECT_URI.as_str(),
        AUTH_SCOPES.as_str(),
        state,
        hint_email,
    )
}

fn consent_url(
    auth_url: &str,
    client_id: &str,
    redirect_uri: &str,
    scopes: &str,
    state: &str,
    hint_email: &str,
) -> String {
    format!(
        "{}?response_type=code&client_id={}&redirect_uri={}&scope={}\
        &access_type=offline&approval_prompt=force&state={}&user_id={}",
        auth_url,
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(scopes),
        urlencoding::encode(state),
        urlencoding::encode(hint_email),
    )
}

/// Drive the full handshake for an OAuth2 callback: exchange the code,
/// resolve the identity, and settle on a usable token pair.
///
/// The provider only issues a refresh token on first consent. When the
/// exchange comes back without one, the previously stored pair for the same
/// identity is the active credential; only when neither source yields a
/// refresh token does the flow give up with `NoRefreshToken`, carrying the
/// consent URL the caller must redirect to.
pub async fn get_or_refresh_credentials(
    provider: &dyn TokenProvider,
    store: &dyn TokenStore,
    code: &str,
    state: &str,
) -> Result<AuthOutcome, AuthError> {
    let tokens = match provider.exchange_code(code).await {
        Ok(tokens) => tokens,
        Err(AuthError::CodeExchange(e)) => {
            // Expired or reused codes are routine; send the user back to the
            // consent page instead of failing the request.
            tracing::warn!("Code exchange failed: {e}");
            return Ok(AuthOutcome::RedirectRequired(build_consent_url(state, "")));
        }
        Err(e) => return Err(e),
    };

    let mut hint_email = String::new();
    match provider.fetch_user_identity(&tokens).await {
        Ok(identity) => {
            hint_email = identity.email.clone();
            if tokens.has_refresh_token() {
                store.put(&identity.id, &tokens).await?;
                return Ok(AuthOutcome::Authorized(Credential { identity, tokens }));
            }
            // Repeat consent: the stored pair keeps the only refresh token we
            // will ever get for this user. The fresh access token is
            // discarded; the stored pair stands unmodified until its next
            // refresh.
            if let Some(stored) = store.get(&identity.id).await? {
                if stored.has_refresh_token() {
                    tracing::debug!("Reusing stored refresh token for {}", identity.id);
                    return Ok(AuthOutcome::Authorized(Credential {
                        identity,
                        tokens: stored,
                    }));
                }
            }
        }
        Err(AuthError::NoIdentity(e)) => {
            // Without a subject id there is no store key to fall back to.
            tracing::warn!("No user id could be retrieved: {e}");
        }
        Err(e) => return Err(e),
    }

    Err(AuthError::NoRefreshToken {
        consent_url: build_consent_url(state, &hint_email),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryTokenStore;
    use crate::test_utils::{RecordingStore, StubProvider, init_test_env, pair, user};
    use proptest::prelude::*;

    #[test]
    fn test_consent_url_parameters() {
        let url = consent_url(
            "https://accounts.example.com/auth",
            "client-1",
            "https://app.example.com/",
            "scope-a scope-b",
            r#"{"ids":["f1"]}"#,
            "a@x.com",
        );
        assert!(url.starts_with("https://accounts.example.com/auth?response_type=code"));
        assert!(url.contains("&client_id=client-1"));
        assert!(url.contains("&redirect_uri=https%3A%2F%2Fapp.example.com%2F"));
        assert!(url.contains("&scope=scope-a%20scope-b"));
        assert!(url.contains("&access_type=offline"));
        assert!(url.contains("&approval_prompt=force"));
        assert!(url.contains("&state=%7B%22ids%22%3A%5B%22f1%22%5D%7D"));
        assert!(url.contains("&user_id=a%40x.com"));
    }

    #[test]
    fn test_consent_url_empty_hint() {
        let url = consent_url(
            "https://accounts.example.com/auth",
            "client-1",
            "https://app.example.com/",
            "scope-a",
            "",
            "",
        );
        assert!(url.ends_with("&state=&user_id="));
    }

    proptest! {
        // Identical inputs must give byte-identical URLs, and no raw
        // reserved characters may leak into query values.
        #[test]
        fn test_consent_url_deterministic(state in ".*", hint in ".*") {
            let a = consent_url("https://a.example/auth", "c", "https://r.example/", "s1 s2", &state, &hint);
            let b = consent_url("https://a.example/auth", "c", "https://r.example/", "s1 s2", &state, &hint);
            prop_assert_eq!(&a, &b);
            let query = a.split_once('?').unwrap().1;
            prop_assert!(!query.contains(' '));
            prop_assert!(!query.contains('#'));
        }
    }

    // End-to-end scenario 1: first consent returns a refresh token; the pair
    // is persisted under the identity id and returned as-is.
    #[tokio::test]
    async fn test_first_consent_persists_and_returns_pair() {
        init_test_env();
        let provider = StubProvider::new()
            .with_exchange(Ok(pair("T1", Some("R1"))))
            .with_identity(Ok(user("u1", "a@x.com")));
        let store = RecordingStore::new(MemoryTokenStore::default());

        let outcome = get_or_refresh_credentials(&provider, &store, "ABC123", "")
            .await
            .unwrap();

        match outcome {
            AuthOutcome::Authorized(cred) => {
                assert_eq!(cred.identity, user("u1", "a@x.com"));
                assert_eq!(cred.tokens, pair("T1", Some("R1")));
            }
            other => panic!("Expected Authorized, got {other:?}"),
        }
        // The fresh pair wins outright; the store's prior value is never read.
        assert_eq!(store.gets(), 0);
        assert_eq!(store.get("u1").await.unwrap(), Some(pair("T1", Some("R1"))));
    }

    // End-to-end scenario 2: repeat consent without a refresh token falls
    // back to the stored pair, which is returned unchanged.
    #[tokio::test]
    async fn test_repeat_consent_reuses_stored_pair() {
        init_test_env();
        let provider = StubProvider::new()
            .with_exchange(Ok(pair("T2", None)))
            .with_identity(Ok(user("u1", "a@x.com")));
        let store = MemoryTokenStore::default();
        store.put("u1", &pair("T1", Some("R1"))).await.unwrap();

        let outcome = get_or_refresh_credentials(&provider, &store, "ABC123", "")
            .await
            .unwrap();

        match outcome {
            AuthOutcome::Authorized(cred) => {
                // T2 is discarded; the stored pair stands unmodified.
                assert_eq!(cred.tokens, pair("T1", Some("R1")));
            }
            other => panic!("Expected Authorized, got {other:?}"),
        }
        assert_eq!(store.get("u1").await.unwrap(), Some(pair("T1", Some("R1"))));
    }

    // No refresh token from the exchange and nothing stored: the caller gets
    // a consent URL to redirect to, with the resolved email as the hint.
    #[tokio::test]
    async fn test_no_refresh_token_anywhere() {
        init_test_env();
        let provider = StubProvider::new()
            .with_exchange(Ok(pair("T2", None)))
            .with_identity(Ok(user("u1", "a@x.com")));
        let store = MemoryTokenStore::default();

        let result = get_or_refresh_credentials(&provider, &store, "ABC123", "").await;

        match result {
            Err(AuthError::NoRefreshToken { consent_url }) => {
                assert!(!consent_url.is_empty());
                assert!(consent_url.contains("user_id=a%40x.com"));
            }
            other => panic!("Expected NoRefreshToken, got {other:?}"),
        }
        assert_eq!(store.get("u1").await.unwrap(), None);
    }

    // A stored pair without a refresh token is as good as no stored pair.
    #[tokio::test]
    async fn test_stored_pair_without_refresh_token_is_unusable() {
        init_test_env();
        let provider = StubProvider::new()
            .with_exchange(Ok(pair("T2", None)))
            .with_identity(Ok(user("u1", "a@x.com")));
        let store = MemoryTokenStore::default();
        store.put("u1", &pair("T0", None)).await.unwrap();

        let result = get_or_refresh_credentials(&provider, &store, "ABC123", "").await;
        assert!(matches!(result, Err(AuthError::NoRefreshToken { .. })));
    }

    // End-to-end scenario 3: the provider rejects the code; the result is a
    // redirect, not an error, and the store is untouched.
    #[tokio::test]
    async fn test_code_exchange_failure_redirects() {
        init_test_env();
        let provider = StubProvider::new()
            .with_exchange(Err(AuthError::CodeExchange("400 Bad Request".to_string())));
        let store = RecordingStore::new(MemoryTokenStore::default());

        let outcome = get_or_refresh_credentials(&provider, &store, "stale", "mystate")
            .await
            .unwrap();

        match outcome {
            AuthOutcome::RedirectRequired(url) => {
                assert!(url.contains("state=mystate"));
                assert!(url.contains("user_id=")); // best-effort hint left blank
            }
            other => panic!("Expected RedirectRequired, got {other:?}"),
        }
        assert_eq!(store.gets(), 0);
        assert_eq!(store.puts(), 0);
    }

    // Identity failure cannot be recovered from within the handshake: there
    // is no key to look up a stored pair with.
    #[tokio::test]
    async fn test_identity_failure_yields_no_refresh_token() {
        init_test_env();
        let provider = StubProvider::new()
            .with_exchange(Ok(pair("T1", Some("R1"))))
            .with_identity(Err(AuthError::NoIdentity("empty subject".to_string())));
        let store = RecordingStore::new(MemoryTokenStore::default());

        let result = get_or_refresh_credentials(&provider, &store, "ABC123", "").await;

        match result {
            Err(AuthError::NoRefreshToken { consent_url }) => {
                // No identity resolved, so no email hint either.
                assert!(consent_url.contains("user_id=&") || consent_url.ends_with("user_id="));
            }
            other => panic!("Expected NoRefreshToken, got {other:?}"),
        }
        // Persisting before confirming identity would bind tokens to the
        // wrong user.
        assert_eq!(store.puts(), 0);
    }

    // Transient failures propagate as errors for the boundary to map.
    #[tokio::test]
    async fn test_transient_exchange_failure_propagates() {
        init_test_env();
        let provider = StubProvider::new()
            .with_exchange(Err(AuthError::Transient("connection reset".to_string())));
        let store = MemoryTokenStore::default();

        let result = get_or_refresh_credentials(&provider, &store, "ABC123", "").await;
        assert!(matches!(result, Err(AuthError::Transient(_))));
    }
}
