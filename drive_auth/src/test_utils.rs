//! Shared fixtures for the in-crate test modules.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::errors::AuthError;
use crate::oauth2::{TokenPair, TokenProvider, UserIdentity};
use crate::storage::TokenStore;

/// Load `.env_test` so the env-backed config statics resolve without real
/// credentials. Safe to call from every test; later calls are no-ops.
pub(crate) fn init_test_env() {
    let _ = dotenvy::from_filename(".env_test");
}

pub(crate) fn pair(access: &str, refresh: Option<&str>) -> TokenPair {
    TokenPair {
        access_token: access.to_string(),
        refresh_token: refresh.map(String::from),
        expires_at: None,
    }
}

pub(crate) fn expired_pair(access: &str, refresh: Option<&str>) -> TokenPair {
    TokenPair {
        expires_at: Some(Utc::now() - Duration::seconds(60)),
        ..pair(access, refresh)
    }
}

pub(crate) fn user(id: &str, email: &str) -> UserIdentity {
    UserIdentity {
        id: id.to_string(),
        email: email.to_string(),
    }
}

/// Scripted provider: each endpoint returns its stubbed response once.
/// Calling an endpoint that was not stubbed fails the test.
#[derive(Default)]
pub(crate) struct StubProvider {
    exchange: Mutex<Option<Result<TokenPair, AuthError>>>,
    identity: Mutex<Option<Result<UserIdentity, AuthError>>>,
    refresh: Mutex<Option<Result<TokenPair, AuthError>>>,
}

impl StubProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_exchange(self, result: Result<TokenPair, AuthError>) -> Self {
        *self.exchange.lock().unwrap() = Some(result);
        self
    }

    pub(crate) fn with_identity(self, result: Result<UserIdentity, AuthError>) -> Self {
        *self.identity.lock().unwrap() = Some(result);
        self
    }

    pub(crate) fn with_refresh(self, result: Result<TokenPair, AuthError>) -> Self {
        *self.refresh.lock().unwrap() = Some(result);
        self
    }
}

#[async_trait]
impl TokenProvider for StubProvider {
    async fn exchange_code(&self, _code: &str) -> Result<TokenPair, AuthError> {
        self.exchange
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| panic!("unexpected exchange_code call"))
    }

    async fn fetch_user_identity(&self, _tokens: &TokenPair) -> Result<UserIdentity, AuthError> {
        self.identity
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| panic!("unexpected fetch_user_identity call"))
    }

    async fn refresh(&self, _tokens: &TokenPair) -> Result<TokenPair, AuthError> {
        self.refresh
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| panic!("unexpected refresh call"))
    }
}

/// Wraps a real store and counts operations, for asserting what the flow did
/// and did not touch.
pub(crate) struct RecordingStore<S> {
    inner: S,
    gets: AtomicUsize,
    puts: AtomicUsize,
}

impl<S: TokenStore> RecordingStore<S> {
    pub(crate) fn new(inner: S) -> Self {
        Self {
            inner,
            gets: AtomicUsize::new(0),
            puts: AtomicUsize::new(0),
        }
    }

    pub(crate) fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub(crate) fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<S: TokenStore> TokenStore for RecordingStore<S> {
    async fn get(&self, user_id: &str) -> Result<Option<TokenPair>, AuthError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(user_id).await
    }

    async fn put(&self, user_id: &str, tokens: &TokenPair) -> Result<(), AuthError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.inner.put(user_id, tokens).await
    }
}
