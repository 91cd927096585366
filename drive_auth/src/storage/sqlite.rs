use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use crate::errors::AuthError;
use crate::oauth2::TokenPair;

use super::store_type::TokenStore;

const DB_TABLE_STORED_TOKENS: &str = "stored_tokens";

/// Token pairs in a SQLite table, one row per provider user id.
pub struct SqliteTokenStore {
    pool: Pool<Sqlite>,
}

impl SqliteTokenStore {
    /// Open (creating the file and table if missing) the store at `url`,
    /// e.g. `sqlite:./data/tokens.db` or `sqlite::memory:`.
    pub async fn connect(url: &str) -> Result<Self, AuthError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AuthError::Storage(e.to_string()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| AuthError::Storage(e.to_string()))?;

        let store = Self { pool };
        store.create_tables().await?;
        Ok(store)
    }

    pub fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn create_tables(&self) -> Result<(), AuthError> {
        sqlx::query(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS {DB_TABLE_STORED_TOKENS} (
                user_id TEXT PRIMARY KEY NOT NULL,
                access_token TEXT NOT NULL,
                refresh_token TEXT,
                expires_at TIMESTAMP,
                updated_at TIMESTAMP NOT NULL
            )
            "#
        ))
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct StoredTokenRow {
    access_token: String,
    refresh_token: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl From<StoredTokenRow> for TokenPair {
    fn from(row: StoredTokenRow) -> Self {
        TokenPair {
            access_token: row.access_token,
            refresh_token: row.refresh_token,
            expires_at: row.expires_at,
        }
    }
}

#[async_trait]
impl TokenStore for SqliteTokenStore {
    async fn get(&self, user_id: &str) -> Result<Option<TokenPair>, AuthError> {
        let row: Option<StoredTokenRow> = sqlx::query_as(&format!(
            r#"
            SELECT access_token, refresh_token, expires_at
            FROM {DB_TABLE_STORED_TOKENS} WHERE user_id = ?
            "#
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(row.map(TokenPair::from))
    }

    async fn put(&self, user_id: &str, tokens: &TokenPair) -> Result<(), AuthError> {
        sqlx::query(&format!(
            r#"
            INSERT INTO {DB_TABLE_STORED_TOKENS}
                (user_id, access_token, refresh_token, expires_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                expires_at = excluded.expires_at,
                updated_at = excluded.updated_at
            "#
        ))
        .bind(user_id)
        .bind(&tokens.access_token)
        .bind(&tokens.refresh_token)
        .bind(tokens.expires_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| AuthError::Storage(e.to_string()))?;

        Ok(())
    }
}
