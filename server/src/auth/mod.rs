//! Password hashing and user lookup shared across handlers.

pub mod handlers;
pub mod session;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::DateTime;
use sqlx::SqlitePool;

use shared_types::{Network, Region, UserProfile};

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[derive(sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: String,
    pub email: String,
    pub name: String,
    pub region: Option<String>,
    pub network: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: i64,
}

impl UserRow {
    pub(crate) fn into_profile(self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email,
            name: self.name,
            region: self.region.as_deref().and_then(|r| r.parse::<Region>().ok()),
            network: self
                .network
                .as_deref()
                .and_then(|n| n.parse::<Network>().ok()),
            avatar_url: self.avatar_url,
            created_at: DateTime::from_timestamp(self.created_at, 0).unwrap_or_default(),
        }
    }
}

const PROFILE_COLUMNS: &str = "id, email, name, region, network, avatar_url, created_at";

pub(crate) async fn fetch_profile(
    pool: &SqlitePool,
    user_id: &str,
) -> Result<Option<UserProfile>, sqlx::Error> {
    let row: Option<UserRow> =
        sqlx::query_as(&format!("SELECT {PROFILE_COLUMNS} FROM users WHERE id = ?"))
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(UserRow::into_profile))
}

pub(crate) async fn fetch_all_profiles(
    pool: &SqlitePool,
) -> Result<Vec<UserProfile>, sqlx::Error> {
    let rows: Vec<UserRow> = sqlx::query_as(&format!(
        "SELECT {PROFILE_COLUMNS} FROM users ORDER BY created_at DESC, id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(UserRow::into_profile).collect())
}
