use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use contracts::system::auth::TokenClaims;
use contracts::system::users::User;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use once_cell::sync::OnceCell;
use rand::Rng;

use crate::shared::config;

static JWT_SECRET: OnceCell<String> = OnceCell::new();

/// Resolves the signing secret once at startup.
///
/// `auth.jwt_secret` from config wins; otherwise the secret stored in
/// sys_settings is used, generating and saving one on first start.
pub async fn init_secret() -> Result<()> {
    let secret = match config::get().auth.jwt_secret.clone() {
        Some(secret) if !secret.trim().is_empty() => secret,
        _ => match get_jwt_secret_from_db().await? {
            Some(secret) => secret,
            None => {
                let secret = generate_jwt_secret();
                save_jwt_secret_to_db(&secret).await?;
                tracing::info!("Generated new JWT secret");
                secret
            }
        },
    };
    JWT_SECRET
        .set(secret)
        .map_err(|_| anyhow::anyhow!("JWT secret already initialized"))
}

fn secret() -> Result<&'static str> {
    JWT_SECRET
        .get()
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("JWT secret is not initialized"))
}

/// Token lifetime in seconds
pub fn token_lifetime_secs() -> i64 {
    config::get().auth.token_lifetime_hours * 3600
}

/// Generate an access token for the user
pub fn generate_access_token(user: &User) -> Result<String> {
    issue_token(user, secret()?, Utc::now(), token_lifetime_secs())
}

/// Validate a token and extract its claims
pub fn validate_token(token: &str) -> Result<TokenClaims> {
    decode_token(token, secret()?)
}

pub fn issue_token(
    user: &User,
    secret: &str,
    now: DateTime<Utc>,
    lifetime_secs: i64,
) -> Result<String> {
    let claims = TokenClaims {
        sub: user.id.clone(),
        email: user.email.clone(),
        role: user.role,
        exp: (now.timestamp() + lifetime_secs) as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT token")
}

pub fn decode_token(token: &str, secret: &str) -> Result<TokenClaims> {
    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT token")?;

    Ok(token_data.claims)
}

/// Generate a random 256-bit secret
fn generate_jwt_secret() -> String {
    use base64::{engine::general_purpose, Engine as _};
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen::<u8>()).collect();
    general_purpose::STANDARD.encode(&random_bytes)
}

async fn get_jwt_secret_from_db() -> Result<Option<String>> {
    use crate::shared::data::db::get_connection;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    let result = get_connection()
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT value FROM sys_settings WHERE key = ?",
            ["jwt_secret".into()],
        ))
        .await?;

    match result {
        Some(row) => Ok(Some(row.try_get("", "value")?)),
        None => Ok(None),
    }
}

async fn save_jwt_secret_to_db(secret: &str) -> Result<()> {
    use crate::shared::data::db::get_connection;
    use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

    let now = Utc::now().to_rfc3339();
    get_connection()
        .execute(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "INSERT OR REPLACE INTO sys_settings (key, value, description, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?)",
            [
                "jwt_secret".into(),
                secret.to_string().into(),
                "Auto-generated JWT secret for authentication".into(),
                now.clone().into(),
                now.into(),
            ],
        ))
        .await
        .context("Failed to save JWT secret")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::system::users::UserRole;

    fn user(role: UserRole) -> User {
        User {
            id: "user-1".into(),
            email: "asha@example.com".into(),
            name: "Asha".into(),
            phone: None,
            role,
            is_active: true,
            created_at: Utc::now().to_rfc3339(),
            updated_at: Utc::now().to_rfc3339(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_round_trip_keeps_identity_and_role() {
        let token = issue_token(&user(UserRole::Seller), "secret", Utc::now(), 3600).unwrap();
        let claims = decode_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "asha@example.com");
        assert_eq!(claims.role, UserRole::Seller);
        assert_eq!(claims.exp - claims.iat, 3600);
        assert!(claims.can_sell());
        assert!(!claims.is_admin());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = issue_token(&user(UserRole::Customer), "secret", Utc::now(), 3600).unwrap();
        assert!(decode_token(&token, "other").is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issued = Utc::now() - chrono::Duration::hours(3);
        let token = issue_token(&user(UserRole::Admin), "secret", issued, 3600).unwrap();
        assert!(decode_token(&token, "secret").is_err());
    }

    #[test]
    fn test_generated_secret_is_random() {
        let a = generate_jwt_secret();
        assert_ne!(a, generate_jwt_secret());
        assert_eq!(a.len(), 44);
    }
}
