use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
    pub token_type: TokenType,
    #[serde(default)]
    pub jti: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

fn sign(claims: &Claims, config: &Config) -> AppResult<String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to sign token: {}", e)))
}

pub fn create_access_token(user_id: Uuid, email: &str, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    sign(
        &Claims {
            sub: user_id,
            email: email.to_string(),
            exp: (now + Duration::seconds(config.jwt_access_ttl_secs)).timestamp(),
            iat: now.timestamp(),
            token_type: TokenType::Access,
            jti: None,
        },
        config,
    )
}

pub fn create_refresh_token(user_id: Uuid, email: &str, config: &Config) -> AppResult<String> {
    let now = Utc::now();
    sign(
        &Claims {
            sub: user_id,
            email: email.to_string(),
            exp: (now + Duration::seconds(config.jwt_refresh_ttl_secs)).timestamp(),
            iat: now.timestamp(),
            token_type: TokenType::Refresh,
            jti: Some(Uuid::new_v4()),
        },
        config,
    )
}

pub fn create_token_pair(user_id: Uuid, email: &str, config: &Config) -> AppResult<TokenPair> {
    Ok(TokenPair {
        access_token: create_access_token(user_id, email, config)?,
        refresh_token: create_refresh_token(user_id, email, config)?,
        expires_in: config.jwt_access_ttl_secs,
    })
}

/// SHA-256 of a raw token, lowercase hex. Refresh tokens are stored
/// hashed; the raw token never touches the database.
pub fn hash_token(raw_token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw_token.as_bytes());
    format!("{:x}", hasher.finalize())
}

pub fn verify_token(token: &str, config: &Config) -> AppResult<TokenData<Claims>> {
    let mut validation = Validation::default();
    validation.validate_exp = true;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::Unauthorized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: String::new(),
            host: String::new(),
            port: 0,
            frontend_url: String::new(),
            jwt_secret: "test-secret".into(),
            jwt_access_ttl_secs: 900,
            jwt_refresh_ttl_secs: 604800,
            claude_api_key: String::new(),
            claude_model: String::new(),
            weather_api_key: String::new(),
            weather_api_url: String::new(),
            embedding_api_url: String::new(),
            embedding_model: String::new(),
            embedding_delay_ms: 0,
            embedding_max_chunk_chars: 1000,
        }
    }

    #[test]
    fn access_token_round_trips() {
        let config = test_config();
        let user_id = Uuid::new_v4();
        let token = create_access_token(user_id, "a@b.c", &config).unwrap();
        let data = verify_token(&token, &config).unwrap();
        assert_eq!(data.claims.sub, user_id);
        assert_eq!(data.claims.token_type, TokenType::Access);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let config = test_config();
        let token = create_access_token(Uuid::new_v4(), "a@b.c", &config).unwrap();
        let mut other = test_config();
        other.jwt_secret = "different".into();
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn hash_token_is_stable_hex() {
        let h = hash_token("abc");
        assert_eq!(h.len(), 64);
        assert_eq!(h, hash_token("abc"));
        assert_ne!(h, hash_token("abd"));
    }
}
