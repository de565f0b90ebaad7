use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub login: String,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, username: String) -> Self {
        Self {
            sub: user_id,
            login: username,
            exp: (Utc::now() + Duration::hours(24)).timestamp(),
        }
    }
}

pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("JWT encode failed: {e}"))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("JWT decode failed: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let claims = Claims::new(Uuid::now_v7(), "octocat".to_string());
        let token = encode_token(&claims, "secret").unwrap();
        let decoded = decode_token(&token, "secret").unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.login, "octocat");
    }

    #[test]
    fn wrong_secret_rejected() {
        let claims = Claims::new(Uuid::now_v7(), "octocat".to_string());
        let token = encode_token(&claims, "secret").unwrap();
        assert!(decode_token(&token, "other").is_err());
    }
}
