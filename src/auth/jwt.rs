use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by tokens from the identity provider. Only the subject is
/// consumed here; it becomes the acting user on every write.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, ttl: Duration) -> Self {
        Self {
            sub: user_id,
            exp: (Utc::now() + ttl).timestamp(),
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
    fn token_carries_subject() {
        let user_id = Uuid::now_v7();
        let token = encode_token(&Claims::new(user_id, Duration::minutes(5)), "secret").unwrap();
        let claims = decode_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, user_id);
    }

    #[test]
    fn token_rejected_with_wrong_secret() {
        let token = encode_token(&Claims::new(Uuid::now_v7(), Duration::minutes(5)), "secret").unwrap();
        assert!(decode_token(&token, "other").is_err());
    }

    #[test]
    fn expired_token_rejected() {
        let token = encode_token(&Claims::new(Uuid::now_v7(), Duration::hours(-1)), "secret").unwrap();
        assert!(decode_token(&token, "secret").is_err());
    }
}
