use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub iat: i64,    // issued at
    pub exp: i64,    // expiration time
}

impl Claims {
    pub fn new(user_id: String, expiration_days: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::days(expiration_days as i64);

        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }
}

/// Issues a signed session token embedding the user id.
pub fn create_session_token(
    user_id: &str,
    secret: &str,
    expiration_days: u64,
) -> anyhow::Result<String> {
    let claims = Claims::new(user_id.to_string(), expiration_days);
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )?;

    Ok(token)
}

/// Verifies signature and expiry, returning the embedded claims.
pub fn verify_session_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let validation = Validation::default();
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &validation,
    )?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_verify_roundtrip() {
        let token = create_session_token("user-123", "secret", 30).expect("create token");
        let claims = verify_session_token(&token, "secret").expect("verify token");
        assert_eq!(claims.sub, "user-123");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = create_session_token("user-123", "secret", 30).expect("create token");
        assert!(verify_session_token(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            sub: "user-123".into(),
            iat: (Utc::now() - Duration::days(31)).timestamp(),
            exp: (Utc::now() - Duration::days(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("secret".as_ref()),
        )
        .expect("encode");
        assert!(verify_session_token(&token, "secret").is_err());
    }

    #[test]
    fn expiry_is_thirty_days_out() {
        let claims = Claims::new("user-123".into(), 30);
        let lifetime = claims.exp - claims.iat;
        assert_eq!(lifetime, 30 * 24 * 60 * 60);
    }
}
