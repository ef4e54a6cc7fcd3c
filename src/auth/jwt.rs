use chrono::Utc;
use jsonwebtoken::errors::{Error, ErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::models::Claims;

fn now() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

pub fn generate_token(
    user_id: u64,
    role: &str,
    email: &str,
    secret: &str,
    ttl: u64,
) -> Result<String, Error> {
    let issued = now();
    let claims = Claims {
        user_id,
        role: role.to_string(),
        email: email.to_string(),
        iat: issued,
        exp: issued + ttl,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Result<Claims, Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
}

/// Short reason reported to clients after a failed verification.
pub fn rejection_reason(err: &Error) -> &'static str {
    match err.kind() {
        ErrorKind::ExpiredSignature => "jwt expired",
        ErrorKind::InvalidSignature => "invalid signature",
        _ => "invalid token",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_with_the_same_secret() {
        let token = generate_token(7, "admin", "a@b.c", "secret", 60).unwrap();
        let claims = verify_token(&token, "secret").unwrap();
        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.role, "admin");
        assert_eq!(claims.email, "a@b.c");
        assert_eq!(claims.exp, claims.iat + 60);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_token(7, "user", "a@b.c", "secret", 60).unwrap();
        let err = verify_token(&token, "other").unwrap_err();
        assert_eq!(rejection_reason(&err), "invalid signature");
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            user_id: 1,
            role: "user".into(),
            email: "a@b.c".into(),
            iat: now() - 7200,
            exp: now() - 3600,
            jti: "x".into(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        let err = verify_token(&token, "secret").unwrap_err();
        assert_eq!(rejection_reason(&err), "jwt expired");
    }

    #[test]
    fn garbage_is_rejected() {
        let err = verify_token("not.a.jwt", "secret").unwrap_err();
        assert_eq!(rejection_reason(&err), "invalid token");
    }
}
