use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::user::Role;

#[derive(Debug, Error)]
pub(crate) enum JwtError {
    #[error("token encode failed")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("token decode/validation failed")]
    Decode(#[source] jsonwebtoken::errors::Error),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub(crate) struct Claims {
    pub(crate) user_id: i64,
    pub(crate) role: Role,
    pub(crate) iat: i64,
    pub(crate) exp: i64,
}

/// Issues and verifies HS256 session tokens. Tokens are stateless: there is
/// no revocation list, a token stays valid until `exp`.
pub(crate) struct JwtService {
    secret: String,
    ttl_seconds: i64,
}

impl JwtService {
    const DEFAULT_TTL_SECONDS: i64 = 12 * 60 * 60;
    const ALGORITHM: Algorithm = Algorithm::HS256;

    pub(crate) fn new(secret: &str, ttl_seconds: i64) -> Self {
        let ttl_seconds = if ttl_seconds > 0 {
            ttl_seconds
        } else {
            Self::DEFAULT_TTL_SECONDS
        };

        JwtService {
            secret: secret.into(),
            ttl_seconds,
        }
    }

    pub(crate) fn ttl_seconds(&self) -> i64 {
        self.ttl_seconds
    }

    pub(crate) fn generate_token(&self, user_id: i64, role: Role) -> Result<String, JwtError> {
        self.generate_token_at(user_id, role, Utc::now())
    }

    pub(crate) fn generate_token_at(
        &self,
        user_id: i64,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<String, JwtError> {
        let claims = Claims {
            user_id,
            role,
            iat: issued_at.timestamp(),
            exp: (issued_at + Duration::seconds(self.ttl_seconds)).timestamp(),
        };

        encode(
            &Header::new(Self::ALGORITHM),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(JwtError::Encode)
    }

    /// Rejects bad signatures, expired tokens and any header algorithm other than HS256.
    pub(crate) fn verify_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Self::ALGORITHM);
        validation.validate_exp = true;
        validation.leeway = 10;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(JwtError::Decode)?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};

    use super::{Claims, JwtService};
    use crate::domain::user::Role;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn service() -> JwtService {
        JwtService::new(SECRET, 12 * 60 * 60)
    }

    #[test]
    fn issued_token_round_trips_claims() {
        let jwt = service();
        let token = jwt.generate_token(42, Role::Admin).expect("token");

        let claims = jwt.verify_token(&token).expect("must verify");
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 12 * 60 * 60);
    }

    #[test]
    fn token_is_accepted_before_expiry_and_rejected_after() {
        let jwt = service();

        let fresh = jwt
            .generate_token_at(1, Role::User, Utc::now() - Duration::hours(11))
            .expect("token");
        assert!(jwt.verify_token(&fresh).is_ok());

        let stale = jwt
            .generate_token_at(1, Role::User, Utc::now() - Duration::hours(13))
            .expect("token");
        assert!(jwt.verify_token(&stale).is_err());
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = JwtService::new("ffffffffffffffffffffffffffffffff", 3600);
        let token = other.generate_token(1, Role::User).expect("token");

        assert!(service().verify_token(&token).is_err());
    }

    #[test]
    fn token_with_other_hmac_algorithm_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            user_id: 1,
            role: Role::Admin,
            iat: now,
            exp: now + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS384),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .expect("token");

        assert!(service().verify_token(&token).is_err());
    }

    #[test]
    fn unsigned_token_is_rejected() {
        let jwt = service();
        let token = jwt.generate_token(1, Role::Admin).expect("token");
        let payload = token.split('.').nth(1).expect("payload segment");

        // {"alg":"none","typ":"JWT"}
        let unsigned = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{payload}.");
        assert!(jwt.verify_token(&unsigned).is_err());
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let jwt = service();
        let user_token = jwt.generate_token(1, Role::User).expect("token");
        let admin_token = jwt.generate_token(1, Role::Admin).expect("token");

        let user_parts: Vec<&str> = user_token.split('.').collect();
        let admin_parts: Vec<&str> = admin_token.split('.').collect();
        let forged = format!("{}.{}.{}", user_parts[0], admin_parts[1], user_parts[2]);

        assert!(jwt.verify_token(&forged).is_err());
    }
}
