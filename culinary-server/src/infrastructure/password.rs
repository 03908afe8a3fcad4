use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum PasswordError {
    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// Argon2id hashing with a fresh salt per call, embedded in the PHC string.
#[derive(Debug, Clone, Default)]
pub(crate) struct PasswordService;

impl PasswordService {
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) fn hash(&self, raw_password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Self::argon2()?
            .hash_password(raw_password.as_bytes(), &salt)
            .map_err(|err| PasswordError::Hash(err.to_string()))?;
        Ok(password_hash.to_string())
    }

    /// `Ok(false)` on mismatch; `Err` only when `password_hash` cannot be parsed.
    pub(crate) fn verify(
        &self,
        raw_password: &str,
        password_hash: &str,
    ) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|err| PasswordError::MalformedHash(err.to_string()))?;

        match Self::argon2()?.verify_password(raw_password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(PasswordHashError::Password) => Ok(false),
            Err(err) => Err(PasswordError::MalformedHash(err.to_string())),
        }
    }

    fn argon2() -> Result<Argon2<'static>, PasswordError> {
        let params =
            Params::new(19 * 1024, 2, 1, None).map_err(|err| PasswordError::Hash(err.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}
