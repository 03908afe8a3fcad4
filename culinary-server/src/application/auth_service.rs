use std::sync::Arc;

use tracing::error;

use crate::data::user_repository::{NewUser, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{
    LoginRequest, RegisterRequest, Role, User, normalize_new_password, normalize_username,
};
use crate::infrastructure::jwt::JwtService;
use crate::infrastructure::password::PasswordService;

#[derive(Debug, Clone)]
pub(crate) struct AuthResult {
    pub(crate) user: User,
    pub(crate) access_token: String,
}

pub(crate) struct AuthService<R: UserRepository> {
    repo: R,
    jwt: Arc<JwtService>,
    passwords: PasswordService,
}

impl<R: UserRepository> AuthService<R> {
    const DUMMY_PASSWORD_HASH: &'static str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$gwN6hT1sNdk9kI95f7n2Gl3fL0qRmBf2Ffkj2r90/0M";

    pub(crate) fn new(repo: R, jwt: Arc<JwtService>, passwords: PasswordService) -> Self {
        Self {
            repo,
            jwt,
            passwords,
        }
    }

    /// Username rules and uniqueness are checked before any password rule.
    pub(crate) async fn register(&self, req: RegisterRequest) -> Result<User, DomainError> {
        let username = normalize_username(&req.username)?;

        if self.repo.find_by_username(&username).await?.is_some() {
            return Err(DomainError::validation(
                "username",
                "username is already taken",
            ));
        }

        let password = normalize_new_password(&req.password, &req.confirm_password)?;
        let password_hash = self.passwords.hash(&password).map_err(|err| {
            error!(error = %err, "failed to hash password during registration");
            DomainError::Unexpected(err.to_string())
        })?;

        self.repo
            .create_user(NewUser {
                username,
                password_hash,
                role: Role::User,
            })
            .await
    }

    pub(crate) async fn login(&self, req: LoginRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let user_creds = match self.repo.find_by_username(&req.username).await? {
            Some(user_creds) => user_creds,
            None => {
                // keep the timing close to the wrong-password path
                let _ = self
                    .passwords
                    .verify(&req.password, Self::DUMMY_PASSWORD_HASH);
                return Err(DomainError::InvalidCredentials);
            }
        };

        let matched = self
            .passwords
            .verify(&req.password, &user_creds.password_hash)
            .map_err(|err| {
                error!(user_id = user_creds.user.id, error = %err, "stored password hash is unusable");
                DomainError::Unexpected(err.to_string())
            })?;
        if !matched {
            return Err(DomainError::InvalidCredentials);
        }

        let access_token = self
            .jwt
            .generate_token(user_creds.user.id, user_creds.user.role)
            .map_err(|err| {
                error!(user_id = user_creds.user.id, error = %err, "failed to issue session token");
                DomainError::Unexpected(err.to_string())
            })?;

        Ok(AuthResult {
            user: user_creds.user,
            access_token,
        })
    }
}
