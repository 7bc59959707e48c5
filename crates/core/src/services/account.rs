//! Account service: signup and the login precondition chain.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use admarket_common::{AppError, AppResult, IdGenerator};
use admarket_db::{
    entities::user::{self, Role},
    repositories::UserRepository,
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Input for creating a marketplace account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(min = 1, max = 128))]
    pub first_name: String,

    #[validate(length(min = 1, max = 128))]
    pub last_name: String,

    /// `publisher` or `advertiser`. Admin accounts are created only
    /// through the admin back office.
    pub role: String,
}

/// Input for logging in.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    #[validate(length(min = 1))]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// User summary returned to clients. Never includes credential or
/// suspension internals beyond the flag.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    pub is_suspended: bool,
}

impl From<&user::Model> for UserSummary {
    fn from(u: &user::Model) -> Self {
        Self {
            id: u.id.clone(),
            email: u.email.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            role: u.role,
            is_suspended: u.is_suspended,
        }
    }
}

/// Account service for signup and login.
#[derive(Clone)]
pub struct AccountService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl AccountService {
    /// Create a new account service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a publisher or advertiser account.
    ///
    /// Accounts are born verified and activated: there is no email
    /// delivery pipeline here, and both flags remain admin-togglable
    /// through the back office.
    pub async fn signup(&self, input: SignupInput) -> AppResult<user::Model> {
        input.validate()?;

        let role = match Role::parse(&input.role) {
            Some(Role::Admin) | None => {
                return Err(AppError::Validation(
                    "Role must be publisher or advertiser".to_string(),
                ));
            }
            Some(role) => role,
        };

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            email: Set(input.email.clone()),
            email_lower: Set(input.email.to_lowercase()),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            role: Set(role),
            password_hash: Set(password_hash),
            is_email_verified: Set(true),
            is_activated: Set(true),
            is_suspended: Set(false),
            suspension_reason: Set(None),
            suspended_at: Set(None),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;

        tracing::info!(user_id = %user.id, role = role.as_str(), "Account created");

        Ok(user)
    }

    /// Authenticate a user.
    ///
    /// Preconditions checked in order: user exists, password matches,
    /// email verified, account activated. The first two collapse to the
    /// same generic credential error so responses cannot be used to
    /// enumerate registered emails. Suspension does not block login;
    /// the role gate handles suspended users after authentication.
    pub async fn login(&self, input: LoginInput) -> AppResult<user::Model> {
        input.validate()?;

        let user = self
            .user_repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        if !user.is_email_verified {
            return Err(AppError::EmailNotVerified);
        }

        if !user.is_activated {
            return Err(AppError::AccountNotActive);
        }

        tracing::info!(user_id = %user.id, "Login succeeded");

        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }
}

/// Hash a password with argon2.
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
pub fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
