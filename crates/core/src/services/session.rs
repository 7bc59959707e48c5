//! Session token issuance and verification.
//!
//! Sessions are stateless HS256 JWTs. There is exactly one issuance path
//! and one verification path; no session record is kept server-side, so
//! logout is purely client-side cookie clearing.

use admarket_common::{AppError, AppResult, Config};
use admarket_db::entities::user::{self, Role};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "auth_token";

/// JWT claims carried by the session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    pub email: String,
    pub role: String,
    pub first_name: String,
    pub last_name: String,
    /// Issued-at, unix seconds.
    pub iat: i64,
    /// Expiry, unix seconds.
    pub exp: i64,
}

/// A verified identity extracted from a session token.
///
/// Only authentication data. Suspension state is deliberately absent:
/// it is re-read from the user table by the role gate on every request.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
}

/// Session service: issues and verifies session tokens.
#[derive(Clone)]
pub struct SessionService {
    secret: String,
    session_days: i64,
}

impl SessionService {
    /// Create a new session service.
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            secret: config.auth.jwt_secret.clone(),
            session_days: config.auth.session_days,
        }
    }

    /// Issue a session token for a user.
    pub fn issue(&self, user: &user::Model) -> AppResult<String> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::days(self.session_days)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign session token: {e}")))
    }

    /// Verify a session token.
    ///
    /// Every failure mode (bad signature, tampered payload, expired,
    /// malformed) collapses to `None`; callers cannot distinguish them.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<Identity> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .ok()?;

        let role = Role::parse(&data.claims.role)?;

        Some(Identity {
            user_id: data.claims.sub,
            email: data.claims.email,
            role,
            first_name: data.claims.first_name,
            last_name: data.claims.last_name,
        })
    }
}
