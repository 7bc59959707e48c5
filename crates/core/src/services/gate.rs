//! Role gate: per-request authorization over fresh suspension state.

use admarket_common::AppResult;
use admarket_db::{entities::user::Role, repositories::UserRepository};

use crate::session::Identity;

/// What a protected route requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteAccess {
    /// A normal route restricted to one role.
    Role(Role),
    /// The suspended-notice surface for one role. Reachable only while
    /// actually suspended.
    SuspensionNotice(Role),
}

impl RouteAccess {
    const fn required_role(self) -> Role {
        match self {
            Self::Role(role) | Self::SuspensionNotice(role) => role,
        }
    }
}

/// Outcome of a gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Proceed to the handler.
    Allow,
    /// No identity or role mismatch: back to login.
    RedirectLogin,
    /// Suspended user on a normal route: to the suspension notice.
    RedirectSuspended,
    /// Unsuspended user on the suspension notice: to their dashboard.
    RedirectDashboard(Role),
}

/// Role gate service.
///
/// Suspension enforcement lives here (authorization), not in token
/// validity (authentication): a token issued before suspension stays
/// cryptographically valid, so the gate re-reads the user row on every
/// protected request instead of trusting anything in the token.
#[derive(Clone)]
pub struct RoleGateService {
    user_repo: UserRepository,
}

impl RoleGateService {
    /// Create a new role gate service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    /// Evaluate the decision table for one request.
    pub async fn evaluate(
        &self,
        identity: Option<&Identity>,
        access: RouteAccess,
    ) -> AppResult<GateDecision> {
        let Some(identity) = identity else {
            return Ok(GateDecision::RedirectLogin);
        };

        // Fresh read: role and suspension state come from the row, never
        // from the token.
        let Some(user) = self.user_repo.find_by_id(&identity.user_id).await? else {
            return Ok(GateDecision::RedirectLogin);
        };

        if user.role != access.required_role() {
            return Ok(GateDecision::RedirectLogin);
        }

        match (user.is_suspended, access) {
            (true, RouteAccess::Role(_)) => Ok(GateDecision::RedirectSuspended),
            (false, RouteAccess::SuspensionNotice(_)) => {
                Ok(GateDecision::RedirectDashboard(user.role))
            }
            _ => Ok(GateDecision::Allow),
        }
    }
}
