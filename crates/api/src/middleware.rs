//! API middleware.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use admarket_common::AppResult;
use admarket_core::{
    AccountService, AdminUserService, AppealService, BookingService, GateDecision, Identity,
    MessagingService, ModerationService, NotificationService, PaymentService, RoleGateService,
    RouteAccess, SessionService, SESSION_COOKIE,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub account_service: AccountService,
    pub session_service: SessionService,
    pub gate_service: RoleGateService,
    pub moderation_service: ModerationService,
    pub appeal_service: AppealService,
    pub admin_service: AdminUserService,
    pub messaging_service: MessagingService,
    pub notification_service: NotificationService,
    pub booking_service: BookingService,
    pub payment_service: PaymentService,
    pub secure_cookies: bool,
    pub session_days: i64,
}

impl AppState {
    /// Run the role gate for a route and return the redirect to serve
    /// instead of the handler, if any.
    pub async fn check_access(
        &self,
        identity: Option<&Identity>,
        access: RouteAccess,
    ) -> AppResult<Option<Response>> {
        let decision = self.gate_service.evaluate(identity, access).await?;
        Ok(redirect_for(&decision))
    }
}

/// Map a gate decision to its redirect response. `Allow` maps to `None`.
fn redirect_for(decision: &GateDecision) -> Option<Response> {
    let location = match decision {
        GateDecision::Allow => return None,
        GateDecision::RedirectLogin => "/login".to_string(),
        GateDecision::RedirectSuspended => "/suspended".to_string(),
        GateDecision::RedirectDashboard(role) => format!("/{}/dashboard", role.as_str()),
    };
    Some(
        (
            StatusCode::SEE_OTHER,
            [(header::LOCATION, location)],
        )
            .into_response(),
    )
}

/// Authentication middleware.
///
/// Resolves the session token from the `auth_token` cookie or the
/// `Authorization: Bearer` header and inserts the verified identity into
/// request extensions. Invalid or absent tokens leave the request anonymous.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let jar = CookieJar::from_headers(req.headers());
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| bearer_token(&req));

    if let Some(token) = token
        && let Some(identity) = state.session_service.verify(&token)
    {
        req.extensions_mut().insert(identity);
    }

    next.run(req).await
}

fn bearer_token(req: &Request<Body>) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(ToString::to_string)
}
