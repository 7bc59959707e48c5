//! Authentication endpoints.

use axum::{extract::State, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;

use admarket_common::AppResult;
use admarket_core::{LoginInput, SignupInput, UserSummary, SESSION_COOKIE};

use crate::{middleware::AppState, response::ApiResponse};

/// Authenticated session response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: UserSummary,
}

fn session_cookie(state: &AppState, token: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, token);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(state.secure_cookies);
    cookie.set_max_age(time::Duration::days(state.session_days));
    cookie
}

fn expired_cookie(state: &AppState) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(SameSite::Lax);
    cookie.set_secure(state.secure_cookies);
    cookie.set_max_age(time::Duration::ZERO);
    cookie
}

/// Create a new advertiser or publisher account and start a session.
async fn signup(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<SignupInput>,
) -> AppResult<(CookieJar, ApiResponse<SessionResponse>)> {
    let user = state.account_service.signup(input).await?;
    let token = state.session_service.issue(&user)?;

    Ok((
        jar.add(session_cookie(&state, token)),
        ApiResponse::ok(SessionResponse {
            user: UserSummary::from(&user),
        }),
    ))
}

/// Sign in to an existing account and set the session cookie.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> AppResult<(CookieJar, ApiResponse<SessionResponse>)> {
    let user = state.account_service.login(input).await?;
    let token = state.session_service.issue(&user)?;

    tracing::info!(user_id = %user.id, role = %user.role.as_str(), "User logged in");

    Ok((
        jar.add(session_cookie(&state, token)),
        ApiResponse::ok(SessionResponse {
            user: UserSummary::from(&user),
        }),
    ))
}

/// Logout response.
#[derive(Serialize)]
pub struct LogoutResponse {
    pub ok: bool,
}

/// Clear the session cookie.
async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, ApiResponse<LogoutResponse>) {
    (
        jar.add(expired_cookie(&state)),
        ApiResponse::ok(LogoutResponse { ok: true }),
    )
}

/// Create the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}
