// ============================
// backend-lib/src/handlers/auth.rs
// ============================
//! Signup, login, validate and logout endpoints.
use super::extract::{BearerToken, ClientIp};
use crate::auth::IssuedSession;
use crate::error::AppError;
use crate::validation::{validate_login, validate_signup};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use quickcare_common::{AccountSummary, LoginRequest, SessionResponse, SignupRequest};
use std::sync::Arc;

fn session_response(message: &str, issued: IssuedSession) -> SessionResponse {
    SessionResponse {
        message: message.to_string(),
        user: issued.account,
        token: issued.token,
    }
}

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|rejection| AppError::InvalidInput(rejection.body_text()))
}

/// `POST /api/auth/signup`
pub async fn signup(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SessionResponse>), AppError> {
    let form = validate_signup(body(payload)?)?;
    let issued = state.auth.signup(form).await?;

    Ok((
        StatusCode::CREATED,
        Json(session_response("User created successfully!", issued)),
    ))
}

/// `POST /api/auth/login`
///
/// Locked-out addresses are refused before the store is touched. Failed
/// logins count towards the lockout, a success clears it.
pub async fn login(
    State(state): State<Arc<AppState>>,
    ClientIp(ip): ClientIp,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<SessionResponse>, AppError> {
    let limiter = &state.auth_rate_limiter;
    if let Some(ip) = ip {
        if !limiter.check_rate_limit(ip) {
            return Err(AppError::AuthRateLimited);
        }
    }

    let form = validate_login(body(payload)?)?;
    match state.auth.login(form).await {
        Ok(issued) => {
            if let Some(ip) = ip {
                limiter.record_success(ip);
            }
            Ok(Json(session_response("Login successful", issued)))
        },
        Err(err) => {
            if let (Some(ip), true) = (ip, err.is_credential_failure()) {
                limiter.record_failed_attempt(ip);
            }
            Err(err)
        },
    }
}

/// `GET|POST /api/auth/validate`
pub async fn validate(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
) -> Result<Json<AccountSummary>, AppError> {
    Ok(Json(state.auth.validate(&token).await?))
}

/// `POST /api/auth/logout`
pub async fn logout(
    State(state): State<Arc<AppState>>,
    BearerToken(token): BearerToken,
) -> Result<StatusCode, AppError> {
    state.auth.logout(&token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}
