use super::{
    error::{ApiError, AuthFailure},
    AppState,
};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

/// Rejects any request that does not carry `Authorization: Bearer <token>`
/// with the configured token.
pub async fn require_bearer_token(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    check(request.headers(), &app_state.bearer_token).map_err(ApiError::Unauthorized)?;
    Ok(next.run(request).await)
}

fn check(headers: &HeaderMap, expected: &str) -> Result<(), AuthFailure> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthFailure::CredentialsRequired)?
        .to_str()
        .map_err(|_| AuthFailure::CredentialsBadFormat)?;
    let parts = value.split(' ').collect::<Vec<_>>();
    let [scheme, token] = parts[..] else {
        return Err(AuthFailure::CredentialsBadFormat);
    };
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthFailure::InvalidToken);
    }
    if bool::from(token.as_bytes().ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        Err(AuthFailure::InvalidToken)
    }
}
