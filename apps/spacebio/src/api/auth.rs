//! # Authentication Module
//!
//! Bearer session-token authentication for the account routes.
//!
//! ## Usage
//!
//! Sign in with `POST /auth/login` and send the returned token:
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! Tokens are resolved through the identity service. A resolved token is
//! attached to the request as a [`SessionToken`] extension.

use super::{AppState, types::AuthResponse};
use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use spacebio_core::{AuthError, IdentityPlatform};

/// The caller's session token, set by [`require_session`].
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Extract the token from `Authorization: Bearer <token>`.
///
/// Raw `<token>` values are accepted too. Blank tokens are not.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty() && token != "Bearer").then_some(token)
}

/// HTTP status for an identity failure.
pub(crate) fn auth_status(error: &AuthError) -> StatusCode {
    match error {
        AuthError::UserNotFound
        | AuthError::WrongPassword
        | AuthError::InvalidCredential
        | AuthError::NotAuthenticated => StatusCode::UNAUTHORIZED,
        AuthError::InvalidEmail | AuthError::WeakPassword => StatusCode::BAD_REQUEST,
        AuthError::UserDisabled | AuthError::OperationNotAllowed => StatusCode::FORBIDDEN,
        AuthError::EmailAlreadyInUse => StatusCode::CONFLICT,
        AuthError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        AuthError::DocumentNotFound => StatusCode::NOT_FOUND,
        AuthError::NetworkRequestFailed => StatusCode::SERVICE_UNAVAILABLE,
        AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Status and body for an identity failure.
pub(crate) fn auth_failure(error: &AuthError) -> (StatusCode, Json<AuthResponse>) {
    (
        auth_status(error),
        Json(AuthResponse::failure(error.code(), error.user_message())),
    )
}

/// Session middleware for account routes.
///
/// Requests without a live session token are rejected with 401.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, Json<AuthResponse>)> {
    let Some(token) = bearer_token(request.headers()).map(str::to_string) else {
        tracing::warn!(
            event = "auth_failure",
            reason = "missing_authorization_header",
            "Missing Authorization header"
        );
        return Err(auth_failure(&AuthError::NotAuthenticated));
    };

    let resolved = state.identity.read().await.platform().current_user(&token);
    match resolved {
        Ok(account) => {
            tracing::debug!(uid = %account.uid, "Session resolved");
            request.extensions_mut().insert(SessionToken(token));
            Ok(next.run(request).await)
        }
        Err(e) => {
            tracing::warn!(
                event = "auth_failure",
                reason = e.code(),
                "Session token rejected"
            );
            Err(auth_failure(&e))
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(value) {
            headers.insert(header::AUTHORIZATION, v);
        }
        headers
    }

    #[test]
    fn bearer_and_raw_tokens_are_accepted() {
        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("abc")), Some("abc"));
    }

    #[test]
    fn blank_tokens_are_rejected() {
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn wrong_password_is_unauthorized() {
        assert_eq!(auth_status(&AuthError::WrongPassword), StatusCode::UNAUTHORIZED);
        assert_eq!(auth_status(&AuthError::EmailAlreadyInUse), StatusCode::CONFLICT);
    }
}
