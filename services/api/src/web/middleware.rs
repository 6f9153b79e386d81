//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.
//!
//! Tokens are the mock bearer scheme the frontend speaks: `mock-token-<uuid>`
//! for a specific user, or the literal `mock-token-default`, which resolves
//! to the first registered user. This is stand-in auth, not real security.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::state::AppState;

/// What a bearer token resolves to before the database is consulted.
#[derive(Debug, PartialEq, Eq)]
pub enum TokenClaim {
    User(Uuid),
    Default,
}

/// Strips the `Bearer ` and `mock-token-` wrappers and parses what remains.
/// Both prefixes are optional, so a bare `<uuid>` or `default` also resolves.
pub fn parse_token(header_value: &str) -> Result<TokenClaim, ApiError> {
    let token = header_value.strip_prefix("Bearer ").unwrap_or(header_value);
    let raw = token.strip_prefix("mock-token-").unwrap_or(token);

    if raw == "default" {
        return Ok(TokenClaim::Default);
    }
    Uuid::parse_str(raw)
        .map(TokenClaim::User)
        .map_err(|_| ApiError::Unauthorized("Invalid Authentication Token".to_string()))
}

/// Middleware that validates the mock bearer token and resolves the user.
///
/// If valid, inserts the `User` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing Authentication Token".to_string()))?;

    let user = match parse_token(header_value)? {
        TokenClaim::User(id) => state.db.get_user_by_id(id).await.map_err(|e| {
            error!("Failed to resolve user from token: {:?}", e);
            ApiError::Unauthorized("Invalid Authentication Token".to_string())
        })?,
        TokenClaim::Default => state
            .db
            .first_user()
            .await
            .map_err(|e| {
                error!("Failed to look up default user: {:?}", e);
                ApiError::Unauthorized("Invalid Authentication Token".to_string())
            })?
            .ok_or_else(|| {
                ApiError::Unauthorized("No default user found. Register first.".to_string())
            })?,
    };

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_user_token() {
        let id = Uuid::new_v4();
        let claim = parse_token(&format!("Bearer mock-token-{id}")).unwrap();
        assert_eq!(claim, TokenClaim::User(id));
    }

    #[test]
    fn parses_default_token() {
        assert_eq!(
            parse_token("Bearer mock-token-default").unwrap(),
            TokenClaim::Default
        );
    }

    #[test]
    fn parses_bare_uuid_without_mock_prefix() {
        let id = Uuid::new_v4();
        let claim = parse_token(&format!("Bearer {id}")).unwrap();
        assert_eq!(claim, TokenClaim::User(id));
    }

    #[test]
    fn parses_bare_default_without_mock_prefix() {
        assert_eq!(parse_token("Bearer default").unwrap(), TokenClaim::Default);
    }

    #[test]
    fn tolerates_missing_bearer_prefix() {
        assert_eq!(
            parse_token("mock-token-default").unwrap(),
            TokenClaim::Default
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_token("Bearer whatever").is_err());
        assert!(parse_token("Bearer mock-token-not-a-uuid").is_err());
    }
}
