//! Authentication middleware for Axum
//!
//! Resolves the `Authorization: Bearer <jwt>` header into an [`AuthContext`]
//! before the GraphQL handler runs. Authentication here is optional: a
//! missing, malformed or expired token leaves the caller anonymous and the
//! resolver access levels decide what that caller may do.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::domain::{AuthContext, UserRepositoryInterface};
use crate::infrastructure::crypto::JwtAuthPayloadIssuer;

/// State needed to turn a bearer token into a user.
#[derive(Clone)]
pub struct AuthState {
    pub issuer: Arc<JwtAuthPayloadIssuer>,
    pub store: Arc<dyn UserRepositoryInterface>,
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the caller of a request. Never fails.
pub async fn resolve_auth_context(state: &AuthState, headers: &HeaderMap) -> AuthContext {
    let Some(token) = headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_token)
    else {
        return AuthContext::anonymous();
    };

    let claims = match state.issuer.verify(token) {
        Ok(claims) => claims,
        Err(e) => {
            debug!(error = %e, "Rejected bearer token");
            return AuthContext::anonymous();
        }
    };

    match state.store.get_by_id(&claims.sub).await {
        Ok(Some(user)) => AuthContext::authenticated(user),
        Ok(None) => {
            debug!(user_id = %claims.sub, "Token subject no longer exists");
            AuthContext::anonymous()
        }
        Err(e) => {
            warn!(user_id = %claims.sub, error = %e, "Failed to load token subject");
            AuthContext::anonymous()
        }
    }
}

/// Optional authentication middleware; always inserts an [`AuthContext`].
pub async fn auth_context_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let ctx = resolve_auth_context(&auth_state, request.headers()).await;
    request.extensions_mut().insert(ctx);
    next.run(request).await
}
