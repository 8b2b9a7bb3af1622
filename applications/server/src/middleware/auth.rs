/// Authentication middleware
use crate::{error::ServerError, services::AuthService};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, StatusCode},
    middleware::Next,
    response::Response,
};
use chorus_core::UserId;
use std::sync::Arc;

/// Extension type to store authenticated user ID in request
/// Can be used as an extractor in handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserId);

impl AuthenticatedUser {
    pub fn user_id(&self) -> &UserId {
        &self.0
    }
}

/// Caller identity on routes that also serve anonymous readers
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<UserId>);

impl MaybeUser {
    pub fn user_id(&self) -> Option<&UserId> {
        self.0.as_ref()
    }
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
}

/// Middleware that extracts and validates JWT from Authorization header
pub async fn auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = bearer_token(&request).ok_or(StatusCode::UNAUTHORIZED)?;

    let user_id = auth_service.verify_access_token(token).map_err(|e| {
        tracing::warn!("Token verification failed: {}", e);
        StatusCode::UNAUTHORIZED
    })?;

    request.extensions_mut().insert(AuthenticatedUser(user_id));

    Ok(next.run(request).await)
}

/// Like [`auth_middleware`] but lets requests without a token through.
///
/// A token that is present but invalid is still rejected.
pub async fn optional_auth_middleware(
    State(auth_service): State<Arc<AuthService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if let Some(token) = bearer_token(&request) {
        let user_id = auth_service.verify_access_token(token).map_err(|e| {
            tracing::warn!("Token verification failed: {}", e);
            StatusCode::UNAUTHORIZED
        })?;
        request.extensions_mut().insert(AuthenticatedUser(user_id));
    }

    Ok(next.run(request).await)
}

/// Implement FromRequestParts so AuthenticatedUser can be used as an extractor
#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ServerError::Auth("Not authenticated".to_string()))
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(
            parts
                .extensions
                .get::<AuthenticatedUser>()
                .map(|user| user.0.clone()),
        ))
    }
}
