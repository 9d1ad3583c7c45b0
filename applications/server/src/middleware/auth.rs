/// Authentication middleware
use crate::{error::ServerError, state::AppState};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use contacts_core::Identity;

/// Identity of the caller, stored in request extensions
/// Can be used as an extractor in handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Identity);

impl AuthenticatedUser {
    pub fn identity(&self) -> &Identity {
        &self.0
    }
}

/// Middleware that resolves Basic or Bearer credentials into an identity
///
/// Requests without credentials continue as anonymous; the permission gate
/// decides what they may do.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|h| {
            h.to_str()
                .map_err(|_| ServerError::Auth("Invalid authorization header".to_string()))
        })
        .transpose()?;

    let identity = state
        .auth_service
        .resolve_identity(state.db.as_ref(), header)
        .await
        .map_err(|e| {
            tracing::warn!("Authentication failed: {}", e);
            e
        })?;

    tracing::debug!("Request authenticated as {}", identity.username());
    request.extensions_mut().insert(AuthenticatedUser(identity));

    Ok(next.run(request).await)
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .unwrap_or(AuthenticatedUser(Identity::Anonymous)))
    }
}
