/// Token endpoints
use crate::{
    error::{Result, ServerError},
    state::AppState,
};
use axum::{extract::State, Json};
use contacts_core::IdentityStore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub token_type: String,
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let identity = state
        .auth_service
        .authenticate(state.db.as_ref(), &req.username, &req.password)
        .await?;

    let user_id = identity
        .user_id()
        .ok_or_else(|| ServerError::Internal("authenticated identity has no id".to_string()))?;

    tracing::info!("Issued tokens for {}", identity.username());

    Ok(Json(LoginResponse {
        access_token: state.auth_service.create_access_token(user_id)?,
        refresh_token: state.auth_service.create_refresh_token(user_id)?,
        token_type: "Bearer".to_string(),
    }))
}

/// POST /auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>> {
    let user_id = state
        .auth_service
        .verify_refresh_token(&req.refresh_token)?;

    // Deleted accounts cannot refresh
    state.db.get_user(user_id).await.map_err(|e| {
        if e.is_not_found() {
            ServerError::Auth("Token user no longer exists".to_string())
        } else {
            ServerError::from(e)
        }
    })?;

    Ok(Json(RefreshResponse {
        access_token: state.auth_service.create_access_token(user_id)?,
        token_type: "Bearer".to_string(),
    }))
}
