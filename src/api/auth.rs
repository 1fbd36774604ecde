//! Authentication API endpoints
//!
//! Token issuance and revocation:
//! - POST /api/auth/token/login/ - exchange email + password for a token
//! - POST /api/auth/token/logout/ - revoke the presented token

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::services::{LoginInput, ServiceError};

/// Request body for token login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response carrying the issued token
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub auth_token: String,
}

/// POST /api/auth/token/login/ - issue a session token
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), ApiError> {
    let session = state
        .user_service
        .login(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await
        .map_err(|e| match e {
            // Bad credentials answer 401, not the generic 403
            ServiceError::Permission(msg) => ApiError::unauthorized(msg),
            other => ApiError::from(other),
        })?;

    Ok((
        StatusCode::CREATED,
        Json(TokenResponse {
            auth_token: session.id,
        }),
    ))
}

/// POST /api/auth/token/logout/ - revoke the presented token
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Token ").or_else(|| v.strip_prefix("Bearer ")))
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    state.user_service.logout(token).await.map_err(|e| match e {
        // An unknown token is an auth failure from the caller's view
        ServiceError::NotFound(_) => ApiError::unauthorized("Invalid token"),
        other => ApiError::from(other),
    })?;

    Ok(StatusCode::NO_CONTENT)
}
