//! API middleware
//!
//! Contains:
//! - the shared application state handed to every handler
//! - the structured API error envelope and its status mapping
//! - token authentication middleware (required and optional variants)

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::User;
use crate::services::{
    IngredientService, RecipeService, RelationService, ServiceError, ShoppingListService,
    TagService, UserService,
};

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub recipe_service: Arc<RecipeService>,
    pub ingredient_service: Arc<IngredientService>,
    pub tag_service: Arc<TagService>,
    pub relation_service: Arc<RelationService>,
    pub shopping_list_service: Arc<ShoppingListService>,
    /// Default page size for list endpoints
    pub page_size: u32,
}

/// Authenticated user extracted from request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

/// The viewer of a public endpoint: authenticated when a valid token was
/// presented, anonymous otherwise.
#[derive(Debug, Clone, Default)]
pub struct Viewer(pub Option<User>);

impl Viewer {
    pub fn as_user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

/// Error response for API errors
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("UNAUTHORIZED", message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new("FORBIDDEN", message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(msg) => Self::validation_error(msg),
            ServiceError::Conflict(msg) => Self::conflict(msg),
            ServiceError::NotFound(msg) => Self::not_found(msg),
            ServiceError::Permission(msg) => Self::forbidden(msg),
            ServiceError::Internal(err) => {
                tracing::error!(error = ?err, "internal service error");
                Self::internal_error("Internal server error")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.error.code.as_str() {
            "UNAUTHORIZED" => StatusCode::UNAUTHORIZED,
            "FORBIDDEN" => StatusCode::FORBIDDEN,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            // Duplicate relationship pairs answer 400, matching the
            // historical API contract
            "CONFLICT" => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(self)).into_response()
    }
}

/// Extract the auth token from the request.
///
/// Accepts both `Authorization: Token <token>` (the historical scheme) and
/// `Authorization: Bearer <token>`.
fn extract_token(request: &Request) -> Option<String> {
    let auth_header = request.headers().get(header::AUTHORIZATION)?;
    let auth_str = auth_header.to_str().ok()?;

    auth_str
        .strip_prefix("Token ")
        .or_else(|| auth_str.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}

/// Authentication middleware: rejects requests without a valid session.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&request)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    let user = state
        .user_service
        .validate_session(&token)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::unauthorized("Invalid or expired session"))?;

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

/// Optional authentication middleware: attaches the viewer when a valid
/// token is presented, passes anonymously otherwise.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) = extract_token(&request) {
        if let Ok(Some(user)) = state.user_service.validate_session(&token).await {
            request.extensions_mut().insert(AuthenticatedUser(user));
        }
    }
    next.run(request).await
}

// Extractor for AuthenticatedUser from request extensions
impl<S> axum::extract::FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

// Extractor for the optional viewer on public endpoints
impl<S> axum::extract::FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        Ok(Viewer(
            parts
                .extensions
                .get::<AuthenticatedUser>()
                .map(|au| au.0.clone()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_auth(value: &str) -> Request<Body> {
        Request::builder()
            .uri("/test")
            .header(header::AUTHORIZATION, value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_extract_token_from_token_scheme() {
        let request = request_with_auth("Token abc-123");
        assert_eq!(extract_token(&request), Some("abc-123".to_string()));
    }

    #[test]
    fn test_extract_token_from_bearer_scheme() {
        let request = request_with_auth("Bearer xyz-456");
        assert_eq!(extract_token(&request), Some("xyz-456".to_string()));
    }

    #[test]
    fn test_extract_token_none() {
        let request = Request::builder()
            .uri("/test")
            .body(Body::empty())
            .unwrap();
        assert!(extract_token(&request).is_none());

        let request = request_with_auth("Basic dXNlcjpwYXNz");
        assert!(extract_token(&request).is_none());
    }

    #[test]
    fn test_service_error_mapping() {
        let err = ApiError::from(ServiceError::Validation("bad".into()));
        assert_eq!(err.error.code, "VALIDATION_ERROR");

        let err = ApiError::from(ServiceError::Conflict("dup".into()));
        assert_eq!(err.error.code, "CONFLICT");

        let err = ApiError::from(ServiceError::NotFound("gone".into()));
        assert_eq!(err.error.code, "NOT_FOUND");

        let err = ApiError::from(ServiceError::Permission("no".into()));
        assert_eq!(err.error.code, "FORBIDDEN");

        let err = ApiError::from(ServiceError::Internal(anyhow::anyhow!("boom")));
        assert_eq!(err.error.code, "INTERNAL_ERROR");
        // Raw cause never reaches the caller
        assert!(!err.error.message.contains("boom"));
    }
}
