//! User directory HTTP handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use clients::UserInfo;
use service_kit::{ApiError, Bearer};

use crate::models::{
    AccessGrant, LoginRequest, ProfileUpdate, ProfileView, RefreshRequest, Registration, TokenPair,
};
use crate::service::UserService;

/// POST /api/users/register/
pub async fn register(
    State(service): State<UserService>,
    Json(registration): Json<Registration>,
) -> Result<(StatusCode, Json<UserInfo>), ApiError> {
    let user = service.register(registration).await?;
    Ok((StatusCode::CREATED, Json(user.info())))
}

/// GET /api/users/profile/
pub async fn get_profile(
    State(service): State<UserService>,
    Bearer(token): Bearer,
) -> Result<Json<ProfileView>, ApiError> {
    Ok(Json(service.profile(&token).await?))
}

/// PUT /api/users/profile/
pub async fn update_profile(
    State(service): State<UserService>,
    Bearer(token): Bearer,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ProfileView>, ApiError> {
    Ok(Json(service.update_profile(&token, update).await?))
}

/// POST /api/auth/login/
pub async fn login(
    State(service): State<UserService>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    Ok(Json(service.login(request).await?))
}

/// POST /api/auth/refresh/
pub async fn refresh(
    State(service): State<UserService>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<AccessGrant>, ApiError> {
    Ok(Json(service.refresh(request).await?))
}

/// GET /api/auth/user-info/: identity behind the bearer token.
pub async fn user_info(
    State(service): State<UserService>,
    Bearer(token): Bearer,
) -> Result<Json<UserInfo>, ApiError> {
    let identity = service.identity(&token).await?;
    Ok(Json(UserInfo::from(&identity)))
}
