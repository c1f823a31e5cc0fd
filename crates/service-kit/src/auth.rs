//! Bearer-token authentication for request handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use clients::UserDirectory;
use common::{AccessToken, AuthError, Capability, Identity, authorize};

use crate::error::ApiError;

/// Extracts the bearer token from the `Authorization` header.
///
/// A missing header is rejected with `401` before the handler runs. The
/// token is only resolved to an identity by [`authenticate`].
#[derive(Debug, Clone)]
pub struct Bearer(pub AccessToken);

impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingToken)?;
        let value = header.to_str().map_err(|_| AuthError::InvalidToken)?;
        let token = AccessToken::from_authorization_header(value).ok_or(AuthError::InvalidToken)?;
        Ok(Bearer(token))
    }
}

/// Resolves `token` to the identity it belongs to.
///
/// Unknown tokens give `401`; an unreachable user directory gives `502`.
pub async fn authenticate(
    users: &dyn UserDirectory,
    token: &AccessToken,
) -> Result<Identity, ApiError> {
    users
        .user_from_token(token)
        .await?
        .ok_or_else(|| AuthError::InvalidToken.into())
}

/// Authenticates `token` and checks the identity holds `capability`.
pub async fn authorize_request(
    users: &dyn UserDirectory,
    token: &AccessToken,
    capability: Capability,
) -> Result<Identity, ApiError> {
    let identity = authenticate(users, token).await?;
    authorize(&identity, capability)?;
    Ok(identity)
}
