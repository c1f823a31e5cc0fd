//! User directory contract and HTTP adapter.

use async_trait::async_trait;
use common::{AccessToken, Identity};
use reqwest::{Client, StatusCode};

use crate::error::ClientError;
use crate::http::{self, HttpClientConfig};
use crate::models::UserInfo;

const SERVICE: &str = "user-service";

/// Resolves bearer tokens to identities.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns the identity owning `token`, or `Ok(None)` if the token is
    /// unknown, expired, or belongs to an inactive user.
    async fn user_from_token(&self, token: &AccessToken) -> Result<Option<Identity>, ClientError>;
}

/// [`UserDirectory`] over the user service's REST API.
#[derive(Debug, Clone)]
pub struct HttpUserDirectory {
    config: HttpClientConfig,
    http: Client,
}

impl HttpUserDirectory {
    /// Creates an adapter sharing `http` for connection pooling.
    pub fn new(config: HttpClientConfig, http: Client) -> Self {
        Self { config, http }
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    #[tracing::instrument(skip_all)]
    async fn user_from_token(&self, token: &AccessToken) -> Result<Option<Identity>, ClientError> {
        let request = self
            .http
            .get(self.config.url("/api/auth/user-info/"))
            .bearer_auth(token.as_str());
        let response = http::send(SERVICE, request).await?;

        match response.status() {
            StatusCode::OK => {
                let info: UserInfo = http::decode(SERVICE, response).await?;
                Ok(Some(info.into()))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(None),
            _ => Err(http::rejection(SERVICE, response).await),
        }
    }
}
