//! User directory service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use clients::{ClientError, UserDirectory};
use common::{AccessToken, Identity, UserId};
use tokio::sync::RwLock;

use crate::accounts::Accounts;
use crate::config::{AdminSeed, UserSettings};
use crate::error::UserError;
use crate::models::{
    AccessGrant, LoginRequest, ProfileUpdate, ProfileView, RefreshRequest, Registration,
    TokenKind, TokenPair, User,
};

/// Registration, login, and token resolution with tracing and metrics.
///
/// Cheap to clone; clones share one account table.
#[derive(Debug, Clone)]
pub struct UserService {
    accounts: Arc<RwLock<Accounts>>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl UserService {
    pub fn new(settings: &UserSettings) -> Self {
        Self {
            accounts: Arc::new(RwLock::new(Accounts::new())),
            access_ttl: settings.access_ttl,
            refresh_ttl: settings.refresh_ttl,
        }
    }

    #[tracing::instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: Registration) -> Result<User, UserError> {
        let user = self
            .accounts
            .write()
            .await
            .register(registration, false, Utc::now())?;
        metrics::counter!("user_registrations_total").increment(1);
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Creates the staff account, or promotes an existing user with that email.
    #[tracing::instrument(skip(self, seed), fields(email = %seed.email))]
    pub async fn seed_admin(&self, seed: &AdminSeed) -> Result<User, UserError> {
        let mut accounts = self.accounts.write().await;
        if let Some(existing) = accounts.find_by_email(&seed.email) {
            let id = existing.id;
            return accounts.set_staff(id, true);
        }

        let username = seed
            .email
            .split_once('@')
            .map(|(local, _)| local.to_string())
            .unwrap_or_else(|| seed.email.clone());
        let user = accounts.register(
            Registration {
                email: seed.email.clone(),
                username,
                password: seed.password.clone(),
                password_confirm: None,
                first_name: String::new(),
                last_name: String::new(),
            },
            true,
            Utc::now(),
        )?;
        tracing::info!(user_id = %user.id, "staff account seeded");
        Ok(user)
    }

    #[tracing::instrument(skip_all)]
    pub async fn login(&self, request: LoginRequest) -> Result<TokenPair, UserError> {
        let (email, password) = match (request.email.as_deref(), request.password.as_deref()) {
            (Some(e), Some(p)) if !e.trim().is_empty() && !p.is_empty() => (e, p),
            _ => return Err(UserError::MissingCredentials),
        };

        let mut accounts = self.accounts.write().await;
        let user = match accounts.authenticate(email, password) {
            Ok(user) => user.clone(),
            Err(e) => {
                metrics::counter!("logins_total", "outcome" => "rejected").increment(1);
                tracing::warn!("login rejected");
                return Err(e);
            }
        };

        let now = Utc::now();
        let access = accounts.issue_token(user.id, TokenKind::Access, self.access_ttl, now);
        let refresh = accounts.issue_token(user.id, TokenKind::Refresh, self.refresh_ttl, now);
        metrics::counter!("logins_total", "outcome" => "success").increment(1);
        tracing::info!(user_id = %user.id, "user logged in");

        Ok(TokenPair {
            access,
            refresh,
            user: user.info(),
        })
    }

    /// Issues a new access token for a valid refresh token.
    #[tracing::instrument(skip_all)]
    pub async fn refresh(&self, request: RefreshRequest) -> Result<AccessGrant, UserError> {
        let token = request
            .refresh
            .filter(|t| !t.trim().is_empty())
            .ok_or(UserError::MissingRefreshToken)?;

        let mut accounts = self.accounts.write().await;
        let now = Utc::now();
        let user_id = accounts
            .resolve_token(token.trim(), TokenKind::Refresh, now)
            .map(|u| u.id)
            .ok_or(UserError::InvalidRefreshToken)?;

        let access = accounts.issue_token(user_id, TokenKind::Access, self.access_ttl, now);
        metrics::counter!("tokens_refreshed_total").increment(1);
        Ok(AccessGrant { access })
    }

    /// Resolves an access token to its owner's identity.
    pub async fn identity(&self, token: &AccessToken) -> Result<Identity, UserError> {
        self.accounts
            .read()
            .await
            .resolve_token(token.as_str(), TokenKind::Access, Utc::now())
            .map(User::identity)
            .ok_or(UserError::InvalidToken)
    }

    pub async fn profile(&self, token: &AccessToken) -> Result<ProfileView, UserError> {
        let identity = self.identity(token).await?;
        let accounts = self.accounts.read().await;
        Ok(accounts.user(identity.user_id)?.profile_view())
    }

    #[tracing::instrument(skip_all)]
    pub async fn update_profile(
        &self,
        token: &AccessToken,
        update: ProfileUpdate,
    ) -> Result<ProfileView, UserError> {
        let identity = self.identity(token).await?;
        let user = self
            .accounts
            .write()
            .await
            .update_profile(identity.user_id, update)?;
        tracing::info!(user_id = %user.id, "profile updated");
        Ok(user.profile_view())
    }

    /// Activates or deactivates a user. Inactive users cannot log in and
    /// their tokens stop resolving.
    #[tracing::instrument(skip(self))]
    pub async fn set_active(&self, user_id: UserId, active: bool) -> Result<(), UserError> {
        self.accounts.write().await.set_active(user_id, active)
    }
}

impl Default for UserService {
    fn default() -> Self {
        Self::new(&UserSettings::default())
    }
}

/// Lets the cart and order services resolve tokens in-process.
#[async_trait]
impl UserDirectory for UserService {
    async fn user_from_token(&self, token: &AccessToken) -> Result<Option<Identity>, ClientError> {
        Ok(self.identity(token).await.ok())
    }
}
