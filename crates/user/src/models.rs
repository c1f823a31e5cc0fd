//! User records and the payloads exchanged over the API.

use chrono::{DateTime, Utc};
use clients::UserInfo;
use common::{Identity, UserId};
use serde::{Deserialize, Serialize};

use crate::credentials::PasswordHash;

/// Contact details kept alongside a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub phone: String,
    pub address: String,
}

/// A registered user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: PasswordHash,
    pub is_active: bool,
    pub is_staff: bool,
    pub profile: Profile,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn identity(&self) -> Identity {
        Identity {
            user_id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            is_staff: self.is_staff,
        }
    }

    pub fn info(&self) -> UserInfo {
        UserInfo::from(&self.identity())
    }

    pub fn profile_view(&self) -> ProfileView {
        ProfileView {
            id: self.id,
            email: self.email.clone(),
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            is_staff: self.is_staff,
            phone: self.profile.phone.clone(),
            address: self.profile.address.clone(),
            date_joined: self.date_joined,
        }
    }
}

/// Payload of `POST /api/users/register/`.
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
    /// When present it must equal `password`.
    #[serde(default)]
    pub password_confirm: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// A user together with its profile, as returned by the profile endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub phone: String,
    pub address: String,
    pub date_joined: DateTime<Utc>,
}

/// Profile fields a user may change; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshRequest {
    pub refresh: Option<String>,
}

/// Tokens issued on login.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    pub user: UserInfo,
}

/// A new access token issued from a refresh token.
#[derive(Debug, Clone, Serialize)]
pub struct AccessGrant {
    pub access: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

/// What a stored token digest grants.
#[derive(Debug, Clone)]
pub struct TokenRecord {
    pub user_id: UserId,
    pub kind: TokenKind,
    pub expires_at: DateTime<Utc>,
}
