//! In-memory user and token tables.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Duration, Utc};
use common::{IdSequence, UserId};

use crate::credentials::{PasswordHash, generate_token, token_digest};
use crate::error::UserError;
use crate::models::{ProfileUpdate, Registration, TokenKind, TokenRecord, User};

const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Default)]
pub struct Accounts {
    users: BTreeMap<UserId, User>,
    /// Keyed by token digest.
    tokens: HashMap<String, TokenRecord>,
    ids: IdSequence,
}

impl Accounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        registration: Registration,
        is_staff: bool,
        now: DateTime<Utc>,
    ) -> Result<User, UserError> {
        let email = validate_email(&registration.email)?;
        let username = registration.username.trim().to_string();
        if username.is_empty() {
            return Err(UserError::Validation(
                "This field may not be blank: username.".to_string(),
            ));
        }
        if registration.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(UserError::Validation(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters."
            )));
        }
        if registration
            .password_confirm
            .as_deref()
            .is_some_and(|confirm| confirm != registration.password)
        {
            return Err(UserError::Validation("Passwords do not match.".to_string()));
        }
        if self.find_by_email(&email).is_some() {
            return Err(UserError::DuplicateEmail);
        }
        if self.users.values().any(|u| u.username == username) {
            return Err(UserError::DuplicateUsername);
        }

        let user = User {
            id: UserId::new(self.ids.next_value()),
            email,
            username,
            first_name: registration.first_name.trim().to_string(),
            last_name: registration.last_name.trim().to_string(),
            password: PasswordHash::new(&registration.password),
            is_active: true,
            is_staff,
            profile: Default::default(),
            date_joined: now,
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn find_by_email(&self, email: &str) -> Option<&User> {
        let email = email.trim();
        self.users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
    }

    pub fn user(&self, user_id: UserId) -> Result<&User, UserError> {
        self.users.get(&user_id).ok_or(UserError::NotFound)
    }

    /// Checks credentials. Unknown emails, wrong passwords, and inactive
    /// users are indistinguishable to the caller.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<&User, UserError> {
        self.find_by_email(email)
            .filter(|u| u.password.verify(password) && u.is_active)
            .ok_or(UserError::InvalidCredentials)
    }

    /// Issues a token of `kind` for `user_id`, valid for `ttl`.
    pub fn issue_token(
        &mut self,
        user_id: UserId,
        kind: TokenKind,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> String {
        self.tokens.retain(|_, record| record.expires_at > now);

        let token = generate_token();
        self.tokens.insert(
            token_digest(&token),
            TokenRecord {
                user_id,
                kind,
                expires_at: now + ttl,
            },
        );
        token
    }

    /// Resolves an unexpired token of `kind` to its active owner.
    pub fn resolve_token(&self, token: &str, kind: TokenKind, now: DateTime<Utc>) -> Option<&User> {
        let record = self.tokens.get(&token_digest(token))?;
        if record.kind != kind || record.expires_at <= now {
            return None;
        }
        self.users.get(&record.user_id).filter(|u| u.is_active)
    }

    pub fn update_profile(
        &mut self,
        user_id: UserId,
        update: ProfileUpdate,
    ) -> Result<User, UserError> {
        let user = self.users.get_mut(&user_id).ok_or(UserError::NotFound)?;
        if let Some(first_name) = update.first_name {
            user.first_name = first_name.trim().to_string();
        }
        if let Some(last_name) = update.last_name {
            user.last_name = last_name.trim().to_string();
        }
        if let Some(phone) = update.phone {
            user.profile.phone = phone.trim().to_string();
        }
        if let Some(address) = update.address {
            user.profile.address = address;
        }
        Ok(user.clone())
    }

    pub fn set_active(&mut self, user_id: UserId, active: bool) -> Result<(), UserError> {
        let user = self.users.get_mut(&user_id).ok_or(UserError::NotFound)?;
        user.is_active = active;
        Ok(())
    }

    pub fn set_staff(&mut self, user_id: UserId, staff: bool) -> Result<User, UserError> {
        let user = self.users.get_mut(&user_id).ok_or(UserError::NotFound)?;
        user.is_staff = staff;
        Ok(user.clone())
    }
}

fn validate_email(email: &str) -> Result<String, UserError> {
    let email = email.trim();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.') && !domain.contains('@'));
    if !valid {
        return Err(UserError::Validation(
            "Enter a valid email address.".to_string(),
        ));
    }
    Ok(email.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(email: &str, username: &str) -> Registration {
        Registration {
            email: email.to_string(),
            username: username.to_string(),
            password: "password123".to_string(),
            password_confirm: None,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        }
    }

    #[test]
    fn register_validates_input() {
        let mut accounts = Accounts::new();
        let now = Utc::now();

        let err = accounts
            .register(registration("not-an-email", "ada"), false, now)
            .unwrap_err();
        assert!(matches!(err, UserError::Validation(_)));

        let mut short = registration("ada@example.com", "ada");
        short.password = "short".to_string();
        assert!(matches!(
            accounts.register(short, false, now),
            Err(UserError::Validation(_))
        ));

        let mut mismatch = registration("ada@example.com", "ada");
        mismatch.password_confirm = Some("password124".to_string());
        assert!(matches!(
            accounts.register(mismatch, false, now),
            Err(UserError::Validation(_))
        ));
    }

    #[test]
    fn email_and_username_are_unique() {
        let mut accounts = Accounts::new();
        let now = Utc::now();
        accounts
            .register(registration("ada@example.com", "ada"), false, now)
            .unwrap();

        assert_eq!(
            accounts
                .register(registration("ADA@example.com", "other"), false, now)
                .unwrap_err(),
            UserError::DuplicateEmail
        );
        assert_eq!(
            accounts
                .register(registration("bob@example.com", "ada"), false, now)
                .unwrap_err(),
            UserError::DuplicateUsername
        );
    }

    #[test]
    fn authenticate_rejects_wrong_password_and_inactive_users() {
        let mut accounts = Accounts::new();
        let user = accounts
            .register(registration("ada@example.com", "ada"), false, Utc::now())
            .unwrap();

        assert!(accounts.authenticate("ada@example.com", "password123").is_ok());
        assert_eq!(
            accounts.authenticate("ada@example.com", "wrong").unwrap_err(),
            UserError::InvalidCredentials
        );

        accounts.set_active(user.id, false).unwrap();
        assert_eq!(
            accounts
                .authenticate("ada@example.com", "password123")
                .unwrap_err(),
            UserError::InvalidCredentials
        );
    }

    #[test]
    fn tokens_expire_and_are_kind_specific() {
        let mut accounts = Accounts::new();
        let now = Utc::now();
        let user = accounts
            .register(registration("ada@example.com", "ada"), false, now)
            .unwrap();

        let access = accounts.issue_token(user.id, TokenKind::Access, Duration::minutes(5), now);
        assert_eq!(
            accounts
                .resolve_token(&access, TokenKind::Access, now)
                .map(|u| u.id),
            Some(user.id)
        );
        assert!(
            accounts
                .resolve_token(&access, TokenKind::Refresh, now)
                .is_none()
        );
        assert!(
            accounts
                .resolve_token(&access, TokenKind::Access, now + Duration::minutes(6))
                .is_none()
        );
    }

    #[test]
    fn expired_tokens_are_pruned_on_issue() {
        let mut accounts = Accounts::new();
        let now = Utc::now();
        let user = accounts
            .register(registration("ada@example.com", "ada"), false, now)
            .unwrap();

        accounts.issue_token(user.id, TokenKind::Access, Duration::seconds(1), now);
        accounts.issue_token(
            user.id,
            TokenKind::Access,
            Duration::seconds(1),
            now + Duration::seconds(10),
        );
        assert_eq!(accounts.tokens.len(), 1);
    }

    #[test]
    fn profile_update_is_partial() {
        let mut accounts = Accounts::new();
        let user = accounts
            .register(registration("ada@example.com", "ada"), false, Utc::now())
            .unwrap();

        let updated = accounts
            .update_profile(
                user.id,
                ProfileUpdate {
                    phone: Some(" 555-0100 ".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.profile.phone, "555-0100");
        assert_eq!(updated.first_name, "Ada");
    }
}
