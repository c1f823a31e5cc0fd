//! User service settings beyond the shared server config.

use chrono::Duration;

/// Token lifetimes and the optional staff account seeded at start-up.
///
/// Reads:
/// - `ACCESS_TOKEN_TTL_SECS` (default: `3600`)
/// - `REFRESH_TOKEN_TTL_SECS` (default: `86400`)
/// - `ADMIN_EMAIL` / `ADMIN_PASSWORD`: both must be set to seed a staff user
#[derive(Debug, Clone)]
pub struct UserSettings {
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub admin: Option<AdminSeed>,
}

/// Credentials of the staff account created at start-up.
#[derive(Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for AdminSeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminSeed")
            .field("email", &self.email)
            .field("password", &"**redacted**")
            .finish()
    }
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            access_ttl: Duration::seconds(3600),
            refresh_ttl: Duration::seconds(86_400),
            admin: None,
        }
    }
}

impl UserSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let seconds = |key: &str| {
            lookup(key)
                .and_then(|v| v.parse::<i64>().ok())
                .filter(|s| *s > 0)
                .map(Duration::seconds)
        };

        let admin = match (lookup("ADMIN_EMAIL"), lookup("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => {
                Some(AdminSeed { email, password })
            }
            _ => None,
        };

        Self {
            access_ttl: seconds("ACCESS_TOKEN_TTL_SECS").unwrap_or(defaults.access_ttl),
            refresh_ttl: seconds("REFRESH_TOKEN_TTL_SECS").unwrap_or(defaults.refresh_ttl),
            admin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_env() {
        let settings = UserSettings::from_lookup(|_| None);
        assert_eq!(settings.access_ttl, Duration::hours(1));
        assert_eq!(settings.refresh_ttl, Duration::days(1));
        assert!(settings.admin.is_none());
    }

    #[test]
    fn admin_seed_needs_both_values() {
        let settings = UserSettings::from_lookup(|key| match key {
            "ADMIN_EMAIL" => Some("root@example.com".to_string()),
            _ => None,
        });
        assert!(settings.admin.is_none());

        let settings = UserSettings::from_lookup(|key| match key {
            "ADMIN_EMAIL" => Some("root@example.com".to_string()),
            "ADMIN_PASSWORD" => Some("s3cretpass".to_string()),
            "ACCESS_TOKEN_TTL_SECS" => Some("60".to_string()),
            _ => None,
        });
        let admin = settings.admin.unwrap();
        assert_eq!(admin.email, "root@example.com");
        assert!(!format!("{admin:?}").contains("s3cretpass"));
        assert_eq!(settings.access_ttl, Duration::seconds(60));
    }
}
