//! Authenticated identities and capability checks.
//!
//! A request is authenticated by resolving its bearer token to an
//! [`Identity`] through the user directory. Handlers then ask
//! [`authorize`] whether that identity holds the [`Capability`] the
//! operation needs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::UserId;

/// Opaque bearer token presented by a caller.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Parses the value of an `Authorization` header.
    ///
    /// Only the `Bearer` scheme is accepted; the scheme name is matched
    /// case-insensitively and an empty token is rejected.
    pub fn from_authorization_header(value: &str) -> Option<Self> {
        let (scheme, token) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("bearer") {
            return None;
        }
        let token = token.trim();
        if token.is_empty() {
            return None;
        }
        Some(Self::new(token))
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the value to send in an `Authorization` header.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(**redacted**)")
    }
}

/// The caller a request acts on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
}

impl Identity {
    /// Returns `"first last"`, trimmed; empty when neither is set.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Operations guarded by an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Read and mutate one's own cart.
    ManageCart,
    /// Place an order from one's own cart.
    PlaceOrder,
    /// Read one's own orders and statistics.
    ViewOrders,
    /// Move any order through its status lifecycle.
    ManageOrderStatus,
}

impl Capability {
    /// Returns true if only staff identities hold this capability.
    pub fn requires_staff(&self) -> bool {
        matches!(self, Capability::ManageOrderStatus)
    }

    /// Returns the capability name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ManageCart => "manage_cart",
            Capability::PlaceOrder => "place_order",
            Capability::ViewOrders => "view_orders",
            Capability::ManageOrderStatus => "manage_order_status",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authentication and authorization failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("Authentication credentials were not provided.")]
    MissingToken,

    #[error("Given token not valid.")]
    InvalidToken,

    #[error("You do not have permission to perform this action ({capability}).")]
    Forbidden { capability: Capability },
}

/// Checks that `identity` holds `capability`.
pub fn authorize(identity: &Identity, capability: Capability) -> Result<(), AuthError> {
    if capability.requires_staff() && !identity.is_staff {
        return Err(AuthError::Forbidden { capability });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(is_staff: bool) -> Identity {
        Identity {
            user_id: UserId::new(1),
            email: "ada@example.com".to_string(),
            username: "ada".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            is_staff,
        }
    }

    #[test]
    fn parses_bearer_header() {
        let token = AccessToken::from_authorization_header("Bearer abc123").unwrap();
        assert_eq!(token.as_str(), "abc123");

        let token = AccessToken::from_authorization_header("bearer  xyz ").unwrap();
        assert_eq!(token.as_str(), "xyz");
    }

    #[test]
    fn rejects_other_schemes_and_empty_tokens() {
        assert!(AccessToken::from_authorization_header("Basic abc").is_none());
        assert!(AccessToken::from_authorization_header("Bearer ").is_none());
        assert!(AccessToken::from_authorization_header("Bearer").is_none());
        assert!(AccessToken::from_authorization_header("").is_none());
    }

    #[test]
    fn token_debug_is_redacted() {
        let token = AccessToken::new("secret");
        assert!(!format!("{token:?}").contains("secret"));
        assert_eq!(token.authorization_header(), "Bearer secret");
    }

    #[test]
    fn customers_hold_customer_capabilities() {
        let customer = identity(false);
        assert!(authorize(&customer, Capability::ManageCart).is_ok());
        assert!(authorize(&customer, Capability::PlaceOrder).is_ok());
        assert!(authorize(&customer, Capability::ViewOrders).is_ok());
        assert_eq!(
            authorize(&customer, Capability::ManageOrderStatus),
            Err(AuthError::Forbidden {
                capability: Capability::ManageOrderStatus
            })
        );
    }

    #[test]
    fn staff_hold_every_capability() {
        let staff = identity(true);
        assert!(authorize(&staff, Capability::ManageOrderStatus).is_ok());
        assert!(authorize(&staff, Capability::PlaceOrder).is_ok());
    }

    #[test]
    fn full_name_trims_missing_parts() {
        let mut id = identity(false);
        assert_eq!(id.full_name(), "Ada Lovelace");
        id.last_name.clear();
        assert_eq!(id.full_name(), "Ada");
        id.first_name.clear();
        assert_eq!(id.full_name(), "");
    }
}
