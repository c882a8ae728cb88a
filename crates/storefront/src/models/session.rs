//! Session-related types.
//!
//! Types stored in the session for authentication state.

use std::fmt;

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use qkart_core::Price;

/// Session-stored user identity.
///
/// Holds what the header, cart and checkout need: who is logged in, the
/// bearer token for backend calls, and the wallet balance reported at login
/// (reduced locally after each order).
///
/// The username is whatever the backend accepted at login. Accounts may
/// predate the registration length rule, so it is not re-validated.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Logged-in username, as returned by the backend.
    pub username: String,
    /// Backend bearer token.
    token: String,
    /// Wallet balance.
    pub balance: Price,
    /// When the user logged in.
    pub logged_in_at: DateTime<Utc>,
}

impl CurrentUser {
    /// Create a session user from a successful login.
    #[must_use]
    pub fn new(username: String, token: String, balance: Price) -> Self {
        Self {
            username,
            token,
            balance,
            logged_in_at: Utc::now(),
        }
    }

    /// The bearer token, wrapped so it is not accidentally logged.
    #[must_use]
    pub fn token(&self) -> SecretString {
        SecretString::from(self.token.clone())
    }

    /// First character of the username, upper-cased, for the header avatar.
    #[must_use]
    pub fn initial(&self) -> String {
        self.username
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }
}

impl fmt::Debug for CurrentUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurrentUser")
            .field("username", &self.username)
            .field("token", &"[REDACTED]")
            .field("balance", &self.balance)
            .field("logged_in_at", &self.logged_in_at)
            .finish()
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the pending notification shown on the next page render.
    pub const FLASH: &str = "flash";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn user() -> CurrentUser {
        CurrentUser::new(
            "crio.do".to_string(),
            "super_secret_token".to_string(),
            Price::from_dollars(5000),
        )
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug_output = format!("{:?}", user());
        assert!(debug_output.contains("crio.do"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_token"));
    }

    #[test]
    fn test_initial_accepts_short_usernames() {
        let user = CurrentUser::new("joe".to_string(), String::new(), Price::from_dollars(0));
        assert_eq!(user.initial(), "J");
        assert_eq!(user.username, "joe");
    }

    #[test]
    fn test_token_round_trips_through_session_json() {
        let json = serde_json::to_string(&user()).unwrap();
        let restored: CurrentUser = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.token().expose_secret(), "super_secret_token");
        assert_eq!(restored.balance, Price::from_dollars(5000));
    }
}
