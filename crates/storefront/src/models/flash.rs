//! One-shot notifications.
//!
//! A [`Flash`] is written to the session by a handler (usually right before
//! a redirect) and taken out by the next page render, which shows it as a
//! toast.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use super::session_keys;

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl FlashLevel {
    /// CSS modifier class for the toast.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// A notification for the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
}

impl Flash {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Warning,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }

    /// CSS modifier class for templates.
    #[must_use]
    pub const fn class(&self) -> &'static str {
        self.level.as_str()
    }

    /// Store this notification for the next page render.
    ///
    /// Failures are logged, not returned: losing a toast must never fail
    /// the request that produced it.
    pub async fn push(self, session: &Session) {
        if let Err(e) = session.insert(session_keys::FLASH, self).await {
            tracing::error!("Failed to store flash message: {e}");
        }
    }

    /// Take the pending notification, if any.
    pub async fn take(session: &Session) -> Option<Self> {
        session
            .remove::<Self>(session_keys::FLASH)
            .await
            .ok()
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tower_sessions_moka_store::MokaStore;

    use super::*;

    #[tokio::test]
    async fn test_flash_is_taken_once() {
        let session = Session::new(None, Arc::new(MokaStore::new(None)), None);

        Flash::warning("Login to add an item to the Cart")
            .push(&session)
            .await;

        let flash = Flash::take(&session).await;
        assert_eq!(
            flash,
            Some(Flash::warning("Login to add an item to the Cart"))
        );
        assert_eq!(Flash::take(&session).await, None);
    }

    #[test]
    fn test_level_serializes_lowercase() {
        let json = serde_json::to_string(&Flash::error("boom")).unwrap_or_default();
        assert!(json.contains("\"error\""));
        assert_eq!(Flash::success("ok").class(), "success");
    }
}
