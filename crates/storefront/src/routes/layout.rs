//! Page chrome shared by every full-page template.
//!
//! Holds what `base.html` renders around the page body: the header (user
//! badge or Login/Register buttons), the pending toast and the stylesheet
//! link.

use tower_sessions::Session;

use crate::middleware::CspNonce;
use crate::models::{CurrentUser, Flash};

/// Content hash of `main.css`, set by the build script (empty if missing).
const CSS_HASH: &str = env!("CSS_HASH");

/// Logged-in user as shown in the header.
#[derive(Clone)]
pub struct HeaderUser {
    pub username: String,
    pub initial: String,
    pub balance: String,
}

impl From<&CurrentUser> for HeaderUser {
    fn from(user: &CurrentUser) -> Self {
        Self {
            username: user.username.clone(),
            initial: user.initial(),
            balance: user.balance.to_string(),
        }
    }
}

/// Page chrome for `base.html`.
pub struct Layout {
    pub user: Option<HeaderUser>,
    pub flash: Option<Flash>,
    /// Replace Login/Register with "Back to explore" (auth pages).
    pub hide_auth_buttons: bool,
    pub nonce: String,
    pub css_href: String,
}

impl Layout {
    /// Build the chrome for a page, consuming the pending toast.
    pub async fn new(session: &Session, user: Option<&CurrentUser>, nonce: CspNonce) -> Self {
        Self {
            user: user.map(HeaderUser::from),
            flash: Flash::take(session).await,
            hide_auth_buttons: false,
            nonce: nonce.0,
            css_href: css_href(),
        }
    }

    /// Chrome for the login and register pages.
    #[must_use]
    pub fn auth_page(mut self) -> Self {
        self.hide_auth_buttons = true;
        self
    }

    /// Show `flash` unless an earlier toast is already pending.
    pub fn notify(&mut self, flash: Flash) {
        if self.flash.is_none() {
            self.flash = Some(flash);
        }
    }

    /// Show `flash`, replacing any pending toast.
    #[must_use]
    pub fn with_flash(mut self, flash: Flash) -> Self {
        self.flash = Some(flash);
        self
    }
}

fn css_href() -> String {
    if CSS_HASH.is_empty() {
        "/static/css/main.css".to_string()
    } else {
        format!("/static/css/derived/main.{CSS_HASH}.css")
    }
}

/// The home page URL for a search query, so redirects keep the search.
#[must_use]
pub fn home_url(query: &str) -> String {
    let query = query.trim();
    if query.is_empty() {
        return "/".to_string();
    }
    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("q", query)
        .finish();
    format!("/?{encoded}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_home_url_keeps_search() {
        assert_eq!(home_url(""), "/");
        assert_eq!(home_url("   "), "/");
        assert_eq!(home_url("tan leather"), "/?q=tan+leather");
        assert_eq!(home_url("a&b"), "/?q=a%26b");
    }

    #[test]
    fn test_css_href_points_at_static() {
        assert!(css_href().starts_with("/static/css/"));
    }
}
