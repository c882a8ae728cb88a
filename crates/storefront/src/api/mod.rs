//! QKart REST API client.
//!
//! # Architecture
//!
//! - The backend is the source of truth for users, products, carts and
//!   orders - NO local persistence, direct API calls
//! - The product catalog is cached in-memory via `moka` because every cart
//!   render needs it for reconciliation
//! - Authenticated calls carry the user's bearer token from the session
//!
//! # Example
//!
//! ```rust,ignore
//! use qkart_storefront::api::QKartClient;
//!
//! let client = QKartClient::new(&config.api)?;
//!
//! let login = client.login("crio.do", "learnbydoing").await?;
//! let token = SecretString::from(login.token);
//!
//! let entries = client.set_cart_quantity(&token, &product_id, 1).await?;
//! let cart = client.load_cart(&token).await?;
//! ```

mod client;

pub use client::QKartClient;

use serde::Deserialize;
use thiserror::Error;

use qkart_core::Price;

/// Toast shown when the cart cannot be loaded for a non-client error.
pub const CART_FETCH_FAILED: &str = "Could not fetch cart details. Check that the backend is running, reachable and returns valid JSON.";

/// Toast shown when the product list cannot be loaded.
pub const PRODUCTS_FETCH_FAILED: &str = "Could not fetch products. Check that the backend is running, reachable and returns valid JSON.";

/// Toast shown for any other non-client error.
pub const BACKEND_UNAVAILABLE: &str =
    "Something went wrong. Check that the backend is running, reachable and returns valid JSON.";

/// Errors that can occur when talking to the QKart backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Backend answered with a non-success status.
    #[error("Backend returned {status}: {}", .message.as_deref().unwrap_or("(no message)"))]
    Backend {
        /// HTTP status code.
        status: u16,
        /// The `message` field of the error body, when present.
        message: Option<String>,
    },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// HTTP status returned by the backend, if it answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend rejected the request as a client error (4xx).
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    /// Whether the backend rejected the bearer token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401))
    }

    /// Text to show the user.
    ///
    /// Client errors carry a message written by the backend for people
    /// ("Username is already taken"), so it is shown as-is. Anything else
    /// falls back to `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Backend {
                status: 400..=499,
                message: Some(message),
            } if !message.is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Error body returned by the backend.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Successful `POST /auth/login` response.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for authenticated calls.
    pub token: String,
    /// Canonical username.
    pub username: String,
    /// Wallet balance.
    pub balance: Price,
}
