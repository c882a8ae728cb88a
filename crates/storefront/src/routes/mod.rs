//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Product grid (?q= searches), cart sidebar
//! GET  /search/suggest         - Debounced grid fragment (204 if superseded)
//! GET  /health                 - Liveness
//! GET  /health/ready           - Backend reachability
//!
//! # Cart
//! POST /cart/add               - Add from a product card (qty 1)
//! POST /cart/quantity          - Set quantity from the sidebar (0 removes)
//!
//! # Auth
//! GET  /login                  - Login page
//! POST /login                  - Login action
//! GET  /register               - Register page
//! POST /register               - Register action
//! POST /logout                 - Logout action
//!
//! # Checkout (requires auth)
//! GET  /checkout               - Cart review, addresses, wallet
//! POST /checkout               - Place order
//! POST /checkout/addresses     - Add address
//! POST /checkout/addresses/{id}/delete - Delete address
//! GET  /thanks                 - Order confirmation
//! ```

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod layout;
pub mod products;
pub mod search;

use axum::{
    Router,
    routing::{get, post},
};

use crate::config::StorefrontConfig;
use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
///
/// Form submissions are rate limited per client IP when enabled.
pub fn auth_routes(config: &StorefrontConfig) -> Router<AppState> {
    let submissions = Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register));
    let submissions = if config.rate_limit {
        submissions.layer(auth_rate_limiter())
    } else {
        submissions
    };

    Router::new()
        .route("/login", get(auth::login_page))
        .route("/register", get(auth::register_page))
        .route("/logout", post(auth::logout))
        .merge(submissions)
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/add", post(cart::add))
        .route("/quantity", post(cart::update_quantity))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show).post(checkout::place_order))
        .route("/addresses", post(checkout::add_address))
        .route("/addresses/{id}/delete", post(checkout::delete_address))
}

/// Create all routes for the storefront.
pub fn routes(config: &StorefrontConfig) -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/search/suggest", get(search::suggest))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/thanks", get(checkout::thanks))
        .nest("/cart", cart_routes())
        .nest("/checkout", checkout_routes())
        .merge(auth_routes(config))
}
