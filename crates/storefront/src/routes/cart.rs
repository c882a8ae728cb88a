//! Cart route handlers.
//!
//! The cart lives on the backend. These handlers change it and redirect
//! back to the product grid, which re-renders the sidebar.

use axum::{Form, extract::State, response::Redirect};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use qkart_core::{ProductId, is_item_in_cart};

use super::layout::home_url;
use crate::api::{BACKEND_UNAVAILABLE, CART_FETCH_FAILED};
use crate::error::add_breadcrumb;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::Flash;
use crate::state::AppState;

/// Shown when a visitor who is not logged in clicks "Add to cart".
pub const LOGIN_TO_ADD: &str = "Login to add an item to the Cart";

/// Shown when the product is already in the cart.
pub const ALREADY_IN_CART: &str =
    "Item already in cart. Use the cart sidebar to update quantity or remove item.";

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    /// Search query to return to.
    #[serde(default)]
    pub q: String,
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    pub product_id: String,
    pub qty: u32,
    #[serde(default)]
    pub q: String,
}

/// Add a product from its card (quantity 1).
#[instrument(skip(state, session, user))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<AddToCartForm>,
) -> Redirect {
    let back = home_url(&form.q);

    let Some(user) = user else {
        Flash::warning(LOGIN_TO_ADD).push(&session).await;
        return Redirect::to(&back);
    };

    let token = user.token();
    let product_id = ProductId::new(form.product_id);

    match state.api().load_cart(&token).await {
        Ok(cart) if is_item_in_cart(&cart, &product_id) => {
            Flash::warning(ALREADY_IN_CART).push(&session).await;
        }
        Ok(_) => match state.api().set_cart_quantity(&token, &product_id, 1).await {
            Ok(_) => {
                add_breadcrumb(
                    "cart",
                    "Added product",
                    Some(&[("product_id", product_id.as_str())]),
                );
            }
            Err(e) => {
                tracing::warn!("Failed to add {product_id} to cart: {e}");
                Flash::error(e.user_message(BACKEND_UNAVAILABLE))
                    .push(&session)
                    .await;
            }
        },
        Err(e) => {
            tracing::warn!("Failed to fetch cart: {e}");
            Flash::error(e.user_message(CART_FETCH_FAILED))
                .push(&session)
                .await;
        }
    }

    Redirect::to(&back)
}

/// Set a line's quantity from the sidebar +/- controls. Zero removes it.
#[instrument(skip(state, session, user))]
pub async fn update_quantity(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<QuantityForm>,
) -> Redirect {
    let product_id = ProductId::new(form.product_id);

    if let Err(e) = state
        .api()
        .set_cart_quantity(&user.token(), &product_id, form.qty)
        .await
    {
        tracing::warn!("Failed to set quantity of {product_id}: {e}");
        Flash::error(e.user_message(BACKEND_UNAVAILABLE))
            .push(&session)
            .await;
    }

    Redirect::to(&home_url(&form.q))
}
