//! Checkout route handlers.
//!
//! Shows the cart read-only next to the saved addresses and the wallet,
//! and places the order with the backend.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::Redirect,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use qkart_core::{Address, AddressId, Cart, Price, validate_address, validate_checkout};

use super::layout::Layout;
use super::products::CartView;
use crate::api::{BACKEND_UNAVAILABLE, CART_FETCH_FAILED};
use crate::error::{Result, add_breadcrumb};
use crate::middleware::{CspNonce, RequireAuth, update_current_user};
use crate::models::Flash;
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Place order form data.
#[derive(Debug, Deserialize)]
pub struct PlaceOrderForm {
    /// Selected shipping address; absent when no radio button is checked.
    pub address_id: Option<String>,
}

/// New address form data.
#[derive(Debug, Deserialize)]
pub struct AddressForm {
    #[serde(default)]
    pub address: String,
}

// =============================================================================
// Templates
// =============================================================================

/// Saved address display data.
#[derive(Clone)]
pub struct AddressView {
    pub id: String,
    pub address: String,
}

impl From<&Address> for AddressView {
    fn from(address: &Address) -> Self {
        Self {
            id: address.id.to_string(),
            address: address.address.clone(),
        }
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub layout: Layout,
    pub cart: CartView,
    pub addresses: Vec<AddressView>,
    pub balance: String,
    pub total: String,
    /// Balance left after the order, `None` if it cannot be afforded.
    pub remaining: Option<String>,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "thanks.html")]
pub struct ThanksTemplate {
    pub layout: Layout,
    pub balance: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout page.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    nonce: CspNonce,
) -> CheckoutTemplate {
    let mut layout = Layout::new(&session, Some(&user), nonce).await;
    let token = user.token();

    let cart = match state.api().load_cart(&token).await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::warn!("Failed to fetch cart: {e}");
            layout.notify(Flash::error(e.user_message(CART_FETCH_FAILED)));
            Cart::empty()
        }
    };

    let addresses = match state.api().get_addresses(&token).await {
        Ok(addresses) => addresses,
        Err(e) => {
            tracing::warn!("Failed to fetch addresses: {e}");
            layout.notify(Flash::error(e.user_message(BACKEND_UNAVAILABLE)));
            Vec::new()
        }
    };

    let total = cart.total_value();

    CheckoutTemplate {
        layout,
        cart: CartView::read_only(&cart),
        addresses: addresses.iter().map(AddressView::from).collect(),
        balance: user.balance.to_string(),
        total: total.to_string(),
        remaining: user.balance.checked_sub(total).map(|p| p.to_string()),
    }
}

/// Place the order.
///
/// On success the wallet balance kept in the session is reduced by the
/// order total, matching what the backend charged.
#[instrument(skip_all)]
pub async fn place_order(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(mut user): RequireAuth,
    Form(form): Form<PlaceOrderForm>,
) -> Result<Redirect> {
    let token = user.token();
    let retry = Redirect::to("/checkout");

    let cart = match state.api().load_cart(&token).await {
        Ok(cart) => cart,
        Err(e) => {
            tracing::warn!("Failed to fetch cart: {e}");
            Flash::error(e.user_message(CART_FETCH_FAILED))
                .push(&session)
                .await;
            return Ok(retry);
        }
    };

    let addresses = match state.api().get_addresses(&token).await {
        Ok(addresses) => addresses,
        Err(e) => {
            tracing::warn!("Failed to fetch addresses: {e}");
            Flash::error(e.user_message(BACKEND_UNAVAILABLE))
                .push(&session)
                .await;
            return Ok(retry);
        }
    };

    let selected = form
        .address_id
        .filter(|id| !id.is_empty())
        .map(AddressId::new);

    let address = match validate_checkout(&cart, &addresses, selected.as_ref(), user.balance) {
        Ok(address) => address,
        Err(e) => {
            Flash::warning(e.to_string()).push(&session).await;
            return Ok(retry);
        }
    };

    if let Err(e) = state.api().checkout(&token, &address.id).await {
        tracing::warn!("Checkout failed: {e}");
        Flash::error(e.user_message(BACKEND_UNAVAILABLE))
            .push(&session)
            .await;
        return Ok(retry);
    }

    let total = cart.total_value();
    user.balance = user.balance.checked_sub(total).unwrap_or(Price::ZERO);
    update_current_user(&session, &user).await?;

    add_breadcrumb(
        "checkout",
        "Order placed",
        Some(&[("address_id", address.id.as_str())]),
    );
    tracing::info!(username = %user.username, total = %total, "Order placed");

    Flash::success("Order placed successfully").push(&session).await;
    Ok(Redirect::to("/thanks"))
}

/// Save a new shipping address.
#[instrument(skip_all)]
pub async fn add_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Form(form): Form<AddressForm>,
) -> Redirect {
    match validate_address(&form.address) {
        Ok(address) => {
            if let Err(e) = state.api().add_address(&user.token(), &address).await {
                tracing::warn!("Failed to add address: {e}");
                Flash::error(e.user_message(BACKEND_UNAVAILABLE))
                    .push(&session)
                    .await;
            }
        }
        Err(e) => Flash::warning(e.to_string()).push(&session).await,
    }

    Redirect::to("/checkout")
}

/// Delete a saved address.
#[instrument(skip(state, session, user))]
pub async fn delete_address(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(user): RequireAuth,
    Path(id): Path<String>,
) -> Redirect {
    let id = AddressId::new(id);

    if let Err(e) = state.api().delete_address(&user.token(), &id).await {
        tracing::warn!("Failed to delete address {id}: {e}");
        Flash::error(e.user_message(BACKEND_UNAVAILABLE))
            .push(&session)
            .await;
    }

    Redirect::to("/checkout")
}

/// Order confirmation page.
pub async fn thanks(
    session: Session,
    RequireAuth(user): RequireAuth,
    nonce: CspNonce,
) -> ThanksTemplate {
    ThanksTemplate {
        balance: user.balance.to_string(),
        layout: Layout::new(&session, Some(&user), nonce).await,
    }
}
