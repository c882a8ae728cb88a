//! Product listing route handlers.
//!
//! The home page lists the catalog (or the results of `?q=`) and, for a
//! logged-in user, the cart sidebar.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use qkart_core::{Cart, CartItem, Product, next_quantity};

use super::layout::Layout;
use crate::api::{CART_FETCH_FAILED, PRODUCTS_FETCH_FAILED};
use crate::middleware::{CspNonce, OptionalAuth};
use crate::models::Flash;
use crate::state::AppState;

/// Highest rating a product can show.
const MAX_STARS: u8 = 5;

// =============================================================================
// View Types
// =============================================================================

/// Product card display data for templates.
#[derive(Clone)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub category: String,
    pub cost: String,
    pub image: String,
    pub rating: u8,
    /// Filled stars followed by empty ones, e.g. `★★★☆☆`.
    pub stars: String,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        let filled = product.stars();
        let stars = "★".repeat(usize::from(filled)) + &"☆".repeat(usize::from(MAX_STARS - filled));
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            category: product.category.clone(),
            cost: product.cost.to_string(),
            image: product.image.clone(),
            rating: filled,
            stars,
        }
    }
}

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub image: String,
    pub cost: String,
    pub qty: u32,
    /// Quantity the "-" button submits (0 removes the line).
    pub decrement: u32,
    /// Quantity the "+" button submits.
    pub increment: u32,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id().to_string(),
            name: item.product.name.clone(),
            image: item.product.image.clone(),
            cost: item.product.cost.to_string(),
            qty: item.qty,
            decrement: next_quantity(item.qty, -1),
            increment: next_quantity(item.qty, 1),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub item_count: u32,
    /// Show +/- controls (sidebar) or plain quantities (checkout).
    pub editable: bool,
}

impl CartView {
    #[must_use]
    pub fn editable(cart: &Cart) -> Self {
        Self {
            lines: cart.items.iter().map(CartLineView::from).collect(),
            total: cart.total_value().to_string(),
            item_count: cart.total_items(),
            editable: true,
        }
    }

    #[must_use]
    pub fn read_only(cart: &Cart) -> Self {
        Self {
            editable: false,
            ..Self::editable(cart)
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Search query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub query: String,
    pub products: Vec<ProductCard>,
    /// Cart sidebar, only for logged-in users.
    pub cart: Option<CartView>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the product grid.
#[instrument(skip(state, session, user, nonce))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    OptionalAuth(user): OptionalAuth,
    nonce: CspNonce,
    Query(query): Query<SearchQuery>,
) -> ProductsIndexTemplate {
    let mut layout = Layout::new(&session, user.as_ref(), nonce).await;

    let products = match state.api().find_products(&query.q).await {
        Ok(products) => products.iter().map(ProductCard::from).collect(),
        Err(e) => {
            tracing::warn!("Failed to fetch products: {e}");
            layout.notify(Flash::error(e.user_message(PRODUCTS_FETCH_FAILED)));
            Vec::new()
        }
    };

    let cart = match &user {
        Some(user) => match state.api().load_cart(&user.token()).await {
            Ok(cart) => Some(CartView::editable(&cart)),
            Err(e) => {
                tracing::warn!("Failed to fetch cart: {e}");
                layout.notify(Flash::error(e.user_message(CART_FETCH_FAILED)));
                Some(CartView::editable(&Cart::empty()))
            }
        },
        None => None,
    };

    ProductsIndexTemplate {
        layout,
        query: query.q,
        products,
        cart,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use qkart_core::{CartEntry, Price, ProductId, generate_cart_items};

    use super::*;

    fn product(id: &str, cost: i64, rating: u8) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            category: "Fashion".to_string(),
            cost: Price::from_dollars(cost),
            rating,
            image: format!("https://i.imgur.com/{id}.png"),
        }
    }

    #[test]
    fn test_product_card_stars() {
        let card = ProductCard::from(&product("a", 50, 3));
        assert_eq!(card.stars, "★★★☆☆");
        assert_eq!(card.cost, "$50");

        let card = ProductCard::from(&product("b", 50, 9));
        assert_eq!(card.stars, "★★★★★");
    }

    #[test]
    fn test_cart_view_quantity_controls() {
        let catalog = vec![product("a", 10, 4), product("b", 25, 2)];
        let cart = generate_cart_items(
            &[CartEntry::new("a", 1), CartEntry::new("b", 3)],
            &catalog,
        );
        let view = CartView::editable(&cart);

        assert_eq!(view.total, "$85");
        assert_eq!(view.item_count, 4);
        assert_eq!(view.lines[0].decrement, 0);
        assert_eq!(view.lines[0].increment, 2);
        assert_eq!(view.lines[1].decrement, 2);
        assert!(!CartView::read_only(&cart).editable);
    }
}
