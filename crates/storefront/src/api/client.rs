//! QKart API client implementation.
//!
//! Uses `reqwest` for HTTP. Caches the product catalog using `moka`.

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, instrument};
use url::Url;

use qkart_core::{Address, AddressId, Cart, CartEntry, Product, ProductId, generate_cart_items};

use super::{ApiError, ErrorBody, LoginResponse};
use crate::config::ApiConfig;

const CATALOG_KEY: &str = "products";

// =============================================================================
// QKartClient
// =============================================================================

/// Client for the QKart REST API.
///
/// Cheap to clone; clones share the HTTP connection pool and catalog cache.
#[derive(Clone)]
pub struct QKartClient {
    inner: Arc<QKartClientInner>,
}

struct QKartClientInner {
    client: reqwest::Client,
    base_url: Url,
    catalog: Cache<&'static str, Arc<Vec<Product>>>,
}

impl QKartClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (e.g. no TLS backend).
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("qkart-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let catalog = Cache::builder()
            .max_capacity(1)
            .time_to_live(config.catalog_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(QKartClientInner {
                client,
                base_url: config.base_url.clone(),
                catalog,
            }),
        })
    }

    /// Build a request to `path` relative to the API base URL.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.inner.base_url.join(path)?;
        Ok(self.inner.client.request(method, url))
    }

    /// Build an authenticated request.
    fn authed(
        &self,
        method: Method,
        path: &str,
        token: &SecretString,
    ) -> Result<RequestBuilder, ApiError> {
        Ok(self
            .request(method, path)?
            .bearer_auth(token.expose_secret()))
    }

    /// Send a request and decode a JSON response body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message);
            debug!(status = %status, message = ?message, "QKart API returned non-success status");
            return Err(ApiError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse QKart API response"
            );
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get the full product catalog (`GET /products`).
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        if let Some(products) = self.inner.catalog.get(CATALOG_KEY).await {
            debug!("Cache hit for product catalog");
            return Ok(products);
        }

        let products: Vec<Product> = self.send(self.request(Method::GET, "products")?).await?;
        let products = Arc::new(products);

        self.inner
            .catalog
            .insert(CATALOG_KEY, Arc::clone(&products))
            .await;

        debug!(count = products.len(), "Fetched product catalog");
        Ok(products)
    }

    /// Search products by name or category (`GET /products/search?value=`).
    ///
    /// The backend answers 404 when nothing matches; that is returned as an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails for any other reason.
    #[instrument(skip(self))]
    pub async fn search_products(&self, text: &str) -> Result<Vec<Product>, ApiError> {
        let mut url = self.inner.base_url.join("products/search")?;
        url.query_pairs_mut().append_pair("value", text);

        match self.send(self.inner.client.get(url)).await {
            Err(ApiError::Backend { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Products to show for a search box value: everything for an empty
    /// query, search results otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    pub async fn find_products(&self, text: &str) -> Result<Vec<Product>, ApiError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(self.get_products().await?.as_ref().clone());
        }
        self.search_products(text).await
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Register a new account (`POST /auth/register`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Backend` with the backend's message if the username
    /// is taken, or another error if the request fails.
    #[instrument(skip(self, password))]
    pub async fn register(&self, username: &str, password: &str) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "auth/register")?
            .json(&json!({ "username": username, "password": password }));
        let _: serde_json::Value = self.send(request).await?;
        Ok(())
    }

    /// Log in (`POST /auth/login`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Backend` with the backend's message for bad
    /// credentials, or another error if the request fails.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = self
            .request(Method::POST, "auth/login")?
            .json(&json!({ "username": username, "password": password }));
        self.send(request).await
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Get the raw cart entries (`GET /cart`).
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self, token))]
    pub async fn get_cart(&self, token: &SecretString) -> Result<Vec<CartEntry>, ApiError> {
        self.send(self.authed(Method::GET, "cart", token)?).await
    }

    /// Set the quantity of a product in the cart (`POST /cart`).
    ///
    /// A quantity of zero removes the product. Returns the updated entries.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Backend` for unknown products, or another error if
    /// the request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn set_cart_quantity(
        &self,
        token: &SecretString,
        product_id: &ProductId,
        qty: u32,
    ) -> Result<Vec<CartEntry>, ApiError> {
        let request = self
            .authed(Method::POST, "cart", token)?
            .json(&CartEntry::new(product_id.clone(), qty));
        self.send(request).await
    }

    /// Reconcile cart entries against the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be fetched.
    pub async fn reconcile(&self, entries: &[CartEntry]) -> Result<Cart, ApiError> {
        let catalog = self.get_products().await?;
        let cart = generate_cart_items(entries, &catalog);
        if cart.unmatched > 0 {
            tracing::warn!(
                unmatched = cart.unmatched,
                "Cart references products missing from the catalog"
            );
        }
        Ok(cart)
    }

    /// Fetch the cart and reconcile it into displayable lines.
    ///
    /// # Errors
    ///
    /// Returns an error if either the cart or the catalog cannot be fetched.
    #[instrument(skip(self, token))]
    pub async fn load_cart(&self, token: &SecretString) -> Result<Cart, ApiError> {
        let entries = self.get_cart(token).await?;
        self.reconcile(&entries).await
    }

    // =========================================================================
    // Address & Checkout Methods
    // =========================================================================

    /// List saved addresses (`GET /user/addresses`).
    ///
    /// # Errors
    ///
    /// Returns an error if the token is rejected or the request fails.
    #[instrument(skip(self, token))]
    pub async fn get_addresses(&self, token: &SecretString) -> Result<Vec<Address>, ApiError> {
        self.send(self.authed(Method::GET, "user/addresses", token)?)
            .await
    }

    /// Save a new address (`POST /user/addresses`). Returns the updated list.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the address or the request fails.
    #[instrument(skip(self, token, address))]
    pub async fn add_address(
        &self,
        token: &SecretString,
        address: &str,
    ) -> Result<Vec<Address>, ApiError> {
        let request = self
            .authed(Method::POST, "user/addresses", token)?
            .json(&json!({ "address": address }));
        self.send(request).await
    }

    /// Delete a saved address (`DELETE /user/addresses/{id}`). Returns the
    /// updated list.
    ///
    /// # Errors
    ///
    /// Returns an error if the address does not exist or the request fails.
    #[instrument(skip(self, token), fields(address_id = %id))]
    pub async fn delete_address(
        &self,
        token: &SecretString,
        id: &AddressId,
    ) -> Result<Vec<Address>, ApiError> {
        let mut url = self.inner.base_url.join("user/addresses/")?;
        url.path_segments_mut()
            .map_err(|()| url::ParseError::RelativeUrlWithCannotBeABaseBase)?
            .pop_if_empty()
            .push(id.as_str());

        let request = self
            .inner
            .client
            .delete(url)
            .bearer_auth(token.expose_secret());
        self.send(request).await
    }

    /// Place an order for the current cart (`POST /cart/checkout`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Backend` with the backend's message if the order is
    /// refused (empty cart, insufficient balance), or another error if the
    /// request fails.
    #[instrument(skip(self, token), fields(address_id = %address_id))]
    pub async fn checkout(
        &self,
        token: &SecretString,
        address_id: &AddressId,
    ) -> Result<(), ApiError> {
        let request = self
            .authed(Method::POST, "cart/checkout", token)?
            .json(&json!({ "addressId": address_id }));
        let _: serde_json::Value = self.send(request).await?;
        Ok(())
    }
}
