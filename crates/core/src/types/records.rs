//! Records exchanged with the QKart backend.
//!
//! Field names follow the backend's JSON (`_id`, `productId`) via serde
//! renames so the rest of the code can use Rust naming.

use serde::{Deserialize, Serialize};

use super::id::{AddressId, ProductId};
use super::price::Price;

/// A product available to buy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Unique ID for the product.
    #[serde(rename = "_id")]
    pub id: ProductId,
    /// The name or title of the product.
    pub name: String,
    /// The category that the product belongs to.
    pub category: String,
    /// The price to buy the product.
    pub cost: Price,
    /// Aggregate rating, an integer out of five.
    #[serde(default)]
    pub rating: u8,
    /// URL of the product image.
    pub image: String,
}

impl Product {
    /// Rating clamped to the 0..=5 star scale.
    #[must_use]
    pub fn stars(&self) -> u8 {
        self.rating.min(5)
    }
}

/// A cart record as held by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntry {
    /// Product this entry refers to.
    pub product_id: ProductId,
    /// How many of the product are in the cart.
    pub qty: u32,
}

impl CartEntry {
    /// Create a new cart entry.
    #[must_use]
    pub fn new(product_id: impl Into<ProductId>, qty: u32) -> Self {
        Self {
            product_id: product_id.into(),
            qty,
        }
    }
}

/// A saved shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Unique ID for the address.
    #[serde(rename = "_id")]
    pub id: AddressId,
    /// Free-form address text.
    pub address: String,
}
