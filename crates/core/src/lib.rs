//! QKart Core - Shared types library.
//!
//! This crate provides the domain types and pure logic used by the storefront:
//! - Products, cart entries and addresses as returned by the QKart backend
//! - Cart reconciliation (server cart entries + catalog => displayable lines)
//! - Form validation for registration, login, addresses and checkout
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. The storefront crate owns everything that talks to the network.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, usernames and backend records
//! - [`cart`] - Cart reconciliation and totals
//! - [`validation`] - User input validation with display-ready messages

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartItem, generate_cart_items, is_item_in_cart, next_quantity};
pub use types::*;
pub use validation::{
    Registration, ValidationError, validate_address, validate_checkout, validate_login,
    validate_registration,
};
