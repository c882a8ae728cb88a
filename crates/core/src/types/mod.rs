//! Core types for QKart.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod records;
pub mod username;

pub use id::*;
pub use price::Price;
pub use records::{Address, CartEntry, Product};
pub use username::{Username, UsernameError};
